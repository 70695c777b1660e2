//! Transfer Store
//!
//! Ordered in-memory record store for transfers: a BTreeMap keyed by the
//! ULID transfer id (which sorts by creation time), plus a unique
//! secondary index on the human-readable reference.
//!
//! All status mutation goes through [`TransferStore::transition`], a
//! compare-and-set write: the update applies only if the row is still in
//! the expected status. Under concurrent `process()` calls on the same
//! id, at most one caller wins the PENDING→PROCESSING write.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::status::TransferStatus;
use super::types::{Transfer, TransferId};

/// Insert-time failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Unique constraint on `reference` violated
    #[error("Reference already exists: {0}")]
    DuplicateReference(String),
}

/// Conditional-update failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Transfer not found: {0}")]
    NotFound(TransferId),

    /// The row was not in the expected status; carries what it was.
    #[error("Transfer status is {current}, not the expected status")]
    StatusMismatch { current: TransferStatus },
}

/// Terminal-transition payload: provider reference on SUCCESS, error
/// code on FAILED. Mutually exclusive by construction at call sites.
#[derive(Debug, Clone, Default)]
pub struct TransitionData {
    pub provider_ref: Option<String>,
    pub error_code: Option<String>,
}

impl TransitionData {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn provider_ref(provider_ref: impl Into<String>) -> Self {
        Self {
            provider_ref: Some(provider_ref.into()),
            error_code: None,
        }
    }

    pub fn error_code(error_code: impl Into<String>) -> Self {
        Self {
            provider_ref: None,
            error_code: Some(error_code.into()),
        }
    }
}

struct StoreInner {
    rows: BTreeMap<TransferId, Transfer>,
    by_reference: HashMap<String, TransferId>,
}

/// In-memory ordered transfer store.
///
/// The only shared mutable resource in the system; cheap clone-out reads,
/// short critical sections, no await inside the lock.
pub struct TransferStore {
    inner: RwLock<StoreInner>,
}

impl TransferStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                rows: BTreeMap::new(),
                by_reference: HashMap::new(),
            }),
        }
    }

    /// Insert a new transfer, enforcing reference uniqueness.
    pub fn insert(&self, transfer: Transfer) -> Result<Transfer, StoreError> {
        let mut inner = self.inner.write().unwrap();

        if inner.by_reference.contains_key(&transfer.reference) {
            return Err(StoreError::DuplicateReference(transfer.reference));
        }

        inner
            .by_reference
            .insert(transfer.reference.clone(), transfer.id);
        inner.rows.insert(transfer.id, transfer.clone());
        Ok(transfer)
    }

    pub fn get(&self, id: TransferId) -> Option<Transfer> {
        self.inner.read().unwrap().rows.get(&id).cloned()
    }

    pub fn get_by_reference(&self, reference: &str) -> Option<Transfer> {
        let inner = self.inner.read().unwrap();
        let id = inner.by_reference.get(reference)?;
        inner.rows.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Conditional status update (compare-and-set).
    ///
    /// Applies `next` plus the transition payload only if the row is
    /// currently in `expected`, refreshing `updated_at`. Returns the
    /// updated row, or [`TransitionError::StatusMismatch`] with the
    /// status actually observed.
    pub fn transition(
        &self,
        id: TransferId,
        expected: TransferStatus,
        next: TransferStatus,
        data: TransitionData,
    ) -> Result<Transfer, TransitionError> {
        debug_assert!(
            expected.can_transition_to(next),
            "illegal FSM edge {expected} -> {next}"
        );

        let mut inner = self.inner.write().unwrap();
        let row = inner
            .rows
            .get_mut(&id)
            .ok_or(TransitionError::NotFound(id))?;

        if row.status != expected {
            return Err(TransitionError::StatusMismatch {
                current: row.status,
            });
        }

        row.status = next;
        row.updated_at = Utc::now();
        if let Some(provider_ref) = data.provider_ref {
            row.provider_ref = Some(provider_ref);
        }
        if let Some(error_code) = data.error_code {
            row.error_code = Some(error_code);
        }

        Ok(row.clone())
    }

    /// Fetch up to `take` matching rows in creation order descending,
    /// starting strictly after the `after` row when given.
    ///
    /// The ULID key embeds the creation timestamp, so key order IS
    /// creation order, with the id itself as the deterministic tie-break.
    pub fn page_desc<F>(&self, after: Option<TransferId>, take: usize, pred: F) -> Vec<Transfer>
    where
        F: Fn(&Transfer) -> bool,
    {
        let inner = self.inner.read().unwrap();
        let rows = &inner.rows;

        let collect = |iter: &mut dyn Iterator<Item = &Transfer>| -> Vec<Transfer> {
            iter.filter(|t| pred(t)).take(take).cloned().collect()
        };

        match after {
            // range(..id) excludes the cursor row itself; rev() walks newest-first
            Some(id) => collect(&mut rows.range(..id).map(|(_, t)| t).rev()),
            None => collect(&mut rows.values().rev()),
        }
    }

    /// Ids of transfers stuck in PROCESSING since before `cutoff`.
    pub fn stale_processing(&self, cutoff: DateTime<Utc>) -> Vec<TransferId> {
        let inner = self.inner.read().unwrap();
        inner
            .rows
            .values()
            .filter(|t| t.status == TransferStatus::Processing && t.updated_at < cutoff)
            .map(|t| t.id)
            .collect()
    }
}

impl Default for TransferStore {
    fn default() -> Self {
        Self::new()
    }
}
