//! Audit Trail
//!
//! Append-only record of lifecycle events. Deliberately best-effort and
//! non-transactional: a failed append is logged and swallowed, never
//! surfaced to the lifecycle operation that triggered it. The tradeoff
//! is eventual-consistency of the trail (an entry may be missing for a
//! transition that did commit).

use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::transfer::store::TransferStore;
use crate::transfer::types::TransferId;
use crate::transfer::{Transfer, TransferStatus};

/// Fixed vocabulary of auditable lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    TransferCreated,
    TransferProcessing,
    TransferSuccess,
    TransferFailed,
    TransferCanceled,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::TransferCreated => "TRANSFER_CREATED",
            AuditAction::TransferProcessing => "TRANSFER_PROCESSING",
            AuditAction::TransferSuccess => "TRANSFER_SUCCESS",
            AuditAction::TransferFailed => "TRANSFER_FAILED",
            AuditAction::TransferCanceled => "TRANSFER_CANCELED",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of one lifecycle event. Created once, never mutated
/// or deleted. `transfer_id` is a lookup back-reference, not ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: ulid::Ulid,
    pub action: AuditAction,
    pub transfer_id: Option<TransferId>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Read-only projection of a transfer, joined onto system-wide queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSummary {
    pub reference: String,
    pub amount: u64,
    pub status: TransferStatus,
}

impl From<&Transfer> for TransferSummary {
    fn from(t: &Transfer) -> Self {
        Self {
            reference: t.reference.clone(),
            amount: t.amount,
            status: t.status,
        }
    }
}

/// An audit entry with its owning transfer's summary, when one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryWithTransfer {
    #[serde(flatten)]
    pub entry: AuditLogEntry,
    pub transfer: Option<TransferSummary>,
}

#[derive(Error, Debug)]
enum AuditError {
    #[error("audit store at capacity ({0} entries)")]
    CapacityExhausted(usize),
}

/// Best-effort recorder of lifecycle events.
///
/// Capacity-bounded: once full, new entries are dropped (existing ones
/// are never evicted; the log is append-only).
pub struct AuditRecorder {
    entries: RwLock<VecDeque<AuditLogEntry>>,
    max_entries: usize,
}

impl AuditRecorder {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            max_entries,
        }
    }

    /// Append one entry. Failures are logged and swallowed; this must
    /// never fail or roll back the triggering lifecycle operation.
    pub fn record(
        &self,
        action: AuditAction,
        transfer_id: Option<TransferId>,
        metadata: serde_json::Value,
    ) {
        match self.try_append(action, transfer_id, metadata) {
            Ok(()) => {
                debug!(
                    action = %action,
                    transfer_id = transfer_id.map(|id| id.to_string()).as_deref().unwrap_or("N/A"),
                    "Audit log created"
                );
            }
            Err(e) => {
                warn!(action = %action, error = %e, "Failed to create audit log");
            }
        }
    }

    fn try_append(
        &self,
        action: AuditAction,
        transfer_id: Option<TransferId>,
        metadata: serde_json::Value,
    ) -> Result<(), AuditError> {
        let mut entries = self.entries.write().unwrap();
        if entries.len() >= self.max_entries {
            return Err(AuditError::CapacityExhausted(self.max_entries));
        }

        entries.push_back(AuditLogEntry {
            id: ulid::Ulid::new(),
            action,
            transfer_id,
            metadata,
            created_at: Utc::now(),
        });
        Ok(())
    }

    /// All entries for one transfer, newest first.
    pub fn logs_for(&self, transfer_id: TransferId) -> Vec<AuditLogEntry> {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .rev()
            .filter(|e| e.transfer_id == Some(transfer_id))
            .cloned()
            .collect()
    }

    /// Most recent entries system-wide, newest first, each joined with a
    /// summary of its owning transfer.
    pub fn recent(&self, limit: usize, store: &TransferStore) -> Vec<AuditEntryWithTransfer> {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .rev()
            .take(limit)
            .map(|entry| AuditEntryWithTransfer {
                entry: entry.clone(),
                transfer: entry
                    .transfer_id
                    .and_then(|id| store.get(id))
                    .map(|t| TransferSummary::from(&t)),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_names() {
        assert_eq!(AuditAction::TransferCreated.as_str(), "TRANSFER_CREATED");
        assert_eq!(AuditAction::TransferCanceled.as_str(), "TRANSFER_CANCELED");
        let json = serde_json::to_string(&AuditAction::TransferSuccess).unwrap();
        assert_eq!(json, "\"TRANSFER_SUCCESS\"");
    }

    #[test]
    fn test_record_and_query_newest_first() {
        let recorder = AuditRecorder::new(100);
        let id = TransferId::new();

        recorder.record(AuditAction::TransferCreated, Some(id), json!({"amount": 1}));
        recorder.record(AuditAction::TransferProcessing, Some(id), json!({}));
        recorder.record(AuditAction::TransferSuccess, Some(id), json!({}));
        recorder.record(AuditAction::TransferCreated, Some(TransferId::new()), json!({}));

        let logs = recorder.logs_for(id);
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].action, AuditAction::TransferSuccess);
        assert_eq!(logs[1].action, AuditAction::TransferProcessing);
        assert_eq!(logs[2].action, AuditAction::TransferCreated);
        assert_eq!(logs[2].metadata["amount"], 1);
    }

    #[test]
    fn test_capacity_overflow_is_swallowed() {
        let recorder = AuditRecorder::new(2);
        recorder.record(AuditAction::TransferCreated, None, json!({}));
        recorder.record(AuditAction::TransferCreated, None, json!({}));

        // Third append fails internally; record() must not panic or grow
        recorder.record(AuditAction::TransferCreated, None, json!({}));
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_recent_joins_transfer_summary() {
        use crate::transfer::types::{Channel, Recipient};

        let store = TransferStore::new();
        let now = Utc::now();
        let recipient = Recipient::new("+221771234567", "Awa Diop");
        let transfer = store
            .insert(Transfer {
                id: TransferId::new(),
                reference: "TRF-20250101-AAAA".to_string(),
                amount: 12_500,
                currency: "XOF".to_string(),
                channel: Channel::Wave,
                status: TransferStatus::Pending,
                fees: 100,
                total: 12_600,
                recipient_phone: recipient.phone.clone(),
                recipient_name: recipient.name.clone(),
                metadata: json!({}),
                provider_ref: None,
                error_code: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let recorder = AuditRecorder::new(100);
        recorder.record(AuditAction::TransferCreated, Some(transfer.id), json!({}));
        recorder.record(AuditAction::TransferCreated, Some(TransferId::new()), json!({}));

        let recent = recorder.recent(10, &store);
        assert_eq!(recent.len(), 2);

        // Newest first: the orphan entry has no summary
        assert!(recent[0].transfer.is_none());
        let joined = recent[1].transfer.as_ref().unwrap();
        assert_eq!(joined.reference, "TRF-20250101-AAAA");
        assert_eq!(joined.amount, 12_500);
        assert_eq!(joined.status, TransferStatus::Pending);
    }

    #[test]
    fn test_recent_respects_limit() {
        let store = TransferStore::new();
        let recorder = AuditRecorder::new(100);
        for _ in 0..5 {
            recorder.record(AuditAction::TransferCreated, None, json!({}));
        }
        assert_eq!(recorder.recent(3, &store).len(), 3);
    }
}
