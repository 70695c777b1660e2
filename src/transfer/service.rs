//! Transfer Lifecycle Service
//!
//! The orchestrator: composes the fee schedule, reference generator,
//! store, provider gateway and audit recorder to implement
//! create / list / get / process / cancel.
//!
//! # Safety Invariants
//!
//! 1. **CAS transitions**: every status write is conditional on the
//!    expected current status, so two concurrent `process()` calls on
//!    the same id cannot both reach the provider.
//! 2. **Never stranded by return**: `process()` always leaves the
//!    transfer terminal (SUCCESS or FAILED) before returning; provider
//!    faults terminate as FAILED with `SYSTEM_ERROR`.
//! 3. **Audit is best-effort**: audit failures never fail the operation.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::audit::{AuditAction, AuditEntryWithTransfer, AuditLogEntry, AuditRecorder};
use crate::config::TransferConfig;

use super::error::TransferError;
use super::fees::compute_fee;
use super::providers::{ProviderGateway, ProviderOutcome, error_codes};
use super::query::{self, ListQuery, Page};
use super::reference::ReferenceGenerator;
use super::status::TransferStatus;
use super::store::{StoreError, TransferStore, TransitionData, TransitionError};
use super::types::{NewTransfer, Transfer, TransferId};

/// Transfer lifecycle orchestrator.
pub struct TransferService {
    store: Arc<TransferStore>,
    audit: Arc<AuditRecorder>,
    gateway: Arc<ProviderGateway>,
    references: ReferenceGenerator,
    config: TransferConfig,
}

impl TransferService {
    pub fn new(
        store: Arc<TransferStore>,
        audit: Arc<AuditRecorder>,
        gateway: Arc<ProviderGateway>,
        config: TransferConfig,
    ) -> Self {
        Self::with_reference_generator(store, audit, gateway, config, ReferenceGenerator::new())
    }

    /// Service with a caller-supplied (e.g. seeded) reference generator
    pub fn with_reference_generator(
        store: Arc<TransferStore>,
        audit: Arc<AuditRecorder>,
        gateway: Arc<ProviderGateway>,
        config: TransferConfig,
        references: ReferenceGenerator,
    ) -> Self {
        Self {
            store,
            audit,
            gateway,
            references,
            config,
        }
    }

    pub fn store(&self) -> &Arc<TransferStore> {
        &self.store
    }

    /// Record a new transfer in PENDING.
    ///
    /// Computes fee and total, assigns a reference (regenerating on
    /// collision up to the configured bound), persists and emits
    /// `TRANSFER_CREATED`.
    pub async fn create(&self, request: NewTransfer) -> Result<Transfer, TransferError> {
        // Shape validation belongs to the boundary; re-check only what
        // would corrupt the lifecycle.
        if request.amount == 0 {
            return Err(TransferError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        let fees = compute_fee(
            request.amount,
            self.config.fee_percentage,
            self.config.min_fee,
            self.config.max_fee,
        );
        let total = request.amount + fees;
        let currency = request
            .currency
            .clone()
            .unwrap_or_else(|| self.config.default_currency.clone());
        let metadata = request.metadata.clone().unwrap_or_else(|| json!({}));

        let mut attempts = 0;
        let transfer = loop {
            attempts += 1;
            let now = Utc::now();
            let reference = self.references.generate(now);

            let candidate = Transfer {
                id: TransferId::new(),
                reference,
                amount: request.amount,
                currency: currency.clone(),
                channel: request.channel,
                status: TransferStatus::Pending,
                fees,
                total,
                recipient_phone: request.recipient.phone.clone(),
                recipient_name: request.recipient.name.clone(),
                metadata: metadata.clone(),
                provider_ref: None,
                error_code: None,
                created_at: now,
                updated_at: now,
            };

            match self.store.insert(candidate) {
                Ok(transfer) => break transfer,
                Err(StoreError::DuplicateReference(reference)) => {
                    warn!(
                        reference = %reference,
                        attempt = attempts,
                        "Reference collision, regenerating"
                    );
                    if attempts >= self.config.max_reference_attempts {
                        return Err(TransferError::Conflict(format!(
                            "Could not allocate a unique reference after {attempts} attempts"
                        )));
                    }
                }
            }
        };

        self.audit.record(
            AuditAction::TransferCreated,
            Some(transfer.id),
            json!({
                "amount": transfer.amount,
                "channel": transfer.channel,
                "recipient": {
                    "phone": transfer.recipient_phone,
                    "name": transfer.recipient_name,
                },
            }),
        );

        info!(
            transfer_id = %transfer.id,
            reference = %transfer.reference,
            "Transfer created"
        );

        Ok(transfer)
    }

    /// Fetch a transfer by id.
    pub async fn get(&self, id: TransferId) -> Result<Transfer, TransferError> {
        self.store.get(id).ok_or(TransferError::NotFound(id))
    }

    /// Filtered, cursor-paginated listing, newest first.
    pub async fn list(&self, query: &ListQuery) -> Result<Page, TransferError> {
        query::list(
            &self.store,
            query,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    /// Drive a PENDING transfer through its provider call to a terminal
    /// status.
    ///
    /// The PENDING→PROCESSING write is a CAS: the losing side of a race
    /// observes a `Conflict` and never reaches the provider. Whatever the
    /// provider does, the transfer is terminal when this returns.
    pub async fn process(&self, id: TransferId) -> Result<Transfer, TransferError> {
        let transfer = self.get(id).await?;

        let processing = match self.store.transition(
            id,
            TransferStatus::Pending,
            TransferStatus::Processing,
            TransitionData::none(),
        ) {
            Ok(updated) => updated,
            Err(TransitionError::NotFound(id)) => return Err(TransferError::NotFound(id)),
            Err(TransitionError::StatusMismatch { current }) => {
                return Err(TransferError::Conflict(format!(
                    "Transfer cannot be processed from status {current}"
                )));
            }
        };

        self.audit
            .record(AuditAction::TransferProcessing, Some(id), json!({}));
        info!(
            transfer_id = %id,
            reference = %processing.reference,
            channel = %processing.channel,
            "Processing transfer"
        );

        // Provider call: seconds-long, suspends only this unit of work.
        // The gateway never raises; faults come back as outcome data.
        let outcome = self
            .gateway
            .process(
                transfer.channel,
                id,
                transfer.amount,
                &transfer.recipient_phone,
            )
            .await;

        match outcome {
            ProviderOutcome::Success { provider_ref } => {
                let updated = self.finalize(
                    id,
                    TransferStatus::Success,
                    TransitionData::provider_ref(provider_ref.clone()),
                )?;
                self.audit.record(
                    AuditAction::TransferSuccess,
                    Some(id),
                    json!({ "providerRef": provider_ref }),
                );
                info!(
                    transfer_id = %id,
                    reference = %updated.reference,
                    provider_ref = %provider_ref,
                    "Transfer succeeded"
                );
                Ok(updated)
            }
            ProviderOutcome::Failure { error_code } => {
                let updated = self.finalize(
                    id,
                    TransferStatus::Failed,
                    TransitionData::error_code(error_code.clone()),
                )?;
                self.audit.record(
                    AuditAction::TransferFailed,
                    Some(id),
                    json!({ "errorCode": error_code }),
                );
                warn!(
                    transfer_id = %id,
                    reference = %updated.reference,
                    error_code = %error_code,
                    "Transfer failed"
                );
                Ok(updated)
            }
        }
    }

    /// Terminal write for process(): PROCESSING → SUCCESS/FAILED.
    ///
    /// Only this call path holds the PROCESSING claim, so a mismatch here
    /// means the recovery sweeper already failed the row while the
    /// provider call was in flight; the row is terminal either way, so
    /// return it as observed.
    fn finalize(
        &self,
        id: TransferId,
        terminal: TransferStatus,
        data: TransitionData,
    ) -> Result<Transfer, TransferError> {
        match self
            .store
            .transition(id, TransferStatus::Processing, terminal, data)
        {
            Ok(updated) => Ok(updated),
            Err(TransitionError::NotFound(id)) => Err(TransferError::NotFound(id)),
            Err(TransitionError::StatusMismatch { current }) => {
                warn!(
                    transfer_id = %id,
                    current = %current,
                    intended = %terminal,
                    "Terminal write lost to a concurrent transition"
                );
                self.store.get(id).ok_or(TransferError::NotFound(id))
            }
        }
    }

    /// Cancel a PENDING transfer.
    pub async fn cancel(&self, id: TransferId) -> Result<Transfer, TransferError> {
        // Surface NotFound before Conflict for unknown ids
        self.get(id).await?;

        let updated = match self.store.transition(
            id,
            TransferStatus::Pending,
            TransferStatus::Canceled,
            TransitionData::none(),
        ) {
            Ok(updated) => updated,
            Err(TransitionError::NotFound(id)) => return Err(TransferError::NotFound(id)),
            Err(TransitionError::StatusMismatch { current }) => {
                return Err(TransferError::Conflict(format!(
                    "Only PENDING transfers can be canceled. Current status: {current}"
                )));
            }
        };

        self.audit
            .record(AuditAction::TransferCanceled, Some(id), json!({}));
        info!(
            transfer_id = %id,
            reference = %updated.reference,
            "Transfer canceled"
        );

        Ok(updated)
    }

    /// Audit trail for one transfer, newest first.
    pub fn audit_trail(&self, id: TransferId) -> Vec<AuditLogEntry> {
        self.audit.logs_for(id)
    }

    /// Most recent audit entries system-wide, joined with transfer
    /// summaries.
    pub fn recent_activity(&self, limit: usize) -> Vec<AuditEntryWithTransfer> {
        self.audit.recent(limit, &self.store)
    }
}
