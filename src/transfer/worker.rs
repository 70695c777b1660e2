//! Stalled-Transfer Recovery
//!
//! `process()` persists PROCESSING, calls the provider, then persists the
//! terminal status. A crash between the two writes strands the row in
//! PROCESSING forever. This sweeper periodically fails such rows with
//! `SYSTEM_ERROR` so they reach a terminal status.
//!
//! The stale window must comfortably exceed the provider latency bound,
//! otherwise the sweeper can race a live provider call; the terminal CAS
//! makes that race safe (one side loses and observes the other's write).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::audit::{AuditAction, AuditRecorder};
use crate::config::RecoveryConfig;

use super::providers::error_codes;
use super::status::TransferStatus;
use super::store::{TransferStore, TransitionData};

pub struct RecoverySweeper {
    store: Arc<TransferStore>,
    audit: Arc<AuditRecorder>,
    sweep_interval: Duration,
    stale_after: chrono::Duration,
}

impl RecoverySweeper {
    pub fn new(store: Arc<TransferStore>, audit: Arc<AuditRecorder>, config: &RecoveryConfig) -> Self {
        Self {
            store,
            audit,
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            stale_after: chrono::Duration::seconds(config.stale_after_secs as i64),
        }
    }

    /// Run forever, sweeping at the configured interval.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let swept = self.sweep();
            if swept > 0 {
                info!(swept = swept, "Recovery sweep failed stranded transfers");
            }
        }
    }

    /// Fail every PROCESSING row untouched for longer than the stale
    /// window. Returns the number of rows transitioned.
    pub fn sweep(&self) -> usize {
        self.sweep_before(Utc::now() - self.stale_after)
    }

    fn sweep_before(&self, cutoff: chrono::DateTime<Utc>) -> usize {
        let mut swept = 0;
        for id in self.store.stale_processing(cutoff) {
            match self.store.transition(
                id,
                TransferStatus::Processing,
                TransferStatus::Failed,
                TransitionData::error_code(error_codes::SYSTEM_ERROR),
            ) {
                Ok(transfer) => {
                    warn!(
                        transfer_id = %id,
                        reference = %transfer.reference,
                        "Stranded PROCESSING transfer failed by recovery sweep"
                    );
                    self.audit.record(
                        AuditAction::TransferFailed,
                        Some(id),
                        json!({ "errorCode": error_codes::SYSTEM_ERROR, "recovered": true }),
                    );
                    swept += 1;
                }
                // A live process() won the terminal CAS in the meantime
                Err(_) => {}
            }
        }
        swept
    }
}
