//! Payment Channel Providers
//!
//! One adapter per mobile-money network, behind the [`ProviderAdapter`]
//! trait. The [`ProviderGateway`] dispatches on the closed [`Channel`]
//! enum and guarantees it never raises: adapter faults (Err or panic)
//! are intercepted at the gateway boundary and converted to a
//! `PROVIDER_ERROR` outcome. Outcomes are data, not exceptions.

pub mod simulator;

pub use simulator::SimulatedAdapter;

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::error;

use super::types::{Channel, TransferId};
use crate::config::ProviderConfig;

/// Error codes minted by the gateway itself (as opposed to the
/// channel-specific decline vocabularies owned by each adapter).
pub mod error_codes {
    /// Adapter raised instead of returning an outcome
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
    /// Channel name not recognized at the string boundary
    pub const UNSUPPORTED_CHANNEL: &str = "UNSUPPORTED_CHANNEL";
    /// Unexpected fault during lifecycle processing
    pub const SYSTEM_ERROR: &str = "SYSTEM_ERROR";
}

/// Structured result of a provider call. Never an exception: a declined
/// or faulted call is still a well-formed outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// Provider confirmed the payout
    Success { provider_ref: String },
    /// Provider declined with a channel-specific error code
    Failure { error_code: String },
}

impl ProviderOutcome {
    pub fn failure(error_code: impl Into<String>) -> Self {
        ProviderOutcome::Failure {
            error_code: error_code.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success { .. })
    }
}

/// Capability contract for a payment channel.
///
/// `process` may return Err for unexpected faults; the gateway converts
/// those to `PROVIDER_ERROR` outcomes so callers only ever see data.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    /// Execute the payout with the external network
    async fn process(
        &self,
        transfer_id: TransferId,
        amount: u64,
        recipient_phone: &str,
    ) -> anyhow::Result<ProviderOutcome>;
}

/// Dispatches transfers to the adapter for their channel.
///
/// The channel set is fixed, so dispatch is an exhaustive match over
/// four adapter slots rather than an open registry.
pub struct ProviderGateway {
    wave: Arc<dyn ProviderAdapter>,
    orange_money: Arc<dyn ProviderAdapter>,
    free_money: Arc<dyn ProviderAdapter>,
    moov_money: Arc<dyn ProviderAdapter>,
}

impl ProviderGateway {
    pub fn new(
        wave: Arc<dyn ProviderAdapter>,
        orange_money: Arc<dyn ProviderAdapter>,
        free_money: Arc<dyn ProviderAdapter>,
        moov_money: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            wave,
            orange_money,
            free_money,
            moov_money,
        }
    }

    /// Gateway backed by the four simulated network adapters.
    pub fn simulated(config: &ProviderConfig) -> Self {
        Self::new(
            Arc::new(SimulatedAdapter::new(Channel::Wave, config)),
            Arc::new(SimulatedAdapter::new(Channel::OrangeMoney, config)),
            Arc::new(SimulatedAdapter::new(Channel::FreeMoney, config)),
            Arc::new(SimulatedAdapter::new(Channel::MoovMoney, config)),
        )
    }

    fn adapter_for(&self, channel: Channel) -> &Arc<dyn ProviderAdapter> {
        match channel {
            Channel::Wave => &self.wave,
            Channel::OrangeMoney => &self.orange_money,
            Channel::FreeMoney => &self.free_money,
            Channel::MoovMoney => &self.moov_money,
        }
    }

    /// Dispatch a transfer to its channel adapter.
    ///
    /// Never returns Err and never panics through: any fault from the
    /// adapter becomes a `PROVIDER_ERROR` outcome.
    pub async fn process(
        &self,
        channel: Channel,
        transfer_id: TransferId,
        amount: u64,
        recipient_phone: &str,
    ) -> ProviderOutcome {
        let adapter = self.adapter_for(channel);

        let call = std::panic::AssertUnwindSafe(adapter.process(
            transfer_id,
            amount,
            recipient_phone,
        ))
        .catch_unwind();

        match call.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(
                    transfer_id = %transfer_id,
                    channel = %channel,
                    adapter = adapter.name(),
                    error = %e,
                    "Provider adapter fault"
                );
                ProviderOutcome::failure(error_codes::PROVIDER_ERROR)
            }
            Err(_) => {
                error!(
                    transfer_id = %transfer_id,
                    channel = %channel,
                    adapter = adapter.name(),
                    "Provider adapter panicked"
                );
                ProviderOutcome::failure(error_codes::PROVIDER_ERROR)
            }
        }
    }

    /// Dispatch by raw channel name, for callers that sit before the
    /// typed boundary. Unknown names yield `UNSUPPORTED_CHANNEL`.
    pub async fn process_named(
        &self,
        channel: &str,
        transfer_id: TransferId,
        amount: u64,
        recipient_phone: &str,
    ) -> ProviderOutcome {
        match channel.parse::<Channel>() {
            Ok(parsed) => {
                self.process(parsed, transfer_id, amount, recipient_phone)
                    .await
            }
            Err(_) => {
                error!(channel = channel, "No adapter for channel");
                ProviderOutcome::failure(error_codes::UNSUPPORTED_CHANNEL)
            }
        }
    }
}


#[cfg(test)]
pub use mock::{MockAdapter, MockBehavior};
