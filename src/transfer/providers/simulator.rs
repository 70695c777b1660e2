//! Simulated Channel Adapters
//!
//! Stand-ins for the real mobile-money network clients: each call sleeps
//! for a bounded random latency, then succeeds with a fixed weight or
//! declines with a code drawn from that channel's vocabulary. A real
//! integration replaces this behind the same [`ProviderAdapter`] contract.
//!
//! Randomness is injectable (seeded RNG) so tests can force outcomes.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::{ProviderAdapter, ProviderOutcome};
use crate::config::ProviderConfig;
use crate::transfer::types::{Channel, TransferId};

const PROVIDER_REF_SUFFIX_LEN: usize = 5;
const REF_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Provider-reference prefix used by each network
fn ref_prefix(channel: Channel) -> &'static str {
    match channel {
        Channel::Wave => "WAVE",
        Channel::OrangeMoney => "OM",
        Channel::FreeMoney => "FREE",
        Channel::MoovMoney => "MOOV",
    }
}

/// Decline vocabulary per network
fn decline_codes(channel: Channel) -> &'static [&'static str] {
    match channel {
        Channel::Wave => &[
            "INSUFFICIENT_FUNDS",
            "INVALID_PHONE",
            "PROVIDER_TIMEOUT",
            "DAILY_LIMIT_EXCEEDED",
        ],
        Channel::OrangeMoney => &[
            "ACCOUNT_NOT_FOUND",
            "SERVICE_UNAVAILABLE",
            "INVALID_AMOUNT",
            "FRAUD_DETECTED",
        ],
        Channel::FreeMoney => &["NETWORK_ERROR", "RECIPIENT_BLOCKED", "MAINTENANCE_MODE"],
        Channel::MoovMoney => &["TRANSACTION_REJECTED", "KYC_REQUIRED", "BLACKLISTED"],
    }
}

/// Simulated network adapter for one channel.
pub struct SimulatedAdapter {
    channel: Channel,
    success_rate: f64,
    min_delay_ms: u64,
    max_delay_ms: u64,
    rng: Mutex<StdRng>,
}

impl SimulatedAdapter {
    pub fn new(channel: Channel, config: &ProviderConfig) -> Self {
        Self {
            channel,
            success_rate: config.success_rate,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic adapter for tests
    pub fn with_seed(channel: Channel, config: &ProviderConfig, seed: u64) -> Self {
        Self {
            channel,
            success_rate: config.success_rate,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw the latency, outcome roll and any random suffix up front so
    /// the mutex guard never lives across an await point.
    fn draw(&self) -> (Duration, bool, String, usize) {
        let mut rng = self.rng.lock().unwrap();

        let delay_ms = if self.max_delay_ms > self.min_delay_ms {
            rng.gen_range(self.min_delay_ms..self.max_delay_ms)
        } else {
            self.min_delay_ms
        };

        let success = rng.r#gen::<f64>() < self.success_rate;

        let suffix: String = (0..PROVIDER_REF_SUFFIX_LEN)
            .map(|_| REF_CHARSET[rng.gen_range(0..REF_CHARSET.len())] as char)
            .collect();

        let code_idx = rng.gen_range(0..decline_codes(self.channel).len());

        (Duration::from_millis(delay_ms), success, suffix, code_idx)
    }
}

#[async_trait]
impl ProviderAdapter for SimulatedAdapter {
    fn name(&self) -> &'static str {
        ref_prefix(self.channel)
    }

    async fn process(
        &self,
        transfer_id: TransferId,
        amount: u64,
        recipient_phone: &str,
    ) -> anyhow::Result<ProviderOutcome> {
        info!(
            transfer_id = %transfer_id,
            channel = %self.channel,
            amount = amount,
            recipient_phone = recipient_phone,
            "Processing transfer via simulated provider"
        );

        let (delay, success, suffix, code_idx) = self.draw();
        tokio::time::sleep(delay).await;

        if success {
            let provider_ref = format!(
                "{}-{}-{}",
                ref_prefix(self.channel),
                chrono::Utc::now().timestamp_millis(),
                suffix
            );
            Ok(ProviderOutcome::Success { provider_ref })
        } else {
            let error_code = decline_codes(self.channel)[code_idx].to_string();
            Ok(ProviderOutcome::Failure { error_code })
        }
    }
}
