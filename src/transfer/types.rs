//! Transfer Core Types
//!
//! Type definitions for the transfer lifecycle engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::TransferStatus;

/// Transfer ID - ULID-based unique identifier
///
/// Using ULID provides:
/// - Monotonic, sortable IDs (lexicographic order == creation order)
/// - No coordination needed between workers
/// - 128-bit with good entropy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    /// Generate a new unique TransferId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the inner ULID value
    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Payment network a transfer is routed through.
///
/// The channel set is closed: dispatch over it is exhaustive and
/// compiler-checked. Unknown channel names only exist at the string
/// boundary (see `Channel::from_str`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Wave,
    OrangeMoney,
    FreeMoney,
    MoovMoney,
}

impl Channel {
    /// All supported channels, in dispatch order
    pub const ALL: [Channel; 4] = [
        Channel::Wave,
        Channel::OrangeMoney,
        Channel::FreeMoney,
        Channel::MoovMoney,
    ];

    /// Get the wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Wave => "WAVE",
            Channel::OrangeMoney => "ORANGE_MONEY",
            Channel::FreeMoney => "FREE_MONEY",
            Channel::MoovMoney => "MOOV_MONEY",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAVE" => Ok(Channel::Wave),
            "ORANGE_MONEY" => Ok(Channel::OrangeMoney),
            "FREE_MONEY" => Ok(Channel::FreeMoney),
            "MOOV_MONEY" => Ok(Channel::MoovMoney),
            _ => Err(()),
        }
    }
}

/// Transfer recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub phone: String,
    pub name: String,
}

impl Recipient {
    pub fn new(phone: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            name: name.into(),
        }
    }
}

/// Creation request, as handed over by the (external) transport layer.
///
/// Shape validation is the boundary's job; the service re-checks only
/// the parameters that would corrupt the lifecycle.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    /// Amount in the smallest currency unit
    pub amount: u64,
    /// Currency code; falls back to the configured default when absent
    pub currency: Option<String>,
    pub channel: Channel,
    pub recipient: Recipient,
    /// Opaque caller-supplied document
    pub metadata: Option<serde_json::Value>,
}

impl NewTransfer {
    pub fn new(amount: u64, channel: Channel, recipient: Recipient) -> Self {
        Self {
            amount,
            currency: None,
            channel,
            recipient,
            metadata: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A money-movement request and its current lifecycle state.
///
/// Owned exclusively by the store; every field except `status`,
/// `provider_ref`, `error_code` and `updated_at` is immutable after
/// creation. `total == amount + fees` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: TransferId,
    /// Human-readable identifier, `TRF-YYYYMMDD-XXXX`, unique
    pub reference: String,
    pub amount: u64,
    pub currency: String,
    pub channel: Channel,
    pub status: TransferStatus,
    pub fees: u64,
    pub total: u64,
    pub recipient_phone: String,
    pub recipient_name: String,
    pub metadata: serde_json::Value,
    /// Set only on the transition to SUCCESS
    pub provider_ref: Option<String>,
    /// Set only on the transition to FAILED
    pub error_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} {} {} via {} status={}",
            self.id, self.reference, self.amount, self.currency, self.channel, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_id_sortable() {
        let a = TransferId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = TransferId::new();
        assert!(b > a, "later ULIDs must sort after earlier ones");
    }

    #[test]
    fn test_transfer_id_string_roundtrip() {
        let id = TransferId::new();
        let parsed: TransferId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);

        assert!("not-a-ulid".parse::<TransferId>().is_err());
    }

    #[test]
    fn test_channel_roundtrip() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>(), Ok(channel));
        }
        assert!("PAYPAL".parse::<Channel>().is_err());
        assert!("wave".parse::<Channel>().is_err());
    }

    #[test]
    fn test_channel_serde_names() {
        let json = serde_json::to_string(&Channel::OrangeMoney).unwrap();
        assert_eq!(json, "\"ORANGE_MONEY\"");
        let back: Channel = serde_json::from_str("\"MOOV_MONEY\"").unwrap();
        assert_eq!(back, Channel::MoovMoney);
    }

    #[test]
    fn test_new_transfer_builder() {
        let req = NewTransfer::new(12_500, Channel::Wave, Recipient::new("+221771234567", "Awa"))
            .with_currency("XOF")
            .with_metadata(serde_json::json!({"note": "rent"}));

        assert_eq!(req.amount, 12_500);
        assert_eq!(req.currency.as_deref(), Some("XOF"));
        assert_eq!(req.metadata.unwrap()["note"], "rent");
    }
}
