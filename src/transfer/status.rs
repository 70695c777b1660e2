//! Transfer Status FSM
//!
//! ```text
//! PENDING → PROCESSING → SUCCESS
//!    ↓            ↓
//! CANCELED      FAILED
//! ```
//!
//! Terminal states: SUCCESS, FAILED, CANCELED. No other edges exist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Initial state - transfer recorded, not yet sent to a provider
    Pending,
    /// Transient state - a provider call is in flight
    Processing,
    /// Terminal: provider confirmed the payout
    Success,
    /// Terminal: provider declined or the call faulted
    Failed,
    /// Terminal: canceled before processing started
    Canceled,
}

impl TransferStatus {
    /// Check if this is a terminal status (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Success | TransferStatus::Failed | TransferStatus::Canceled
        )
    }

    /// Check whether the FSM allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        matches!(
            (self, next),
            (TransferStatus::Pending, TransferStatus::Processing)
                | (TransferStatus::Pending, TransferStatus::Canceled)
                | (TransferStatus::Processing, TransferStatus::Success)
                | (TransferStatus::Processing, TransferStatus::Failed)
        )
    }

    /// Get the wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Processing => "PROCESSING",
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failed => "FAILED",
            TransferStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransferStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TransferStatus::Pending),
            "PROCESSING" => Ok(TransferStatus::Processing),
            "SUCCESS" => Ok(TransferStatus::Success),
            "FAILED" => Ok(TransferStatus::Failed),
            "CANCELED" => Ok(TransferStatus::Canceled),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TransferStatus::Success.is_terminal());
        assert!(TransferStatus::Failed.is_terminal());
        assert!(TransferStatus::Canceled.is_terminal());

        assert!(!TransferStatus::Pending.is_terminal());
        assert!(!TransferStatus::Processing.is_terminal());
    }

    #[test]
    fn test_allowed_edges() {
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Processing));
        assert!(TransferStatus::Pending.can_transition_to(TransferStatus::Canceled));
        assert!(TransferStatus::Processing.can_transition_to(TransferStatus::Success));
        assert!(TransferStatus::Processing.can_transition_to(TransferStatus::Failed));
    }

    #[test]
    fn test_forbidden_edges() {
        // No edge out of terminal states
        for terminal in [
            TransferStatus::Success,
            TransferStatus::Failed,
            TransferStatus::Canceled,
        ] {
            for next in [
                TransferStatus::Pending,
                TransferStatus::Processing,
                TransferStatus::Success,
                TransferStatus::Failed,
                TransferStatus::Canceled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }

        // PROCESSING cannot be canceled or re-entered
        assert!(!TransferStatus::Processing.can_transition_to(TransferStatus::Canceled));
        assert!(!TransferStatus::Processing.can_transition_to(TransferStatus::Processing));
        assert!(!TransferStatus::Pending.can_transition_to(TransferStatus::Success));
        assert!(!TransferStatus::Pending.can_transition_to(TransferStatus::Failed));
    }

    #[test]
    fn test_str_roundtrip() {
        for status in [
            TransferStatus::Pending,
            TransferStatus::Processing,
            TransferStatus::Success,
            TransferStatus::Failed,
            TransferStatus::Canceled,
        ] {
            assert_eq!(status.as_str().parse::<TransferStatus>(), Ok(status));
        }
        assert!("DONE".parse::<TransferStatus>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferStatus::Pending.to_string(), "PENDING");
        assert_eq!(TransferStatus::Canceled.to_string(), "CANCELED");
    }
}
