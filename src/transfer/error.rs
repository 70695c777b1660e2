//! Transfer Error Types
//!
//! Lifecycle-level failures are typed and reported to the caller;
//! provider-level faults never appear here (the gateway converts them
//! to outcome data before they can propagate).

use thiserror::Error;

use super::types::TransferId;

/// Transfer error taxonomy
#[derive(Error, Debug, Clone)]
pub enum TransferError {
    #[error("Transfer not found: {0}")]
    NotFound(TransferId),

    /// Transfer is not in the required status for the requested
    /// transition, or reference generation exhausted its retries.
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid pagination cursor")]
    InvalidCursor,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal system error: {0}")]
    System(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::NotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::Conflict(_) => "CONFLICT",
            TransferError::InvalidCursor => "INVALID_CURSOR",
            TransferError::Validation(_) => "VALIDATION_ERROR",
            TransferError::System(_) => "SYSTEM_ERROR",
        }
    }

    /// Get HTTP status code suggestion for the transport layer
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::NotFound(_) => 404,
            TransferError::Conflict(_) => 409,
            TransferError::InvalidCursor | TransferError::Validation(_) => 400,
            TransferError::System(_) => 500,
        }
    }
}

impl From<anyhow::Error> for TransferError {
    fn from(e: anyhow::Error) -> Self {
        TransferError::System(e.to_string())
    }
}
