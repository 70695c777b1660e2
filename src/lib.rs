//! remitflow - Money Transfer Lifecycle Engine
//!
//! Records money-transfer requests, drives them through a small FSM
//! (PENDING → PROCESSING → SUCCESS/FAILED, PENDING → CANCELED), routes
//! the actual payout through one of four mobile-money channel adapters,
//! and keeps a best-effort audit trail of every transition.
//!
//! # Modules
//!
//! - [`transfer`] - lifecycle core: service, store, providers, pagination
//! - [`audit`] - append-only audit trail of lifecycle events
//! - [`config`] - YAML-backed application configuration
//! - [`logging`] - tracing subscriber setup

pub mod audit;
pub mod config;
pub mod logging;
pub mod transfer;

// Convenient re-exports at crate root
pub use audit::{AuditAction, AuditLogEntry, AuditRecorder};
pub use config::{AppConfig, ProviderConfig, TransferConfig};
pub use transfer::{
    Channel, ListQuery, NewTransfer, Page, ProviderAdapter, ProviderGateway, ProviderOutcome,
    Recipient, RecoverySweeper, Transfer, TransferError, TransferFilter, TransferId,
    TransferService, TransferStatus, TransferStore,
};
