//! Transfer Lifecycle Core
//!
//! Records money-transfer requests and drives them through a small FSM:
//!
//! ```text
//! PENDING → PROCESSING → SUCCESS
//!    ↓            ↓
//! CANCELED      FAILED
//! ```
//!
//! # Architecture
//!
//! - [`service`] — the orchestrator: create / list / get / process / cancel
//! - [`store`] — ordered in-memory record store with CAS status writes
//! - [`providers`] — channel adapters behind [`providers::ProviderGateway`]
//! - [`query`] — filtered, cursor-paginated listing
//! - [`fees`] / [`reference`] — pure fee rule and reference minting
//! - [`worker`] — recovery sweep for transfers stranded in PROCESSING
//!
//! # Safety Invariants
//!
//! 1. **CAS transitions**: status writes are conditional on the expected
//!    current status; concurrent `process()` calls have one winner
//! 2. **Outcomes, not exceptions**: provider faults become outcome data
//!    at the gateway boundary and terminate the transfer as FAILED
//! 3. **Best-effort audit**: audit appends never fail a lifecycle write

pub mod error;
pub mod fees;
pub mod providers;
pub mod query;
pub mod reference;
pub mod service;
pub mod status;
pub mod store;
pub mod types;
pub mod worker;


// Re-exports for convenience
pub use error::TransferError;
pub use providers::{ProviderAdapter, ProviderGateway, ProviderOutcome};
pub use query::{ListQuery, Page, TransferFilter};
pub use reference::ReferenceGenerator;
pub use service::TransferService;
pub use status::TransferStatus;
pub use store::TransferStore;
pub use types::{Channel, NewTransfer, Recipient, Transfer, TransferId};
pub use worker::RecoverySweeper;
