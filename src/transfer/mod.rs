//! Atomic Transfers
//!
//! Moves funds between two accounts in a single PostgreSQL transaction.
//!
//! # State Machine
//!
//! ```text
//! STARTED → VALIDATING_SENDER → VALIDATING_RECEIVER → DEBITING → CREDITING → COMMITTING → COMMITTED
//!                          (any failure) ──────────────────────────────────────────────→ ROLLED_BACK
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Lock-Before-Check**: both rows are read `FOR UPDATE` before the sufficiency check
//! 2. **Ordered Locks**: rows are locked in ascending id order, so opposing transfers cannot deadlock
//! 3. **All-or-Nothing**: every failure rolls back explicitly; no debited-only state is ever visible
//! 4. **Retry Whole Transactions**: serialization failures restart from BEGIN, never mid-way

pub mod engine;
pub mod error;
pub mod state;
pub mod types;


// Re-exports for convenience
pub use engine::TransferEngine;
pub use error::TransferError;
pub use state::{TransferProgress, TransferState};
pub use types::{BalancePair, IsolationLevel, Party, TransferReceipt};
