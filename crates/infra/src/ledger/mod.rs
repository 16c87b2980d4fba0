//! Append-only stage history ledger.
//!
//! Records are only ever appended; there is no operation that edits or removes
//! a single record.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStageLedger;
pub use r#trait::{LedgerError, LedgerRecords, StageLedger};
