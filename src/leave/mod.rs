//! Leave accounting.
//!
//! The catalog defines leave types, the ledger tracks per-year balances and
//! the workflow moves applications through their states, debiting and
//! crediting the ledger as it goes.

mod catalog;
mod ledger;
mod workflow;

pub use catalog::LeaveTypeCatalog;
pub use ledger::{InitializationReport, LeaveBalanceLedger};
pub use workflow::LeaveApplicationWorkflow;
