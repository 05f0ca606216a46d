pub mod ledger;
pub mod walk;

pub use ledger::SessionLedger;
pub use walk::{CallInput, CallWalk, StepReport, WalkSummary};
