//! Outcome reporting and exit codes
//!
//! Every target gets exactly one [`TargetOutcome`]; a [`RunSummary`]
//! aggregates them into the report printed at the end of a run.

mod failure;
mod run_summary;
mod target_outcome;

pub use failure::{ExitCode, TargetStatus};
pub use run_summary::RunSummary;
pub use target_outcome::TargetOutcome;
