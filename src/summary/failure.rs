//! Target status and stable exit codes

use serde::{Deserialize, Serialize};

/// Outcome of one target in a propagation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    /// Merged and persisted
    Propagated,
    /// Merged in simulate mode; nothing was written
    Simulated,
    /// Fetch, merge or persist failed
    Failed,
    /// Not attempted because an earlier target failed under the abort policy
    Skipped,
}

impl TargetStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TargetStatus::Failed)
    }

    /// Label printed at the start of a target's report line
    pub fn label(&self) -> &'static str {
        match self {
            TargetStatus::Propagated => "OK",
            TargetStatus::Simulated => "SIMULATED",
            TargetStatus::Failed => "FAILED",
            TargetStatus::Skipped => "SKIPPED",
        }
    }
}

/// Stable process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    /// Every target propagated (or simulated)
    #[default]
    Success = 0,
    /// Bad flags or configuration
    Usage = 2,
    /// Source has no holiday rules, a dangling reference, or duplicate ids
    SourceInvalid = 10,
    /// A named instance did not resolve to exactly one instance
    InstanceNotFound = 20,
    /// At least one target failed
    TargetFailed = 30,
    /// The store could not be listed or read
    StoreUnavailable = 40,
}

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::Success),
            2 => Some(ExitCode::Usage),
            10 => Some(ExitCode::SourceInvalid),
            20 => Some(ExitCode::InstanceNotFound),
            30 => Some(ExitCode::TargetFailed),
            40 => Some(ExitCode::StoreUnavailable),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}
