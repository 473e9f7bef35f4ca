//! Error types for holiday propagation

use std::fmt;

use holiday_model::ModelError;

use crate::store::StoreError;
use crate::summary::ExitCode;

/// Which reference of a holiday rule failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Schedule,
    ContentBlock,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Schedule => write!(f, "schedule"),
            ReferenceKind::ContentBlock => write!(f, "content block"),
        }
    }
}

/// A holiday rule reference with no matching entity in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingRef {
    /// Position of the rule in the source's `routingRules`
    pub rule_index: usize,
    pub reference: ReferenceKind,
    pub id: String,
}

impl fmt::Display for DanglingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule #{} references missing {} '{}'",
            self.rule_index, self.reference, self.id
        )
    }
}

/// Errors raised while extracting, merging or persisting holiday configuration
#[derive(Debug, thiserror::Error)]
pub enum PropagationError {
    #[error("source '{instance}' has no holiday routing rules")]
    NoSourceHolidayRules { instance: String },

    #[error("dangling reference in source: {}", join_refs(.0))]
    DanglingReference(Vec<DanglingRef>),

    #[error("expected exactly one instance named '{name}', found {matches}")]
    InstanceNotFound { name: String, matches: usize },

    #[error("no cloned content block for source id '{id}'")]
    UnmappedContentBlock { id: String },

    #[error("store rejected '{target}': {reason}")]
    PersistFailure { target: String, reason: String },

    #[error(transparent)]
    DuplicateId(#[from] ModelError),

    #[error("failed to fetch '{id}': {source}")]
    Fetch {
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("could not generate a unique content block id after {attempts} attempts")]
    IdGeneration { attempts: u32 },

    #[error("target '{id}' is the propagation source")]
    TargetIsSource { id: String },

    #[error("selection failed: {0}")]
    Selection(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_refs(refs: &[DanglingRef]) -> String {
    refs.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl PropagationError {
    /// Errors that invalidate the source and so abort before any target is read
    pub fn is_source_fatal(&self) -> bool {
        matches!(
            self,
            PropagationError::NoSourceHolidayRules { .. }
                | PropagationError::DanglingReference(_)
                | PropagationError::DuplicateId(_)
        )
    }

    /// Stable process exit code for this error when it ends the run
    pub fn exit_code(&self) -> ExitCode {
        match self {
            PropagationError::NoSourceHolidayRules { .. }
            | PropagationError::DanglingReference(_)
            | PropagationError::DuplicateId(_) => ExitCode::SourceInvalid,
            PropagationError::InstanceNotFound { .. } => ExitCode::InstanceNotFound,
            PropagationError::Selection(_) => ExitCode::Usage,
            PropagationError::Store(_) | PropagationError::Fetch { .. } => {
                ExitCode::StoreUnavailable
            }
            PropagationError::UnmappedContentBlock { .. }
            | PropagationError::PersistFailure { .. }
            | PropagationError::IdGeneration { .. }
            | PropagationError::TargetIsSource { .. } => ExitCode::TargetFailed,
        }
    }
}
