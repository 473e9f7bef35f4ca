//! Holiday Sync - holiday routing propagation between tenant configurations
//!
//! Copies the holiday routing rules of one configuration instance, together
//! with the schedules and content blocks (call flows) they reference, into
//! one or more target instances:
//!
//! - schedules keep their ids and are shared with the source
//! - content blocks are deep-copied under fresh ids
//! - re-running with overwrite replaces earlier propagations instead of
//!   accumulating duplicates

pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod logging;
pub mod merge;
pub mod selection;
pub mod store;
pub mod summary;

pub use holiday_model::{
    ConfigurationInstance, ContentBlock, IdIndex, InstanceSummary, ModelError, RoutingRule,
    RuleKind, Schedule,
};

pub use config::{OutputFormat, Settings};
pub use driver::{FailurePolicy, PropagationDriver, PropagationOptions};
pub use error::{DanglingRef, PropagationError, ReferenceKind};
pub use extract::{extract, HolidaySubgraph};
pub use merge::{ChangeSet, IdGenerator, MergeOptions, MergeOutcome, TargetMerger, UuidGenerator};
pub use selection::{Picker, PromptPicker};
pub use store::{ConfigStore, DirectoryStore, MockStore, StoreError};
pub use summary::{ExitCode, RunSummary, TargetOutcome, TargetStatus};
