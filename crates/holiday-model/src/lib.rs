//! Holiday Sync Model Types
//!
//! Defines the tenant routing configuration as exchanged with the
//! configuration store, plus the id lookup used by extraction and merging.

pub mod error;
pub mod index;
pub mod instance;
pub mod rule;

pub use error::ModelError;
pub use index::{Identified, IdIndex};
pub use instance::{ConfigurationInstance, ContentBlock, InstanceSummary, Payload, Schedule};
pub use rule::{RoutingRule, RuleKind};
