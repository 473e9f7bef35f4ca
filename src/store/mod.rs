//! Configuration store collaborator
//!
//! The store owns every configuration instance. Propagation only needs
//! three operations:
//!
//! - `list_all`: `{id, name}` of every instance
//! - `fetch`: one full instance
//! - `persist`: replace one instance wholesale (no partial patches)
//!
//! Backends:
//! - [`DirectoryStore`]: one `<id>.json` file per instance
//! - [`MockStore`]: in-memory, with call counting and failure injection

mod dir;
pub mod mock;

pub use dir::DirectoryStore;
pub use mock::{FailureConfig, FailureInjector, MockStore, StoreOp};

use holiday_model::{ConfigurationInstance, InstanceSummary};

/// Errors surfaced by a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("instance not found: {0}")]
    NotFound(String),

    #[error("invalid instance id '{0}'")]
    InvalidId(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed instance {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Access to the configuration instances of one tenant account
pub trait ConfigStore {
    /// Summaries of every instance, in a stable order
    fn list_all(&self) -> Result<Vec<InstanceSummary>, StoreError>;

    /// Full instance including schedules, content blocks and rules
    fn fetch(&self, id: &str) -> Result<ConfigurationInstance, StoreError>;

    /// Replace the stored instance with `instance`
    fn persist(&self, instance: &ConfigurationInstance) -> Result<(), StoreError>;
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn list_all(&self) -> Result<Vec<InstanceSummary>, StoreError> {
        (**self).list_all()
    }

    fn fetch(&self, id: &str) -> Result<ConfigurationInstance, StoreError> {
        (**self).fetch(id)
    }

    fn persist(&self, instance: &ConfigurationInstance) -> Result<(), StoreError> {
        (**self).persist(instance)
    }
}
