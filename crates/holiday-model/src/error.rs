//! Error types for the configuration model.

/// Errors raised while indexing a configuration instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Two entities in one collection share an id. Well-formed instances
    /// never contain this, so it points at upstream data corruption.
    #[error("duplicate id '{id}' in {collection}")]
    DuplicateId {
        collection: &'static str,
        id: String,
    },
}
