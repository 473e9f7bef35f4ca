//! Id lookup over one collection of an instance.
//!
//! An index is built once per collection per pass and only read afterwards.

use std::collections::HashMap;

use crate::error::ModelError;

/// An entity with a store-assigned id.
pub trait Identified {
    /// Collection name used in error messages
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Borrowed `id -> entity` map.
#[derive(Debug)]
pub struct IdIndex<'a, T> {
    by_id: HashMap<&'a str, &'a T>,
}

impl<'a, T: Identified> IdIndex<'a, T> {
    /// Index a collection, failing on the first repeated id
    pub fn build(entities: &'a [T]) -> Result<Self, ModelError> {
        let mut by_id = HashMap::with_capacity(entities.len());
        for entity in entities {
            if by_id.insert(entity.id(), entity).is_some() {
                return Err(ModelError::DuplicateId {
                    collection: T::COLLECTION,
                    id: entity.id().to_string(),
                });
            }
        }
        Ok(Self { by_id })
    }

    pub fn get(&self, id: &str) -> Option<&'a T> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
