//! Configuration instance and the entities it owns.
//!
//! Only `id` and `name` are interpreted; every other field of a schedule or
//! content block is carried as an opaque payload and copied verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::index::Identified;
use crate::rule::RoutingRule;

/// Opaque fields of a store entity.
pub type Payload = Map<String, Value>;

/// One tenant-level routing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationInstance {
    /// Stable identifier assigned by the store
    pub id: String,

    /// Display name, used for name-based selection
    pub name: String,

    /// Time windows, keyed by id
    #[serde(default)]
    pub schedules: Vec<Schedule>,

    /// Greeting/menu/action definitions (call flows), keyed by id
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,

    /// Ordered call-handling rules
    #[serde(default)]
    pub routing_rules: Vec<RoutingRule>,

    /// Any other instance-level fields the store sends back
    #[serde(flatten)]
    pub extra: Payload,
}

impl ConfigurationInstance {
    /// Create an empty instance
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            schedules: Vec::new(),
            content_blocks: Vec::new(),
            routing_rules: Vec::new(),
            extra: Payload::new(),
        }
    }

    /// Summary used when listing instances
    pub fn summary(&self) -> InstanceSummary {
        InstanceSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Iterate over the holiday rules in their original order
    pub fn holiday_rules(&self) -> impl Iterator<Item = &RoutingRule> {
        self.routing_rules.iter().filter(|r| r.kind.is_holiday())
    }

    /// Find a schedule by id
    pub fn schedule(&self, id: &str) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    /// Find a content block by id
    pub fn content_block(&self, id: &str) -> Option<&ContentBlock> {
        self.content_blocks.iter().find(|c| c.id == id)
    }
}

/// The `{id, name}` pair returned by the store's list operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub id: String,
    pub name: String,
}

/// A named recurring or dated time window.
///
/// Schedule ids are assigned by the owning service and are the unit of
/// sharing: two instances holding the same schedule id refer to the same
/// schedule object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub body: Payload,
}

impl Schedule {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body: Payload::new(),
        }
    }

    /// Attach an opaque body field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }
}

/// A greeting/menu/action definition executed when a rule fires.
///
/// Content block ids are arbitrary and safely regenerable; `name` is the only
/// key used to recognise a previously propagated block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub body: Payload,
}

impl ContentBlock {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body: Payload::new(),
        }
    }

    /// Attach an opaque body field
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    /// Structural deep copy of this block under a new id
    pub fn clone_with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: self.name.clone(),
            body: self.body.clone(),
        }
    }
}

impl Identified for Schedule {
    const COLLECTION: &'static str = "schedules";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for ContentBlock {
    const COLLECTION: &'static str = "contentBlocks";

    fn id(&self) -> &str {
        &self.id
    }
}
