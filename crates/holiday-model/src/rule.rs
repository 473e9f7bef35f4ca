//! Routing rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::instance::Payload;

/// Kind of a routing rule.
///
/// Only the holiday/non-holiday split matters to propagation. Kinds this
/// crate does not know are kept as `Other` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Holiday,
    AfterHours,
    Default,
    Other(String),
}

impl RuleKind {
    pub fn is_holiday(&self) -> bool {
        matches!(self, RuleKind::Holiday)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Holiday => "holiday",
            RuleKind::AfterHours => "after_hours",
            RuleKind::Default => "default",
            RuleKind::Other(s) => s,
        }
    }
}

impl From<String> for RuleKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "holiday" => RuleKind::Holiday,
            "after_hours" => RuleKind::AfterHours,
            "default" => RuleKind::Default,
            _ => RuleKind::Other(s),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call-handling association between a schedule and a content block.
///
/// Rules have no identity of their own beyond the
/// `(kind, schedule_id, content_block_id)` tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    pub kind: RuleKind,

    /// Reference into the owning instance's schedules
    pub schedule_id: String,

    /// Reference into the owning instance's content blocks
    pub content_block_id: String,

    /// Store-defined fields (priority, labels, ...) carried verbatim
    #[serde(flatten)]
    pub extra: Payload,
}

impl RoutingRule {
    pub fn new(
        kind: RuleKind,
        schedule_id: impl Into<String>,
        content_block_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            schedule_id: schedule_id.into(),
            content_block_id: content_block_id.into(),
            extra: Payload::new(),
        }
    }

    /// Holiday rule shortcut
    pub fn holiday(schedule_id: impl Into<String>, content_block_id: impl Into<String>) -> Self {
        Self::new(RuleKind::Holiday, schedule_id, content_block_id)
    }

    /// Same rule pointed at a different content block
    pub fn retarget(&self, content_block_id: impl Into<String>) -> Self {
        Self {
            kind: self.kind.clone(),
            schedule_id: self.schedule_id.clone(),
            content_block_id: content_block_id.into(),
            extra: self.extra.clone(),
        }
    }
}
