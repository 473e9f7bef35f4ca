//! Per-target outcome

use serde::Serialize;

use super::failure::TargetStatus;
use crate::merge::ChangeSet;

/// What happened to one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target_id: String,

    /// Display name, when the target could be fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,

    pub status: TargetStatus,

    /// Changes computed by the merge (present for propagated and simulated targets)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSet>,

    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetOutcome {
    pub fn propagated(target_id: String, target_name: String, changes: ChangeSet) -> Self {
        Self {
            target_id,
            target_name: Some(target_name),
            status: TargetStatus::Propagated,
            changes: Some(changes),
            error: None,
        }
    }

    pub fn simulated(target_id: String, target_name: String, changes: ChangeSet) -> Self {
        Self {
            target_id,
            target_name: Some(target_name),
            status: TargetStatus::Simulated,
            changes: Some(changes),
            error: None,
        }
    }

    pub fn failed(target_id: String, target_name: Option<String>, error: String) -> Self {
        Self {
            target_id,
            target_name,
            status: TargetStatus::Failed,
            changes: None,
            error: Some(error),
        }
    }

    pub fn skipped(target_id: String) -> Self {
        Self {
            target_id,
            target_name: None,
            status: TargetStatus::Skipped,
            changes: None,
            error: None,
        }
    }

    /// `name (id)`, or just the id when the name is unknown
    pub fn display_name(&self) -> String {
        match &self.target_name {
            Some(name) => format!("{} ({})", name, self.target_id),
            None => self.target_id.clone(),
        }
    }

    /// The one-line report for this target
    pub fn to_line(&self) -> String {
        let label = self.status.label();
        match (&self.status, &self.changes, &self.error) {
            (TargetStatus::Failed, _, Some(err)) => {
                format!("{}: {}: {}", label, self.display_name(), err)
            }
            (_, Some(changes), _) => {
                format!("{}: {}: {}", label, self.display_name(), changes.describe())
            }
            _ => format!("{}: {}", label, self.display_name()),
        }
    }

    /// Indented lines naming each content block the merge removes
    pub fn detail_lines(&self) -> Vec<String> {
        self.changes
            .iter()
            .flat_map(|c| &c.removed_content_blocks)
            .map(|b| format!("    removes content block {} ({})", b.name, b.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::RemovedBlock;

    #[test]
    fn test_failed_line_includes_reason() {
        let outcome = TargetOutcome::failed(
            "t-2".to_string(),
            Some("Branch".to_string()),
            "store rejected 't-2': read-only".to_string(),
        );
        assert_eq!(
            outcome.to_line(),
            "FAILED: Branch (t-2): store rejected 't-2': read-only"
        );
    }

    #[test]
    fn test_skipped_line() {
        assert_eq!(TargetOutcome::skipped("t-3".to_string()).to_line(), "SKIPPED: t-3");
    }

    #[test]
    fn test_simulated_line_describes_changes() {
        let changes = ChangeSet {
            added_holiday_rules: 1,
            ..ChangeSet::default()
        };
        let outcome = TargetOutcome::simulated("t-1".to_string(), "Branch".to_string(), changes);
        assert_eq!(
            outcome.to_line(),
            "SIMULATED: Branch (t-1): +1 holiday rules, +0 content blocks, +0 schedules"
        );
    }

    #[test]
    fn test_detail_lines_name_removed_blocks() {
        let changes = ChangeSet {
            removed_content_blocks: vec![RemovedBlock {
                id: "Cold".to_string(),
                name: "Xmas Greeting".to_string(),
            }],
            ..ChangeSet::default()
        };
        let outcome = TargetOutcome::simulated("t-1".to_string(), "Branch".to_string(), changes);
        assert_eq!(
            outcome.detail_lines(),
            vec!["    removes content block Xmas Greeting (Cold)".to_string()]
        );
        assert!(TargetOutcome::skipped("t-3".to_string()).detail_lines().is_empty());
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let json = serde_json::to_value(TargetOutcome::skipped("t-3".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"target_id": "t-3", "status": "skipped"}));
    }
}
