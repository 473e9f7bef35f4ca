//! Target merge
//!
//! Applies an extracted holiday subgraph to one target instance:
//! 1. Overwrite (optional): drop target holiday rules and content blocks
//!    whose name matches a source holiday block
//! 2. Schedules: shared by id, added only when the target lacks them
//! 3. Content blocks: deep-copied under freshly generated ids
//! 4. Rules: rebuilt against the shared schedule and the cloned block
//!
//! The target is never modified in place. Each collection is rebuilt once
//! and the merged instance is only returned when every step succeeded.

use std::collections::{HashMap, HashSet};

use holiday_model::{ConfigurationInstance, IdIndex, RoutingRule};
use serde::Serialize;

use crate::error::PropagationError;
use crate::extract::HolidaySubgraph;

/// How many generated ids may collide before a merge gives up
pub const MAX_ID_ATTEMPTS: u32 = 8;

/// Source of fresh content block identifiers
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Predictable `<prefix>-<n>` identifiers, for reproducible runs
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    prefix: String,
    next: u64,
}

impl SequenceGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequenceGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Merge behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Clear previously propagated holiday config before adding the new one
    pub overwrite: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// A content block removed from the target by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedBlock {
    pub id: String,
    pub name: String,
}

/// A source content block copied into the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClonedBlock {
    pub source_id: String,
    pub new_id: String,
    pub name: String,
}

/// Everything a merge changed on one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub removed_holiday_rules: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_content_blocks: Vec<RemovedBlock>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added_schedules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reused_schedules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cloned_content_blocks: Vec<ClonedBlock>,
    pub added_holiday_rules: usize,
}

impl ChangeSet {
    /// One-line description for terminal output
    pub fn describe(&self) -> String {
        let mut parts = vec![format!(
            "+{} holiday rules, +{} content blocks, +{} schedules",
            self.added_holiday_rules,
            self.cloned_content_blocks.len(),
            self.added_schedules.len()
        )];
        if !self.reused_schedules.is_empty() {
            parts.push(format!("{} schedules reused", self.reused_schedules.len()));
        }
        if self.removed_holiday_rules > 0 || !self.removed_content_blocks.is_empty() {
            parts.push(format!(
                "-{} holiday rules, -{} content blocks",
                self.removed_holiday_rules,
                self.removed_content_blocks.len()
            ));
        }
        parts.join(", ")
    }
}

/// Result of merging into one target
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: ConfigurationInstance,
    pub changes: ChangeSet,
}

/// Merges a holiday subgraph into target instances
#[derive(Debug)]
pub struct TargetMerger<G = UuidGenerator> {
    options: MergeOptions,
    ids: G,
}

impl<G: IdGenerator> TargetMerger<G> {
    pub fn with_generator(options: MergeOptions, ids: G) -> Self {
        Self { options, ids }
    }

    /// Produce a new version of `target` carrying the subgraph's holiday behaviour
    pub fn merge(
        &mut self,
        subgraph: &HolidaySubgraph,
        target: &ConfigurationInstance,
    ) -> Result<MergeOutcome, PropagationError> {
        let target_schedules = IdIndex::build(&target.schedules)?;
        let target_blocks = IdIndex::build(&target.content_blocks)?;
        let mut changes = ChangeSet::default();

        // Overwrite: holiday rules go, name-colliding content blocks go.
        let mut routing_rules: Vec<RoutingRule> = Vec::with_capacity(
            target.routing_rules.len() + subgraph.rules.len(),
        );
        let mut content_blocks = Vec::with_capacity(
            target.content_blocks.len() + subgraph.content_blocks.len(),
        );
        if self.options.overwrite {
            for rule in &target.routing_rules {
                if rule.kind.is_holiday() {
                    changes.removed_holiday_rules += 1;
                } else {
                    routing_rules.push(rule.clone());
                }
            }
            for block in &target.content_blocks {
                if subgraph.content_block_names.contains(&block.name) {
                    tracing::debug!(instance = %target.id, id = %block.id, name = %block.name, "removing content block by name");
                    changes.removed_content_blocks.push(RemovedBlock {
                        id: block.id.clone(),
                        name: block.name.clone(),
                    });
                } else {
                    content_blocks.push(block.clone());
                }
            }
        } else {
            routing_rules.extend(target.routing_rules.iter().cloned());
            content_blocks.extend(target.content_blocks.iter().cloned());
        }

        // Schedules are shared by id; an existing target copy wins.
        let mut schedules = target.schedules.clone();
        for schedule in &subgraph.schedules {
            if target_schedules.contains(&schedule.id) {
                changes.reused_schedules.push(schedule.id.clone());
            } else {
                schedules.push(schedule.clone());
                changes.added_schedules.push(schedule.id.clone());
            }
        }

        // Content blocks get new ids that collide with nothing on either side.
        let mut taken: HashSet<String> = subgraph.source_block_ids.iter().cloned().collect();

        let mut mapping: HashMap<&str, String> = HashMap::new();
        for block in &subgraph.content_blocks {
            let new_id = self.fresh_id(|id| target_blocks.contains(id) || taken.contains(id))?;
            taken.insert(new_id.clone());
            tracing::debug!(instance = %target.id, from = %block.id, to = %new_id, name = %block.name, "cloning content block");
            content_blocks.push(block.clone_with_id(new_id.clone()));
            changes.cloned_content_blocks.push(ClonedBlock {
                source_id: block.id.clone(),
                new_id: new_id.clone(),
                name: block.name.clone(),
            });
            mapping.insert(block.id.as_str(), new_id);
        }

        for rule in &subgraph.rules {
            let new_id = mapping.get(rule.content_block_id.as_str()).ok_or_else(|| {
                PropagationError::UnmappedContentBlock {
                    id: rule.content_block_id.clone(),
                }
            })?;
            routing_rules.push(rule.retarget(new_id.clone()));
            changes.added_holiday_rules += 1;
        }

        let merged = ConfigurationInstance {
            id: target.id.clone(),
            name: target.name.clone(),
            schedules,
            content_blocks,
            routing_rules,
            extra: target.extra.clone(),
        };

        Ok(MergeOutcome { merged, changes })
    }

    fn fresh_id(&mut self, is_taken: impl Fn(&str) -> bool) -> Result<String, PropagationError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !is_taken(&id) {
                return Ok(id);
            }
        }
        Err(PropagationError::IdGeneration {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use holiday_model::{ContentBlock, RuleKind, Schedule};
    use serde_json::json;

    fn source() -> ConfigurationInstance {
        let mut instance = ConfigurationInstance::new("src", "Head Office");
        instance.schedules = vec![
            Schedule::new("S1", "Christmas").with_field("dates", json!(["12-24", "12-25"])),
            Schedule::new("S2", "New Year"),
        ];
        instance.content_blocks = vec![
            ContentBlock::new("C1", "Xmas Greeting").with_field("prompt", json!({"tts": "Closed"})),
            ContentBlock::new("C2", "New Year Greeting"),
        ];
        instance.routing_rules = vec![
            RoutingRule::holiday("S1", "C1"),
            RoutingRule::holiday("S2", "C2"),
            RoutingRule::holiday("S2", "C1"),
        ];
        instance
    }

    fn target() -> ConfigurationInstance {
        let mut instance = ConfigurationInstance::new("t-1", "Branch");
        instance.schedules = vec![Schedule::new("S0", "Business hours")];
        instance.content_blocks = vec![ContentBlock::new("M1", "Main Menu")];
        instance.routing_rules = vec![RoutingRule::new(RuleKind::Default, "S0", "M1")];
        instance
    }

    fn merger() -> TargetMerger<SequenceGenerator> {
        TargetMerger::with_generator(MergeOptions::default(), SequenceGenerator::new("new"))
    }

    #[test]
    fn test_merge_into_empty_target() {
        let subgraph = extract(&source()).unwrap();
        let outcome = merger().merge(&subgraph, &target()).unwrap();
        let merged = &outcome.merged;

        assert_eq!(merged.id, "t-1");
        assert_eq!(merged.name, "Branch");
        assert_eq!(merged.schedules.len(), 3);
        assert_eq!(merged.content_blocks.len(), 3);
        assert_eq!(merged.holiday_rules().count(), 3);

        // C1 is referenced twice but cloned once
        assert_eq!(outcome.changes.cloned_content_blocks.len(), 2);
        let rules: Vec<_> = merged
            .holiday_rules()
            .map(|r| (r.schedule_id.as_str(), r.content_block_id.as_str()))
            .collect();
        assert_eq!(rules, vec![("S1", "new-1"), ("S2", "new-2"), ("S2", "new-1")]);
    }

    #[test]
    fn test_cloned_block_keeps_body_and_name() {
        let subgraph = extract(&source()).unwrap();
        let merged = merger().merge(&subgraph, &target()).unwrap().merged;

        let clone = merged.content_block("new-1").unwrap();
        assert_eq!(clone.name, "Xmas Greeting");
        assert_eq!(clone.body["prompt"]["tts"], "Closed");
    }

    #[test]
    fn test_existing_schedule_is_not_overwritten() {
        let subgraph = extract(&source()).unwrap();
        let mut target = target();
        target
            .schedules
            .push(Schedule::new("S1", "Christmas").with_field("dates", json!(["12-25"])));

        let outcome = merger().merge(&subgraph, &target).unwrap();

        assert_eq!(outcome.changes.reused_schedules, vec!["S1".to_string()]);
        assert_eq!(outcome.changes.added_schedules, vec!["S2".to_string()]);
        let s1: Vec<_> = outcome.merged.schedules.iter().filter(|s| s.id == "S1").collect();
        assert_eq!(s1.len(), 1);
        assert_eq!(s1[0].body["dates"], json!(["12-25"]));
    }

    #[test]
    fn test_overwrite_removes_holiday_rules_and_named_blocks() {
        let subgraph = extract(&source()).unwrap();
        let mut target = target();
        target.content_blocks.push(ContentBlock::new("OLD", "Xmas Greeting"));
        target.routing_rules.push(RoutingRule::holiday("S9", "OLD"));

        let outcome = merger().merge(&subgraph, &target).unwrap();

        assert_eq!(outcome.changes.removed_holiday_rules, 1);
        assert_eq!(
            outcome.changes.removed_content_blocks,
            vec![RemovedBlock {
                id: "OLD".to_string(),
                name: "Xmas Greeting".to_string()
            }]
        );
        assert!(outcome.merged.content_block("OLD").is_none());
        assert!(outcome.merged.holiday_rules().all(|r| r.schedule_id != "S9"));
    }

    #[test]
    fn test_without_overwrite_nothing_is_removed() {
        let subgraph = extract(&source()).unwrap();
        let mut target = target();
        target.content_blocks.push(ContentBlock::new("OLD", "Xmas Greeting"));
        target.routing_rules.push(RoutingRule::holiday("S9", "OLD"));

        let mut merger =
            TargetMerger::with_generator(MergeOptions { overwrite: false }, SequenceGenerator::new("n"));
        let outcome = merger.merge(&subgraph, &target).unwrap();

        assert_eq!(outcome.changes.removed_holiday_rules, 0);
        assert!(outcome.changes.removed_content_blocks.is_empty());
        assert_eq!(outcome.merged.holiday_rules().count(), 4);
        assert_eq!(
            outcome
                .merged
                .content_blocks
                .iter()
                .filter(|b| b.name == "Xmas Greeting")
                .count(),
            2
        );
    }

    #[test]
    fn test_non_holiday_rules_untouched() {
        let subgraph = extract(&source()).unwrap();
        let mut target = target();
        let mut after_hours = RoutingRule::new(RuleKind::AfterHours, "S0", "M1");
        after_hours.extra.insert("priority".to_string(), json!(2));
        target.routing_rules.push(after_hours.clone());
        target
            .routing_rules
            .push(RoutingRule::new(RuleKind::Other("overflow".to_string()), "S0", "M1"));

        let merged = merger().merge(&subgraph, &target).unwrap().merged;

        let kept: Vec<_> = merged
            .routing_rules
            .iter()
            .filter(|r| !r.kind.is_holiday())
            .cloned()
            .collect();
        assert_eq!(kept, target.routing_rules);
    }

    #[test]
    fn test_generated_ids_skip_collisions() {
        struct Stuck(Vec<&'static str>);
        impl IdGenerator for Stuck {
            fn next_id(&mut self) -> String {
                self.0.remove(0).to_string()
            }
        }

        let subgraph = extract(&source()).unwrap();
        // "M1" exists in the target and "C2" in the source
        let mut merger = TargetMerger::with_generator(
            MergeOptions::default(),
            Stuck(vec!["M1", "C2", "fresh-a", "fresh-a", "fresh-b"]),
        );
        let outcome = merger.merge(&subgraph, &target()).unwrap();

        let ids: Vec<_> = outcome
            .changes
            .cloned_content_blocks
            .iter()
            .map(|c| c.new_id.as_str())
            .collect();
        assert_eq!(ids, vec!["fresh-a", "fresh-b"]);
    }

    #[test]
    fn test_generated_ids_avoid_non_holiday_source_blocks() {
        let mut source = source();
        source.content_blocks.push(ContentBlock::new("new-1", "Main Menu"));
        source
            .routing_rules
            .push(RoutingRule::new(RuleKind::Default, "S1", "new-1"));
        let subgraph = extract(&source).unwrap();
        assert!(subgraph.source_block_ids.contains("new-1"));

        let outcome = merger().merge(&subgraph, &target()).unwrap();

        let source_ids: HashSet<_> = source.content_blocks.iter().map(|b| b.id.as_str()).collect();
        for rule in outcome.merged.holiday_rules() {
            assert!(!source_ids.contains(rule.content_block_id.as_str()));
        }
        let ids: Vec<_> = outcome
            .changes
            .cloned_content_blocks
            .iter()
            .map(|c| c.new_id.as_str())
            .collect();
        assert_eq!(ids, vec!["new-2", "new-3"]);
    }

    #[test]
    fn test_id_generation_gives_up() {
        struct Constant;
        impl IdGenerator for Constant {
            fn next_id(&mut self) -> String {
                "M1".to_string()
            }
        }

        let subgraph = extract(&source()).unwrap();
        let mut merger = TargetMerger::with_generator(MergeOptions::default(), Constant);
        let err = merger.merge(&subgraph, &target()).unwrap_err();

        assert!(matches!(err, PropagationError::IdGeneration { attempts: MAX_ID_ATTEMPTS }));
    }

    #[test]
    fn test_unmapped_content_block_aborts() {
        let mut subgraph = extract(&source()).unwrap();
        subgraph.rules.push(RoutingRule::holiday("S1", "C-unknown"));

        let err = merger().merge(&subgraph, &target()).unwrap_err();
        assert!(matches!(err, PropagationError::UnmappedContentBlock { ref id } if id == "C-unknown"));
    }

    #[test]
    fn test_duplicate_target_id_fails_the_target() {
        let subgraph = extract(&source()).unwrap();
        let mut target = target();
        target.content_blocks.push(ContentBlock::new("M1", "Another menu"));

        let err = merger().merge(&subgraph, &target).unwrap_err();
        assert!(matches!(err, PropagationError::DuplicateId(_)));
    }

    #[test]
    fn test_uuid_generator_is_unique() {
        let mut ids = UuidGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn test_change_set_describe() {
        let subgraph = extract(&source()).unwrap();
        let mut target = target();
        target.routing_rules.push(RoutingRule::holiday("S1", "M1"));
        target.schedules.push(Schedule::new("S1", "Christmas"));

        let outcome = merger().merge(&subgraph, &target).unwrap();
        assert_eq!(
            outcome.changes.describe(),
            "+3 holiday rules, +2 content blocks, +1 schedules, 1 schedules reused, -1 holiday rules, -0 content blocks"
        );
    }
}
