//! Holiday subgraph extraction
//!
//! Filters a source instance down to its holiday rules plus the schedules
//! and content blocks those rules reference. Every reference is validated
//! before anything is returned, so a successful extraction is always safe to
//! merge.

use std::collections::{BTreeSet, HashSet};

use holiday_model::{ConfigurationInstance, ContentBlock, IdIndex, RoutingRule, Schedule};
use serde::Serialize;

use crate::error::{DanglingRef, PropagationError, ReferenceKind};

/// The holiday rules of one instance and everything they reference.
///
/// Schedules and content blocks are deduplicated by id and kept in order of
/// first reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidaySubgraph {
    /// Id of the instance this was extracted from
    pub source_id: String,
    pub rules: Vec<RoutingRule>,
    pub schedules: Vec<Schedule>,
    pub content_blocks: Vec<ContentBlock>,
    /// Names of the referenced content blocks, used for dedup on targets
    pub content_block_names: BTreeSet<String>,
    /// Every content block id of the source, holiday or not
    #[serde(skip)]
    pub source_block_ids: BTreeSet<String>,
}

impl HolidaySubgraph {
    pub fn schedule_ids(&self) -> BTreeSet<&str> {
        self.schedules.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn content_block_ids(&self) -> BTreeSet<&str> {
        self.content_blocks.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// Extract and validate the holiday subgraph of `source`
pub fn extract(source: &ConfigurationInstance) -> Result<HolidaySubgraph, PropagationError> {
    let holiday: Vec<(usize, &RoutingRule)> = source
        .routing_rules
        .iter()
        .enumerate()
        .filter(|(_, r)| r.kind.is_holiday())
        .collect();

    if holiday.is_empty() {
        return Err(PropagationError::NoSourceHolidayRules {
            instance: source.name.clone(),
        });
    }

    let schedules = IdIndex::build(&source.schedules)?;
    let blocks = IdIndex::build(&source.content_blocks)?;

    let mut dangling = Vec::new();
    let mut seen_schedules = HashSet::new();
    let mut seen_blocks = HashSet::new();
    let mut picked_schedules = Vec::new();
    let mut picked_blocks = Vec::new();

    for (rule_index, rule) in &holiday {
        match schedules.get(&rule.schedule_id) {
            Some(schedule) => {
                if seen_schedules.insert(schedule.id.as_str()) {
                    picked_schedules.push(schedule.clone());
                }
            }
            None => dangling.push(DanglingRef {
                rule_index: *rule_index,
                reference: ReferenceKind::Schedule,
                id: rule.schedule_id.clone(),
            }),
        }

        match blocks.get(&rule.content_block_id) {
            Some(block) => {
                if seen_blocks.insert(block.id.as_str()) {
                    picked_blocks.push(block.clone());
                }
            }
            None => dangling.push(DanglingRef {
                rule_index: *rule_index,
                reference: ReferenceKind::ContentBlock,
                id: rule.content_block_id.clone(),
            }),
        }
    }

    if !dangling.is_empty() {
        return Err(PropagationError::DanglingReference(dangling));
    }

    let content_block_names = picked_blocks.iter().map(|b| b.name.clone()).collect();

    tracing::debug!(
        source = %source.id,
        rules = holiday.len(),
        schedules = picked_schedules.len(),
        content_blocks = picked_blocks.len(),
        "extracted holiday subgraph"
    );

    Ok(HolidaySubgraph {
        source_id: source.id.clone(),
        rules: holiday.into_iter().map(|(_, r)| r.clone()).collect(),
        schedules: picked_schedules,
        content_blocks: picked_blocks,
        content_block_names,
        source_block_ids: source.content_blocks.iter().map(|b| b.id.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use holiday_model::{ModelError, RuleKind};
    use serde_json::json;

    fn source() -> ConfigurationInstance {
        let mut instance = ConfigurationInstance::new("src", "Head Office");
        instance.schedules = vec![
            Schedule::new("S1", "Christmas").with_field("dates", json!(["12-25"])),
            Schedule::new("S2", "New Year"),
            Schedule::new("S0", "Business hours"),
        ];
        instance.content_blocks = vec![
            ContentBlock::new("C1", "Xmas Greeting"),
            ContentBlock::new("C2", "Closed Greeting"),
            ContentBlock::new("C0", "Main Menu"),
        ];
        instance.routing_rules = vec![
            RoutingRule::new(RuleKind::Default, "S0", "C0"),
            RoutingRule::holiday("S1", "C1"),
            RoutingRule::holiday("S2", "C2"),
            RoutingRule::holiday("S1", "C2"),
        ];
        instance
    }

    #[test]
    fn test_extracts_holiday_rules_only() {
        let subgraph = extract(&source()).unwrap();

        assert_eq!(subgraph.rule_count(), 3);
        assert!(subgraph.rules.iter().all(|r| r.kind.is_holiday()));
        assert_eq!(subgraph.source_id, "src");
    }

    #[test]
    fn test_references_are_deduplicated_in_first_use_order() {
        let subgraph = extract(&source()).unwrap();

        let schedule_ids: Vec<_> = subgraph.schedules.iter().map(|s| s.id.as_str()).collect();
        let block_ids: Vec<_> = subgraph.content_blocks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(schedule_ids, vec!["S1", "S2"]);
        assert_eq!(block_ids, vec!["C1", "C2"]);
        assert_eq!(
            subgraph.content_block_names.iter().collect::<Vec<_>>(),
            vec!["Closed Greeting", "Xmas Greeting"]
        );
        assert_eq!(subgraph.schedules[0].body["dates"], json!(["12-25"]));
    }

    #[test]
    fn test_no_holiday_rules() {
        let mut instance = source();
        instance.routing_rules.retain(|r| !r.kind.is_holiday());

        let err = extract(&instance).unwrap_err();
        assert!(matches!(err, PropagationError::NoSourceHolidayRules { ref instance } if instance == "Head Office"));
    }

    #[test]
    fn test_dangling_references_reported_in_rule_order() {
        let mut instance = source();
        instance.routing_rules.push(RoutingRule::holiday("S404", "C1"));
        instance.routing_rules.push(RoutingRule::holiday("S2", "C404"));

        match extract(&instance).unwrap_err() {
            PropagationError::DanglingReference(refs) => {
                assert_eq!(refs.len(), 2);
                assert_eq!(refs[0].rule_index, 4);
                assert_eq!(refs[0].reference, ReferenceKind::Schedule);
                assert_eq!(refs[0].id, "S404");
                assert_eq!(refs[1].rule_index, 5);
                assert_eq!(refs[1].reference, ReferenceKind::ContentBlock);
                assert_eq!(refs[1].id, "C404");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_reference_on_non_holiday_rule_is_ignored() {
        let mut instance = source();
        instance
            .routing_rules
            .push(RoutingRule::new(RuleKind::AfterHours, "S404", "C404"));

        assert!(extract(&instance).is_ok());
    }

    #[test]
    fn test_duplicate_schedule_id() {
        let mut instance = source();
        instance.schedules.push(Schedule::new("S1", "Christmas copy"));

        let err = extract(&instance).unwrap_err();
        assert!(matches!(
            err,
            PropagationError::DuplicateId(ModelError::DuplicateId { collection: "schedules", .. })
        ));
    }

    #[test]
    fn test_shared_names_across_ids_collapse_in_name_set() {
        let mut instance = source();
        instance.content_blocks[1].name = "Xmas Greeting".to_string();

        let subgraph = extract(&instance).unwrap();
        assert_eq!(subgraph.content_blocks.len(), 2);
        assert_eq!(subgraph.content_block_names.len(), 1);
    }
}
