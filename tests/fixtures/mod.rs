//! Shared fixtures for integration tests
//!
//! - `instances/`: JSON documents in the on-disk store format
//! - builders for the small instances used by the propagation properties

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use holiday_sync::{ConfigurationInstance, ContentBlock, RoutingRule, RuleKind, Schedule};
use serde_json::json;

/// Directory holding the JSON instance fixtures
pub fn instances_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/instances")
}

/// Load one JSON instance fixture by file stem
pub fn load_instance(stem: &str) -> ConfigurationInstance {
    let path = instances_dir().join(format!("{stem}.json"));
    let content = std::fs::read_to_string(&path).expect("Failed to read fixture");
    serde_json::from_str(&content).expect("Failed to parse fixture")
}

/// Copy every JSON fixture into `dir`
pub fn seed_dir(dir: &Path) {
    for entry in std::fs::read_dir(instances_dir()).expect("Failed to list fixtures") {
        let path = entry.expect("Failed to read fixture entry").path();
        if path.extension().is_some_and(|e| e == "json") {
            let instance: ConfigurationInstance =
                serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
            std::fs::write(
                dir.join(format!("{}.json", instance.id)),
                serde_json::to_string_pretty(&instance).unwrap(),
            )
            .unwrap();
        }
    }
}

/// Source with one holiday rule: `(S1, C1 "Xmas Greeting")`
pub fn xmas_source() -> ConfigurationInstance {
    let mut instance = ConfigurationInstance::new("src", "Head Office");
    instance.schedules = vec![Schedule::new("S1", "Christmas").with_field("ranges", json!([]))];
    instance.content_blocks = vec![ContentBlock::new("C1", "Xmas Greeting")
        .with_field("steps", json!([{"say": "Merry Christmas"}]))];
    instance.routing_rules = vec![RoutingRule::holiday("S1", "C1")];
    instance
}

/// Source with two holiday rules sharing one content block, plus a default rule
pub fn multi_rule_source() -> ConfigurationInstance {
    let mut instance = ConfigurationInstance::new("src", "Head Office");
    instance.schedules = vec![
        Schedule::new("S1", "Christmas"),
        Schedule::new("S2", "Easter"),
        Schedule::new("S9", "Office Hours"),
    ];
    instance.content_blocks = vec![
        ContentBlock::new("C1", "Closed Message"),
        ContentBlock::new("C9", "Main Menu"),
    ];
    instance.routing_rules = vec![
        RoutingRule::holiday("S1", "C1"),
        RoutingRule::new(RuleKind::Default, "S9", "C9"),
        RoutingRule::holiday("S2", "C1"),
    ];
    instance
}

/// Target with no holiday configuration at all
pub fn empty_target(id: &str) -> ConfigurationInstance {
    let mut instance = ConfigurationInstance::new(id, format!("Branch {id}"));
    instance.schedules = vec![Schedule::new("T-hours", "Branch Hours")];
    instance.content_blocks = vec![ContentBlock::new("T-main", "Branch Menu")];
    instance.routing_rules = vec![RoutingRule::new(RuleKind::Default, "T-hours", "T-main")];
    instance
}

/// Content block names of an instance
pub fn block_names(instance: &ConfigurationInstance) -> BTreeSet<String> {
    instance.content_blocks.iter().map(|b| b.name.clone()).collect()
}

/// `(kind, schedule id, content block name)` per rule, resolving block ids by name
pub fn rule_shapes(instance: &ConfigurationInstance) -> BTreeSet<(String, String, String)> {
    instance
        .routing_rules
        .iter()
        .map(|r| {
            let block = instance
                .content_block(&r.content_block_id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| format!("<dangling {}>", r.content_block_id));
            (r.kind.to_string(), r.schedule_id.clone(), block)
        })
        .collect()
}
