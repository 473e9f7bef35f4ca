//! Propagation driver
//!
//! Sequences one propagation run:
//! 1. Fetch and validate the source (any failure aborts before targets are read)
//! 2. For each target, in order: fetch, merge, then persist (commit mode only)
//! 3. Record one [`TargetOutcome`] per target
//!
//! Targets are independent units of work. A failed target never rolls back
//! targets that were already persisted. Whether later targets still run is
//! governed by [`FailurePolicy`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PropagationError;
use crate::extract::{extract, HolidaySubgraph};
use crate::merge::{IdGenerator, MergeOptions, TargetMerger, UuidGenerator};
use crate::selection::{resolve_all, resolve_by_name};
use crate::store::ConfigStore;
use crate::summary::{RunSummary, TargetOutcome};

/// What to do with the remaining targets after one fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the failure and keep going
    #[default]
    Continue,
    /// Stop; remaining targets are reported as skipped
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continue" => Ok(FailurePolicy::Continue),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(format!("unknown failure policy '{other}' (expected continue or abort)")),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Continue => write!(f, "continue"),
            FailurePolicy::Abort => write!(f, "abort"),
        }
    }
}

/// Run-level switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Clear previously propagated holiday config on each target
    pub overwrite: bool,
    /// Compute and report changes without persisting anything
    pub simulate: bool,
    pub on_target_failure: FailurePolicy,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            simulate: false,
            on_target_failure: FailurePolicy::Continue,
        }
    }
}

/// A target failure together with whatever was learned about the target
struct TargetFailure {
    name: Option<String>,
    error: PropagationError,
}

impl From<PropagationError> for TargetFailure {
    fn from(error: PropagationError) -> Self {
        Self { name: None, error }
    }
}

/// Drives extraction, merging and persistence against a store
pub struct PropagationDriver<S, G = UuidGenerator> {
    store: S,
    merger: TargetMerger<G>,
    options: PropagationOptions,
}

impl<S: ConfigStore> PropagationDriver<S, UuidGenerator> {
    pub fn new(store: S, options: PropagationOptions) -> Self {
        Self::with_generator(store, options, UuidGenerator)
    }
}

impl<S: ConfigStore, G: IdGenerator> PropagationDriver<S, G> {
    pub fn with_generator(store: S, options: PropagationOptions, ids: G) -> Self {
        let merger = TargetMerger::with_generator(
            MergeOptions {
                overwrite: options.overwrite,
            },
            ids,
        );
        Self {
            store,
            merger,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve source and target names, then run
    ///
    /// Every name must resolve to exactly one instance before anything is
    /// fetched.
    pub fn run_by_names(
        &mut self,
        source_name: &str,
        target_names: &[String],
    ) -> Result<RunSummary, PropagationError> {
        let summaries = self.store.list_all()?;
        let source = resolve_by_name(&summaries, source_name)?;
        let targets: Vec<String> = resolve_all(&summaries, target_names)?
            .into_iter()
            .map(|s| s.id.clone())
            .collect();
        let source_id = source.id.clone();
        self.run(&source_id, &targets)
    }

    /// Propagate the holiday configuration of `source_id` to every target
    ///
    /// Returns `Err` only for source-side failures, which happen before any
    /// target is read. Per-target failures are reported in the summary.
    pub fn run(
        &mut self,
        source_id: &str,
        target_ids: &[String],
    ) -> Result<RunSummary, PropagationError> {
        let source = self
            .store
            .fetch(source_id)
            .map_err(|source| PropagationError::Fetch {
                id: source_id.to_string(),
                source,
            })?;
        let subgraph = extract(&source)?;
        info!(
            source = %source.name,
            rules = subgraph.rule_count(),
            schedules = subgraph.schedules.len(),
            content_blocks = subgraph.content_blocks.len(),
            simulate = self.options.simulate,
            "holiday configuration extracted"
        );

        let mut outcomes = Vec::with_capacity(target_ids.len());
        let mut aborted = false;
        let mut seen = std::collections::HashSet::new();
        for target_id in target_ids {
            if !seen.insert(target_id.as_str()) {
                continue;
            }
            if aborted {
                outcomes.push(TargetOutcome::skipped(target_id.clone()));
                continue;
            }

            let outcome = match self.propagate_one(&subgraph, target_id) {
                Ok(outcome) => outcome,
                Err(failure) => {
                    warn!(target_id = %target_id, error = %failure.error, "target failed");
                    if self.options.on_target_failure == FailurePolicy::Abort {
                        aborted = true;
                    }
                    TargetOutcome::failed(target_id.clone(), failure.name, failure.error.to_string())
                }
            };
            outcomes.push(outcome);
        }

        Ok(RunSummary::from_outcomes(
            source.id.clone(),
            source.name.clone(),
            self.options.simulate,
            outcomes,
        ))
    }

    fn propagate_one(
        &mut self,
        subgraph: &HolidaySubgraph,
        target_id: &str,
    ) -> Result<TargetOutcome, TargetFailure> {
        if target_id == subgraph.source_id {
            return Err(PropagationError::TargetIsSource {
                id: target_id.to_string(),
            }
            .into());
        }

        let target = self
            .store
            .fetch(target_id)
            .map_err(|source| PropagationError::Fetch {
                id: target_id.to_string(),
                source,
            })?;
        let name = target.name.clone();
        let fail = |error| TargetFailure {
            name: Some(name.clone()),
            error,
        };

        let outcome = self.merger.merge(subgraph, &target).map_err(fail)?;

        if self.options.simulate {
            info!(target_id, changes = %outcome.changes.describe(), "simulated");
            return Ok(TargetOutcome::simulated(
                target.id.clone(),
                name.clone(),
                outcome.changes,
            ));
        }

        self.store.persist(&outcome.merged).map_err(|e| {
            fail(PropagationError::PersistFailure {
                target: target.id.clone(),
                reason: e.to_string(),
            })
        })?;
        info!(target_id, changes = %outcome.changes.describe(), "propagated");

        Ok(TargetOutcome::propagated(
            target.id.clone(),
            name.clone(),
            outcome.changes,
        ))
    }
}
