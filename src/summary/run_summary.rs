//! Run summary across all targets

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::failure::{ExitCode, TargetStatus};
use super::target_outcome::TargetOutcome;

/// Summary of one propagation run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Source instance id
    pub source_id: String,

    /// Source instance name
    pub source_name: String,

    /// True when nothing was persisted
    pub simulate: bool,

    /// When the run finished
    pub created_at: DateTime<Utc>,

    /// One entry per requested target, in request order
    pub targets: Vec<TargetOutcome>,

    pub propagated: usize,
    pub simulated: usize,
    pub failed: usize,
    pub skipped: usize,

    /// Aggregated exit code
    pub exit_code: i32,

    /// Human-readable summary
    pub human_summary: String,
}

impl RunSummary {
    /// Aggregate per-target outcomes
    pub fn from_outcomes(
        source_id: String,
        source_name: String,
        simulate: bool,
        targets: Vec<TargetOutcome>,
    ) -> Self {
        let count = |status: TargetStatus| targets.iter().filter(|t| t.status == status).count();
        let propagated = count(TargetStatus::Propagated);
        let simulated = count(TargetStatus::Simulated);
        let failed = count(TargetStatus::Failed);
        let skipped = count(TargetStatus::Skipped);

        let exit_code = if failed > 0 {
            ExitCode::TargetFailed
        } else {
            ExitCode::Success
        };
        let human_summary =
            Self::generate_human_summary(targets.len(), propagated, simulated, failed, skipped);

        Self {
            source_id,
            source_name,
            simulate,
            created_at: Utc::now(),
            targets,
            propagated,
            simulated,
            failed,
            skipped,
            exit_code: exit_code.as_i32(),
            human_summary,
        }
    }

    fn generate_human_summary(
        total: usize,
        propagated: usize,
        simulated: usize,
        failed: usize,
        skipped: usize,
    ) -> String {
        if total == 0 {
            return "No targets selected".to_string();
        }
        let mut line = if simulated > 0 && propagated == 0 {
            format!("Simulated {}/{} targets", simulated, total)
        } else {
            format!("Propagated {}/{} targets", propagated, total)
        };
        if failed > 0 {
            line.push_str(&format!(", {} failed", failed));
        }
        if skipped > 0 {
            line.push_str(&format!(", {} skipped", skipped));
        }
        line
    }

    pub fn exit_code_enum(&self) -> ExitCode {
        ExitCode::from_i32(self.exit_code).unwrap_or(ExitCode::TargetFailed)
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// One line per target followed by the summary line
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for target in &self.targets {
            out.push_str(&target.to_line());
            out.push('\n');
            for detail in target.detail_lines() {
                out.push_str(&detail);
                out.push('\n');
            }
        }
        out.push_str(&self.human_summary);
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
