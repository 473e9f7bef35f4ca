//! Source/target selection
//!
//! Instances are chosen either by exact name or interactively from a
//! numbered list.
//!
//! Name resolution is strict: a name must match exactly one instance.
//! Ambiguous names are rejected instead of guessed.

use std::io::{BufRead, Write};

use holiday_model::InstanceSummary;

use crate::error::PropagationError;

/// Resolve an exact instance name to its summary
pub fn resolve_by_name<'a>(
    summaries: &'a [InstanceSummary],
    name: &str,
) -> Result<&'a InstanceSummary, PropagationError> {
    let matches: Vec<_> = summaries.iter().filter(|s| s.name == name).collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        _ => Err(PropagationError::InstanceNotFound {
            name: name.to_string(),
            matches: matches.len(),
        }),
    }
}

/// Resolve several names, failing on the first that does not resolve
pub fn resolve_all<'a>(
    summaries: &'a [InstanceSummary],
    names: &[String],
) -> Result<Vec<&'a InstanceSummary>, PropagationError> {
    names.iter().map(|n| resolve_by_name(summaries, n)).collect()
}

/// Interactive choice among instance summaries
pub trait Picker {
    fn pick_one(&mut self, prompt: &str, candidates: &[InstanceSummary]) -> Result<String, PropagationError>;

    fn pick_many(
        &mut self,
        prompt: &str,
        candidates: &[InstanceSummary],
    ) -> Result<Vec<String>, PropagationError>;
}

/// Numbered-list picker over any reader/writer pair
///
/// `pick_many` accepts comma-separated numbers (`1,3`) or `all`.
pub struct PromptPicker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str, candidates: &[InstanceSummary]) -> Result<String, PropagationError> {
        if candidates.is_empty() {
            return Err(PropagationError::Selection("no instances to choose from".to_string()));
        }

        let io_err = |e: std::io::Error| PropagationError::Selection(e.to_string());
        writeln!(self.output, "{}", prompt).map_err(io_err)?;
        for (i, c) in candidates.iter().enumerate() {
            writeln!(self.output, "  {:>3}) {} [{}]", i + 1, c.name, c.id).map_err(io_err)?;
        }
        write!(self.output, "> ").map_err(io_err)?;
        self.output.flush().map_err(io_err)?;

        let mut line = String::new();
        if self.input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(PropagationError::Selection("no selection made".to_string()));
        }
        Ok(line.trim().to_string())
    }
}

/// Ask for a source, then for targets among the remaining instances
///
/// Returns the source id and the chosen target ids.
pub fn pick_source_and_targets<P: Picker>(
    picker: &mut P,
    summaries: &[InstanceSummary],
) -> Result<(String, Vec<String>), PropagationError> {
    let source = picker.pick_one("Select the source instance:", summaries)?;
    let candidates: Vec<_> = summaries.iter().filter(|s| s.id != source).cloned().collect();
    let targets = picker.pick_many("Select target instances (e.g. 1,3 or all):", &candidates)?;
    Ok((source, targets))
}

fn parse_choice(token: &str, count: usize) -> Result<usize, PropagationError> {
    match token.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(PropagationError::Selection(format!(
            "'{}' is not a number between 1 and {}",
            token.trim(),
            count
        ))),
    }
}

impl<R: BufRead, W: Write> Picker for PromptPicker<R, W> {
    fn pick_one(&mut self, prompt: &str, candidates: &[InstanceSummary]) -> Result<String, PropagationError> {
        let answer = self.ask(prompt, candidates)?;
        let index = parse_choice(&answer, candidates.len())?;
        Ok(candidates[index].id.clone())
    }

    fn pick_many(
        &mut self,
        prompt: &str,
        candidates: &[InstanceSummary],
    ) -> Result<Vec<String>, PropagationError> {
        let answer = self.ask(prompt, candidates)?;
        if answer.eq_ignore_ascii_case("all") {
            return Ok(candidates.iter().map(|c| c.id.clone()).collect());
        }

        let mut picked: Vec<String> = Vec::new();
        for token in answer.split(',').filter(|t| !t.trim().is_empty()) {
            let id = &candidates[parse_choice(token, candidates.len())?].id;
            if !picked.contains(id) {
                picked.push(id.clone());
            }
        }
        if picked.is_empty() {
            return Err(PropagationError::Selection("no targets selected".to_string()));
        }
        Ok(picked)
    }
}
