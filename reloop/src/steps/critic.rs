//! Adversarial evaluation of the current solution.

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::critique::parse_critique;
use crate::core::state::RunState;
use crate::io::oracle::Oracle;
use crate::steps::PromptEngine;

/// Critique the current solution and record the derived severity.
///
/// The prompt casts the oracle as an evaluator that diagnoses but never
/// proposes fixes. Unparsable replies are absorbed into the fallback critique;
/// calling this with no solution is a driver wiring bug and fails loudly.
#[instrument(skip_all)]
pub fn run<O: Oracle>(oracle: &O, state: &mut RunState) -> Result<()> {
    let solution = state
        .current_solution
        .clone()
        .ok_or_else(|| anyhow!("critic step called with no solution to evaluate"))?;

    let prompt = PromptEngine::new().render_critic(state.task(), &solution)?;
    let response = oracle
        .complete(&prompt)
        .context("critic step oracle request")?;

    let critique = parse_critique(&response);
    let severity = critique.severity();
    debug!(
        severity,
        critical = critique.critical_errors.len(),
        missing = critique.missing_steps.len(),
        minor = critique.minor_issues.len(),
        "critique recorded"
    );
    state.log_critique(critique, severity);
    Ok(())
}
