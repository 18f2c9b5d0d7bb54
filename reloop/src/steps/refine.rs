//! Constrained refinement of the current solution.

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument};

use crate::core::state::RunState;
use crate::io::oracle::Oracle;
use crate::steps::PromptEngine;

/// Produce a new solution version addressing only the issues the latest
/// critique named.
///
/// The prompt demands the smallest edit that resolves the named issues and
/// solution text only in return. Calling this without a solution or without a
/// critique is a driver wiring bug and fails loudly.
#[instrument(skip_all)]
pub fn run<O: Oracle>(oracle: &O, state: &mut RunState) -> Result<()> {
    let solution = state
        .current_solution
        .clone()
        .ok_or_else(|| anyhow!("refine step called with no solution to refine"))?;
    let critique = state
        .current_critique
        .clone()
        .ok_or_else(|| anyhow!("refine step called with no critique available"))?;

    let critique_json =
        serde_json::to_string_pretty(&critique).context("serialize critique for prompt")?;
    let prompt = PromptEngine::new().render_refine(state.task(), &solution, &critique_json)?;
    let response = oracle
        .complete(&prompt)
        .context("refine step oracle request")?;

    let refined = response.trim().to_string();
    debug!(bytes = refined.len(), "recorded refined solution");
    state.log_solution(refined);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::critique::Critique;
    use crate::test_support::ScriptedOracle;

    fn critique() -> Critique {
        Critique {
            critical_errors: vec!["missing base case".to_string()],
            minor_issues: Vec::new(),
            missing_steps: Vec::new(),
            confidence: 0.8,
        }
    }

    #[test]
    fn appends_the_refined_solution() {
        let oracle = ScriptedOracle::new(["  revised answer \n"]);
        let mut state = RunState::new("task", 5).expect("state");
        state.log_solution("first".to_string());
        state.log_critique(critique(), 0.2);

        run(&oracle, &mut state).expect("refine");

        assert_eq!(state.current_solution.as_deref(), Some("revised answer"));
        assert_eq!(state.solution_history, vec!["first", "revised answer"]);
    }

    #[test]
    fn missing_solution_is_a_precondition_violation() {
        let oracle = ScriptedOracle::new(["unused"]);
        let mut state = RunState::new("task", 5).expect("state");

        let err = run(&oracle, &mut state).expect_err("must fail");
        assert!(err.to_string().contains("no solution"));
    }

    #[test]
    fn missing_critique_is_a_precondition_violation() {
        let oracle = ScriptedOracle::new(["unused"]);
        let mut state = RunState::new("task", 5).expect("state");
        state.log_solution("first".to_string());

        let err = run(&oracle, &mut state).expect_err("must fail");
        assert!(err.to_string().contains("no critique"));
        assert_eq!(oracle.calls(), 0);
    }
}
