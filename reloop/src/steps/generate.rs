//! First-pass solution generation.

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::state::RunState;
use crate::io::oracle::Oracle;
use crate::steps::PromptEngine;

/// Produce the initial candidate solution for the task.
///
/// Greedy single pass: the prompt explicitly forbids self-critique so the
/// first version lands fast and the critic has something concrete to attack.
/// Runs exactly once per run, before the cycle begins. No retry; oracle
/// failures propagate to the caller.
#[instrument(skip_all)]
pub fn run<O: Oracle>(oracle: &O, state: &mut RunState) -> Result<()> {
    let prompt = PromptEngine::new().render_generate(state.task())?;
    let response = oracle
        .complete(&prompt)
        .context("generate step oracle request")?;

    let solution = response.trim().to_string();
    debug!(bytes = solution.len(), "generated initial solution");
    state.log_solution(solution);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedOracle;

    #[test]
    fn seeds_the_solution_history() {
        let oracle = ScriptedOracle::new(["  a first answer \n"]);
        let mut state = RunState::new("task", 5).expect("state");

        run(&oracle, &mut state).expect("generate");

        assert_eq!(oracle.calls(), 1);
        assert_eq!(state.current_solution.as_deref(), Some("a first answer"));
        assert_eq!(state.solution_history.len(), 1);
    }

    #[test]
    fn oracle_failure_propagates() {
        let oracle = ScriptedOracle::new(Vec::<String>::new());
        let mut state = RunState::new("task", 5).expect("state");

        assert!(run(&oracle, &mut state).is_err());
        assert!(state.current_solution.is_none());
    }
}
