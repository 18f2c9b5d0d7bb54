//! Driver for the generate → critique → refine → decide cycle.

use anyhow::{Context, Result};
use tracing::info;

use crate::core::decide::{Decision, HaltPolicy, HaltReason, decide};
use crate::core::state::RunState;
use crate::io::oracle::Oracle;
use crate::steps::{critic, generate, refine};

/// Telemetry emitted after each decide invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Step count after the decide increment (1-indexed).
    pub step: u32,
    /// Severity recorded by the cycle's critique.
    pub severity: Option<f64>,
    /// Improvement delta recorded by the decide step.
    pub improvement_delta: Option<f64>,
    pub decision: Decision,
}

/// Final state of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub state: RunState,
    pub halt: HaltReason,
}

impl RunOutcome {
    /// The last solution version produced.
    pub fn final_solution(&self) -> &str {
        self.state.current_solution.as_deref().unwrap_or_default()
    }
}

/// Run the full refinement loop for one task until the decide step halts it.
///
/// Generate executes exactly once to seed the state; critique, refine, and
/// decide then cycle. The driver holds no halting logic of its own — it routes
/// on the flag the decide step set, and the ceiling check inside decide
/// guarantees termination. Oracle transport failures abort the run and
/// propagate unmodified.
pub fn run_loop<O: Oracle, F: FnMut(&CycleOutcome)>(
    oracle: &O,
    task: &str,
    max_steps: u32,
    policy: &HaltPolicy,
    mut on_cycle: F,
) -> Result<RunOutcome> {
    let mut state = RunState::new(task, max_steps)?;
    info!(max_steps, "starting refinement run");

    generate::run(oracle, &mut state).context("generate step")?;

    loop {
        critic::run(oracle, &mut state).context("critic step")?;
        refine::run(oracle, &mut state).context("refine step")?;
        let decision = decide(&mut state, policy);

        on_cycle(&CycleOutcome {
            step: state.step_count(),
            severity: state.error_severity,
            improvement_delta: state.improvement_delta,
            decision,
        });

        // decide sets the halt flag and the reason together; the driver only
        // routes on them.
        if let Decision::Halt(reason) = decision {
            debug_assert!(state.is_halted());
            info!(
                steps = state.step_count(),
                versions = state.solution_history.len(),
                reason = reason.as_str(),
                "run halted"
            );
            return Ok(RunOutcome {
                state,
                halt: reason,
            });
        }
    }
}
