//! Halting policy for the refinement loop.
//!
//! Pure state inspection; no oracle request is made here. The checks run in a
//! fixed priority order so the step ceiling always wins over quality signals.

use serde::Serialize;
use tracing::debug;

use crate::core::state::RunState;

/// Outcome of one decide invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Halt(HaltReason),
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// The step count reached the configured ceiling.
    CeilingReached,
    /// Severity fell below the threshold; the solution is acceptable.
    Converged,
    /// Refinement stalled: the two latest solutions are textually identical.
    Degenerated,
}

impl HaltReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            HaltReason::CeilingReached => "ceiling_reached",
            HaltReason::Converged => "converged",
            HaltReason::Degenerated => "degenerated",
        }
    }
}

/// Thresholds consulted by [`decide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaltPolicy {
    /// Below this severity the solution is judged acceptable.
    pub severity_threshold: f64,
    /// Minimum severity reduction to justify another step. Configured but not
    /// consulted by the transition rule; the delta is recorded as telemetry
    /// only. Gating continuation on it is an explicit policy change, not a
    /// default.
    pub improvement_threshold: f64,
}

impl Default for HaltPolicy {
    fn default() -> Self {
        Self {
            severity_threshold: 0.15,
            improvement_threshold: 0.05,
        }
    }
}

/// Evaluate the halting policy after a refinement.
///
/// Increments the step count, then checks in order: ceiling, severity,
/// degeneration. Sets the state's halt flag on any halt; the flag is never
/// cleared. The improvement delta is computed and stored on every invocation
/// but does not gate the transition.
pub fn decide(state: &mut RunState, policy: &HaltPolicy) -> Decision {
    state.increment_step();

    let delta = improvement_delta(state);
    state.improvement_delta = Some(delta);
    debug!(
        step = state.step_count(),
        severity = ?state.error_severity,
        improvement_delta = delta,
        "decide step"
    );

    if state.step_count() >= state.max_steps() {
        state.mark_halted();
        return Decision::Halt(HaltReason::CeilingReached);
    }

    if let Some(severity) = state.error_severity
        && severity < policy.severity_threshold
    {
        state.mark_halted();
        return Decision::Halt(HaltReason::Converged);
    }

    if is_degenerate(state) {
        state.mark_halted();
        return Decision::Halt(HaltReason::Degenerated);
    }

    Decision::Continue
}

/// Severity reduction between the two most recent critiques, clamped at zero.
/// Assumes full improvement (1.0) before two critiques exist.
pub fn improvement_delta(state: &RunState) -> f64 {
    let records = &state.critique_history;
    if records.len() < 2 {
        return 1.0;
    }
    let prev = records[records.len() - 2].severity;
    let curr = records[records.len() - 1].severity;
    (prev - curr).max(0.0)
}

/// Degeneration heuristic: at least three solution versions exist and the two
/// most recent are identical after surface whitespace trimming.
fn is_degenerate(state: &RunState) -> bool {
    let history = &state.solution_history;
    if history.len() < 3 {
        return false;
    }
    history[history.len() - 1].trim() == history[history.len() - 2].trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::critique::Critique;

    fn state_with(max_steps: u32) -> RunState {
        RunState::new("task", max_steps).expect("state")
    }

    fn critique_with_severity(state: &mut RunState, severity: f64) {
        let critique = Critique {
            critical_errors: Vec::new(),
            minor_issues: Vec::new(),
            missing_steps: Vec::new(),
            confidence: 0.5,
        };
        state.log_critique(critique, severity);
    }

    #[test]
    fn ceiling_wins_over_everything() {
        let mut state = state_with(1);
        state.log_solution("a".to_string());
        state.log_solution("b".to_string());
        // High severity and distinct solutions: only the ceiling can halt.
        critique_with_severity(&mut state, 0.9);

        let decision = decide(&mut state, &HaltPolicy::default());
        assert_eq!(decision, Decision::Halt(HaltReason::CeilingReached));
        assert!(state.is_halted());
        assert_eq!(state.step_count(), 1);
    }

    #[test]
    fn low_severity_halts_below_ceiling() {
        let mut state = state_with(5);
        state.log_solution("a".to_string());
        critique_with_severity(&mut state, 0.10);

        let decision = decide(&mut state, &HaltPolicy::default());
        assert_eq!(decision, Decision::Halt(HaltReason::Converged));
    }

    #[test]
    fn severity_at_threshold_does_not_halt() {
        let mut state = state_with(5);
        state.log_solution("a".to_string());
        critique_with_severity(&mut state, 0.15);

        assert_eq!(decide(&mut state, &HaltPolicy::default()), Decision::Continue);
        assert!(!state.is_halted());
    }

    #[test]
    fn identical_recent_solutions_halt_as_degenerate() {
        let mut state = state_with(10);
        state.log_solution("X".to_string());
        state.log_solution("X ".to_string());
        state.log_solution("X".to_string());
        critique_with_severity(&mut state, 0.9);

        let decision = decide(&mut state, &HaltPolicy::default());
        assert_eq!(decision, Decision::Halt(HaltReason::Degenerated));
    }

    #[test]
    fn two_versions_are_not_enough_for_degeneration() {
        let mut state = state_with(10);
        state.log_solution("X".to_string());
        state.log_solution("X".to_string());
        critique_with_severity(&mut state, 0.9);

        assert_eq!(decide(&mut state, &HaltPolicy::default()), Decision::Continue);
    }

    #[test]
    fn missing_severity_skips_the_severity_check() {
        let mut state = state_with(10);
        state.log_solution("a".to_string());

        assert_eq!(decide(&mut state, &HaltPolicy::default()), Decision::Continue);
    }

    #[test]
    fn step_count_never_exceeds_ceiling() {
        let mut state = state_with(3);
        state.log_solution("a".to_string());
        critique_with_severity(&mut state, 0.9);

        let mut halted = false;
        for _ in 0..3 {
            if let Decision::Halt(_) = decide(&mut state, &HaltPolicy::default()) {
                halted = true;
                break;
            }
            // Keep the history moving so degeneration never triggers.
            let next = format!("v{}", state.step_count());
            state.log_solution(next);
            critique_with_severity(&mut state, 0.9);
        }
        assert!(halted);
        assert!(state.step_count() <= state.max_steps());
    }

    #[test]
    fn improvement_delta_assumes_improvement_at_first() {
        let mut state = state_with(5);
        critique_with_severity(&mut state, 0.4);
        assert_eq!(improvement_delta(&state), 1.0);
    }

    #[test]
    fn improvement_delta_uses_last_two_records() {
        let mut state = state_with(5);
        critique_with_severity(&mut state, 0.6);
        critique_with_severity(&mut state, 0.4);
        assert!((improvement_delta(&state) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn improvement_delta_clamps_regressions_to_zero() {
        let mut state = state_with(5);
        critique_with_severity(&mut state, 0.3);
        critique_with_severity(&mut state, 0.8);
        assert_eq!(improvement_delta(&state), 0.0);
    }

    #[test]
    fn decide_records_delta_without_gating_on_it() {
        let mut state = state_with(10);
        state.log_solution("a".to_string());
        critique_with_severity(&mut state, 0.9);
        critique_with_severity(&mut state, 0.9);

        // Zero improvement, but the rule does not consult the threshold.
        let decision = decide(&mut state, &HaltPolicy::default());
        assert_eq!(decision, Decision::Continue);
        assert_eq!(state.improvement_delta, Some(0.0));
    }
}
