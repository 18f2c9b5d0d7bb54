//! Shared run state threaded through every step of one task's refinement.

use anyhow::{Result, bail};

use crate::core::critique::{Critique, CritiqueRecord};

/// Mutable record for a single task run, owned by the loop driver.
///
/// Steps mutate this in place through the logging methods below. The fields
/// that carry invariants (`task`, `step_count`, `max_steps`, `halt`) are kept
/// private so they can only move in the allowed direction: the task never
/// changes, the step count only increments, and the halt flag never resets.
#[derive(Debug, Clone)]
pub struct RunState {
    task: String,
    /// Latest candidate solution; `None` only before the generate step.
    pub current_solution: Option<String>,
    /// Every solution version produced, in production order. Never truncated.
    pub solution_history: Vec<String>,
    /// Most recent structured diagnosis.
    pub current_critique: Option<Critique>,
    /// Every critique produced, paired with the severity computed for it.
    pub critique_history: Vec<CritiqueRecord>,
    step_count: u32,
    max_steps: u32,
    /// Latest normalized severity in [0, 1]; `None` before the first critique.
    pub error_severity: Option<f64>,
    /// Severity reduction estimated by the latest decide step. Telemetry only.
    pub improvement_delta: Option<f64>,
    halt: bool,
}

impl RunState {
    /// Create state for one run. The task must be non-empty and the step
    /// ceiling positive.
    pub fn new(task: &str, max_steps: u32) -> Result<Self> {
        if task.trim().is_empty() {
            bail!("task must be non-empty");
        }
        if max_steps == 0 {
            bail!("max_steps must be > 0");
        }
        Ok(Self {
            task: task.to_string(),
            current_solution: None,
            solution_history: Vec::new(),
            current_critique: None,
            critique_history: Vec::new(),
            step_count: 0,
            max_steps,
            error_severity: None,
            improvement_delta: None,
            halt: false,
        })
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Record a new solution version and make it current.
    pub fn log_solution(&mut self, solution: String) {
        self.current_solution = Some(solution.clone());
        self.solution_history.push(solution);
    }

    /// Record a critique and the severity derived from it.
    pub fn log_critique(&mut self, critique: Critique, severity: f64) {
        self.current_critique = Some(critique.clone());
        self.critique_history.push(CritiqueRecord { critique, severity });
        self.error_severity = Some(severity);
    }

    /// Advance the step counter. Called exactly once per decide invocation.
    pub fn increment_step(&mut self) {
        self.step_count += 1;
    }

    /// Set the halt flag. There is no way to clear it within a run.
    pub fn mark_halted(&mut self) {
        self.halt = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halt
    }
}
