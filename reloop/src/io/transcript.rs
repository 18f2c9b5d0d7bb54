//! Run transcript artifacts written once after a completed run.
//!
//! The loop itself persists nothing; callers that want an audit trail of a
//! finished run hand its state here.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::decide::HaltReason;
use crate::core::state::RunState;

#[derive(Debug, Serialize)]
struct RunMeta<'a> {
    task: &'a str,
    step_count: u32,
    max_steps: u32,
    error_severity: Option<f64>,
    improvement_delta: Option<f64>,
    halt_reason: HaltReason,
}

/// Write `meta.json`, one `solution_NNN.md` per solution version, and one
/// `critique_NNN.json` per critique record into `dir`.
pub fn write_transcript(dir: &Path, state: &RunState, halt: HaltReason) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create transcript dir {}", dir.display()))?;

    let meta = RunMeta {
        task: state.task(),
        step_count: state.step_count(),
        max_steps: state.max_steps(),
        error_severity: state.error_severity,
        improvement_delta: state.improvement_delta,
        halt_reason: halt,
    };
    write_json(&dir.join("meta.json"), &meta)?;

    for (i, solution) in state.solution_history.iter().enumerate() {
        let path = dir.join(format!("solution_{:03}.md", i));
        let mut contents = solution.clone();
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    }

    for (i, record) in state.critique_history.iter().enumerate() {
        write_json(&dir.join(format!("critique_{:03}.json", i)), record)?;
    }

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(value).context("serialize json")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::critique::Critique;

    #[test]
    fn writes_meta_solutions_and_critiques() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("run");

        let mut state = RunState::new("Explain recursion.", 5).expect("state");
        state.log_solution("first".to_string());
        state.log_critique(Critique::malformed_fallback(), 0.2);
        state.log_solution("second".to_string());
        state.increment_step();
        state.mark_halted();

        write_transcript(&dir, &state, HaltReason::Converged).expect("transcript");

        let meta = fs::read_to_string(dir.join("meta.json")).expect("meta");
        assert!(meta.contains("\"halt_reason\": \"converged\""));
        assert!(meta.contains("\"step_count\": 1"));

        assert_eq!(
            fs::read_to_string(dir.join("solution_000.md")).expect("solution"),
            "first\n"
        );
        assert_eq!(
            fs::read_to_string(dir.join("solution_001.md")).expect("solution"),
            "second\n"
        );

        let critique = fs::read_to_string(dir.join("critique_000.json")).expect("critique");
        assert!(critique.contains("malformed critique output"));
    }
}
