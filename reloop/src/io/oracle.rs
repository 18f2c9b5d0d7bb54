//! Oracle abstraction for text completion requests.
//!
//! The [`Oracle`] trait decouples the refinement steps from the actual
//! text-generation backend. Tests use scripted oracles that return canned
//! responses without spawning processes.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, instrument, warn};

use crate::io::process::run_command_with_timeout;

/// Synchronous text-in/text-out completion boundary.
///
/// One prompt in, one completion out, failures surfaced to the caller. The
/// loop imposes no retry and no timeout of its own; backends decide both.
pub trait Oracle {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Oracle that spawns a configured command for every request, feeding the
/// prompt on stdin and reading the completion from stdout.
pub struct CommandOracle {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandOracle {
    pub fn new(command: Vec<String>, timeout: Duration, output_limit_bytes: usize) -> Result<Self> {
        if command.is_empty() || command[0].trim().is_empty() {
            bail!("oracle command must be non-empty");
        }
        Ok(Self {
            command,
            timeout,
            output_limit_bytes,
        })
    }
}

impl Oracle for CommandOracle {
    #[instrument(skip_all, fields(timeout_secs = self.timeout.as_secs()))]
    fn complete(&self, prompt: &str) -> Result<String> {
        info!(command = %self.command[0], prompt_bytes = prompt.len(), "invoking oracle command");

        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..]);

        let output = run_command_with_timeout(
            cmd,
            Some(prompt.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .context("run oracle command")?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "oracle command timed out");
            return Err(anyhow!(
                "oracle command timed out after {:?}",
                self.timeout
            ));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "oracle command failed");
            return Err(anyhow!(
                "oracle command failed with status {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = text.len(), "oracle responded");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_command() {
        assert!(CommandOracle::new(Vec::new(), Duration::from_secs(1), 1_000).is_err());
        assert!(
            CommandOracle::new(vec![" ".to_string()], Duration::from_secs(1), 1_000).is_err()
        );
    }

    #[cfg(unix)]
    #[test]
    fn echoes_prompt_through_cat() {
        let oracle = CommandOracle::new(
            vec!["cat".to_string()],
            Duration::from_secs(5),
            10_000,
        )
        .expect("oracle");

        let reply = oracle.complete("the prompt").expect("complete");
        assert_eq!(reply, "the prompt");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_a_transport_failure() {
        let oracle = CommandOracle::new(
            vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()],
            Duration::from_secs(5),
            10_000,
        )
        .expect("oracle");

        assert!(oracle.complete("prompt").is_err());
    }
}
