//! Test-only oracle doubles.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::io::oracle::Oracle;

/// Oracle that returns canned responses in order and counts calls.
///
/// Exhausting the script is an error, which doubles as a guard against loops
/// that make more oracle requests than a test expects.
pub struct ScriptedOracle {
    responses: RefCell<VecDeque<String>>,
    calls: Cell<u32>,
}

impl ScriptedOracle {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: RefCell::new(responses.into_iter().map(Into::into).collect()),
            calls: Cell::new(0),
        }
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl Oracle for ScriptedOracle {
    fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted oracle exhausted after {} calls", self.calls.get()))
    }
}

/// Oracle whose every request is a transport failure.
pub struct FailingOracle;

impl Oracle for FailingOracle {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("oracle transport failure"))
    }
}
