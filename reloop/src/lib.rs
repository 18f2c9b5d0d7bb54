//! Recursive self-refinement loop runner.
//!
//! This crate implements a control loop that repeatedly asks a text-generation
//! oracle to produce, critique, and revise a candidate solution to a task,
//! halting on quality and degeneration heuristics rather than a fixed step
//! count. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (state, severity scoring, the
//!   halting policy). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, process spawning, the
//!   oracle backend, transcripts). Isolated to enable mocking in tests.
//! - **[`steps`]**: The oracle-facing generate/critic/refine steps.
//! - **[`looping`]**: The driver wiring generate → (critique → refine →
//!   decide)* into a terminating run.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod steps;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
