//! Pure, deterministic core logic for the refinement loop.
//!
//! Nothing in this module performs I/O or talks to the oracle. The decide
//! policy, severity scoring, and state bookkeeping are all testable without a
//! live backend.

pub mod critique;
pub mod decide;
pub mod state;
