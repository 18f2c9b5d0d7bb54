//! Stable exit codes for runner CLI commands.

/// Run converged: severity fell below the threshold.
pub const OK: i32 = 0;
/// Invalid config/arguments, a precondition violation, or an oracle transport
/// failure.
pub const INVALID: i32 = 1;
/// Run hit the step ceiling with severity still above the threshold.
pub const CEILING: i32 = 2;
/// Run stalled: successive refinements produced identical solutions.
pub const STALLED: i32 = 3;
