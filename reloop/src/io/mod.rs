//! Side-effecting operations: configuration, process spawning, the oracle
//! backend, and transcript output. Isolated from [`crate::core`] so the loop
//! logic stays testable without touching the filesystem or child processes.

pub mod config;
pub mod oracle;
pub mod process;
pub mod transcript;
