//! Embeddable task runner, extracted from the CLI.
//!
//! The pipeline is I/O-agnostic: process spawning, git queries, the system
//! opener, and filesystem writes all go through the port traits, so the
//! sequencing semantics can be tested without touching external tools.

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{RunOutcome, ToolError, run_task, write_run_artifacts};
