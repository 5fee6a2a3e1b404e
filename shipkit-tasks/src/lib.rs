//! Task catalog: turn a task key + configuration into the ordered step list
//! the runner executes.
//!
//! This crate owns *what* each target runs and in which order. It does not own
//! *how* steps are executed; that's the `shipkit-core` crate.

mod catalog;
mod registry;

pub use catalog::{
    StepAction, StepSpec, TaskOptions, TaskSpec, build_task, doc_index_path, manifest_package_name,
};
pub use registry::{TASK_REGISTRY, TaskExplanation, list_task_keys, lookup_task};
