//! Clap-free settings for the task runner.

use camino::Utf8PathBuf;

/// Settings for a single task run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub repo_root: Utf8PathBuf,
    pub artifacts_dir: Utf8PathBuf,

    /// Record the run without executing any step.
    pub dry_run: bool,

    /// Lift the clean-working-tree gate on gated tasks.
    pub allow_dirty: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            artifacts_dir: Utf8PathBuf::from("artifacts"),
            dry_run: false,
            allow_dirty: false,
        }
    }
}
