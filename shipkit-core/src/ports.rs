//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;

/// Result of one external command.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOutcome {
    pub success: bool,
    /// Absent when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// External command execution.
pub trait ProcessPort {
    fn run(&self, program: &str, args: &[String], cwd: &Utf8Path)
    -> anyhow::Result<ProcessOutcome>;
}

/// Git queries (HEAD SHA, dirty status).
pub trait GitPort {
    fn head_sha(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<String>>;
    fn is_dirty(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<bool>>;
}

/// Opening a path with the system handler (browser for HTML).
pub trait OpenPort {
    fn open_path(&self, path: &Utf8Path) -> anyhow::Result<()>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
    fn remove_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
