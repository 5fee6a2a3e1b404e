//! Default system-backed port implementations.

use crate::ports::{GitPort, OpenPort, ProcessOutcome, ProcessPort, WritePort};
use anyhow::Context;
use camino::Utf8Path;
use std::process::Command;
use tracing::debug;

/// Runs external commands from the repo root with inherited stdio, so the
/// invoked tool's output streams straight to the user.
#[derive(Debug, Clone, Default)]
pub struct ShellProcessPort;

impl ProcessPort for ShellProcessPort {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Utf8Path,
    ) -> anyhow::Result<ProcessOutcome> {
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .with_context(|| format!("spawn {program}"))?;
        Ok(ProcessOutcome {
            success: status.success(),
            exit_code: status.code(),
        })
    }
}

/// Git queries via the `git` CLI. Absence of git (or of a repository) is
/// reported as `None`, never as an error.
#[derive(Debug, Clone, Default)]
pub struct ShellGitPort;

impl GitPort for ShellGitPort {
    fn head_sha(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<String>> {
        let output = Command::new("git")
            .args(["rev-parse", "HEAD"])
            .current_dir(repo_root)
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
                Ok((!sha.is_empty()).then_some(sha))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                debug!("git rev-parse unavailable: {e}");
                Ok(None)
            }
        }
    }

    fn is_dirty(&self, repo_root: &Utf8Path) -> anyhow::Result<Option<bool>> {
        let output = Command::new("git")
            .args(["status", "--porcelain"])
            .current_dir(repo_root)
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let dirty = !String::from_utf8_lossy(&out.stdout).trim().is_empty();
                Ok(Some(dirty))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                debug!("git status unavailable: {e}");
                Ok(None)
            }
        }
    }
}

/// Opens a path with the system handler via the `open` crate.
#[derive(Debug, Clone, Default)]
pub struct SystemOpenPort;

impl OpenPort for SystemOpenPort {
    fn open_path(&self, path: &Utf8Path) -> anyhow::Result<()> {
        open::that(path.as_std_path()).with_context(|| format!("open {path}"))
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        std::fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }

    fn remove_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            // Matches `rm -rf`: a missing staging dir is not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove_dir_all {}", path)),
        }
    }
}
