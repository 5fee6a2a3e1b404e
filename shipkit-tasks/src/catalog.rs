//! Step lists for the three convenience targets.
//!
//! Each task is an ordered list of steps: external commands plus the two
//! built-in actions (open a path, remove a staging directory). Defaults can
//! be replaced wholesale from configuration; the catalog never merges a
//! partial command line.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use shipkit_types::task::TaskId;
use tracing::debug;

/// What a single step does when executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// External command, run from the repo root with inherited stdio.
    Command { program: String, args: Vec<String> },

    /// Open a path with the system handler (the browser, for built docs).
    OpenPath { path: Utf8PathBuf },

    /// Remove a staging directory. A missing directory is not an error.
    RemoveDir { path: Utf8PathBuf },
}

/// One step of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSpec {
    pub name: String,
    pub action: StepAction,

    /// When set, the runner records the step as skipped with this reason
    /// instead of executing it (e.g. `docs.open = false`).
    pub skip: Option<String>,
}

impl StepSpec {
    fn command(name: &str, program: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            action: StepAction::Command {
                program: program.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
            },
            skip: None,
        }
    }

    /// Human-readable form of the step, used in receipts and logs.
    pub fn rendered(&self) -> String {
        match &self.action {
            StepAction::Command { program, args } => {
                let mut line = program.clone();
                for arg in args {
                    line.push(' ');
                    line.push_str(arg);
                }
                line
            }
            StepAction::OpenPath { path } => format!("open {}", path),
            StepAction::RemoveDir { path } => format!("remove {}", path),
        }
    }
}

/// A fully resolved task: what the runner executes.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub task: TaskId,
    pub steps: Vec<StepSpec>,

    /// Refuse to run when the git working tree has uncommitted changes.
    pub gate_clean_tree: bool,

    /// Glob for package files whose digest is recorded in the receipt
    /// before the staging directory is removed.
    pub package_glob: Option<String>,
}

/// Configuration-level overrides, already merged from file and CLI.
#[derive(Debug, Clone)]
pub struct TaskOptions {
    pub cov_command: Option<Vec<String>>,
    pub docs_command: Option<Vec<String>>,
    pub docs_index: Option<Utf8PathBuf>,
    pub open_docs: bool,
    pub package_command: Option<Vec<String>>,
    pub publish_command: Option<Vec<String>>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            cov_command: None,
            docs_command: None,
            docs_index: None,
            open_docs: true,
            package_command: None,
            publish_command: None,
        }
    }
}

/// Build the step list for `task`.
pub fn build_task(
    task: TaskId,
    repo_root: &Utf8Path,
    artifacts_dir: &Utf8Path,
    opts: &TaskOptions,
) -> anyhow::Result<TaskSpec> {
    match task {
        TaskId::Cov => cov_task(artifacts_dir, opts),
        TaskId::Docs => docs_task(repo_root, opts),
        TaskId::Publish => publish_task(repo_root, opts),
    }
}

fn cov_task(artifacts_dir: &Utf8Path, opts: &TaskOptions) -> anyhow::Result<TaskSpec> {
    let step = match &opts.cov_command {
        Some(words) => override_step("cov", words)?,
        None => StepSpec::command(
            "cov",
            "cargo",
            &[
                "tarpaulin",
                "--out",
                "html",
                "--output-dir",
                artifacts_dir.join("cov").as_str(),
            ],
        ),
    };

    Ok(TaskSpec {
        task: TaskId::Cov,
        steps: vec![step],
        gate_clean_tree: false,
        package_glob: None,
    })
}

fn docs_task(repo_root: &Utf8Path, opts: &TaskOptions) -> anyhow::Result<TaskSpec> {
    let build = match &opts.docs_command {
        Some(words) => override_step("doc", words)?,
        None => StepSpec::command("doc", "cargo", &["doc", "--no-deps"]),
    };

    let index = match &opts.docs_index {
        Some(path) => repo_root.join(path),
        None => doc_index_path(repo_root)?,
    };
    let mut open = StepSpec {
        name: "open".to_string(),
        action: StepAction::OpenPath { path: index },
        skip: None,
    };
    if !opts.open_docs {
        open.skip = Some("open disabled".to_string());
    }

    Ok(TaskSpec {
        task: TaskId::Docs,
        steps: vec![build, open],
        gate_clean_tree: false,
        package_glob: None,
    })
}

fn publish_task(repo_root: &Utf8Path, opts: &TaskOptions) -> anyhow::Result<TaskSpec> {
    let package = match &opts.package_command {
        Some(words) => override_step("package", words)?,
        None => StepSpec::command("package", "cargo", &["package"]),
    };
    let publish = match &opts.publish_command {
        Some(words) => override_step("publish", words)?,
        None => StepSpec::command("publish", "cargo", &["publish"]),
    };

    let staging = repo_root.join("target").join("package");
    let clean = StepSpec {
        name: "clean".to_string(),
        action: StepAction::RemoveDir {
            path: staging.clone(),
        },
        skip: None,
    };

    Ok(TaskSpec {
        task: TaskId::Publish,
        steps: vec![package, publish, clean],
        gate_clean_tree: true,
        package_glob: Some(staging.join("*.crate").to_string()),
    })
}

fn override_step(name: &str, words: &[String]) -> anyhow::Result<StepSpec> {
    let (program, args) = words
        .split_first()
        .with_context(|| format!("command override for step '{name}' is empty"))?;
    Ok(StepSpec {
        name: name.to_string(),
        action: StepAction::Command {
            program: program.clone(),
            args: args.to_vec(),
        },
        skip: None,
    })
}

/// Path of the rustdoc index for the root package.
///
/// `cargo doc` writes no top-level index.html, so the index lives under the
/// package's directory (hyphens become underscores). A virtual workspace has
/// no root package; fall back to the doc directory itself.
pub fn doc_index_path(repo_root: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    let doc_dir = repo_root.join("target").join("doc");
    match manifest_package_name(repo_root)? {
        Some(name) => Ok(doc_dir.join(name.replace('-', "_")).join("index.html")),
        None => {
            debug!("no root package in manifest, opening doc dir");
            Ok(doc_dir)
        }
    }
}

/// Read `[package].name` from the root manifest, if present.
pub fn manifest_package_name(repo_root: &Utf8Path) -> anyhow::Result<Option<String>> {
    #[derive(Deserialize)]
    struct RootManifest {
        package: Option<PackageSection>,
    }

    #[derive(Deserialize)]
    struct PackageSection {
        name: Option<String>,
    }

    let manifest_path = repo_root.join("Cargo.toml");
    let contents = fs::read_to_string(&manifest_path)
        .with_context(|| format!("read manifest {}", manifest_path))?;
    let manifest: RootManifest = toml::from_str(&contents)
        .with_context(|| format!("parse manifest {}", manifest_path))?;
    Ok(manifest.package.and_then(|p| p.name))
}
