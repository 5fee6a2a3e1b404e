//! Core task pipeline, extracted from the CLI.
//!
//! Steps execute strictly sequentially, one command at a time. A failing
//! step aborts the remaining steps of the task (they are recorded as
//! skipped, mirroring sequential shell semantics). Every run produces a
//! receipt whether or not it succeeded.

use crate::ports::{GitPort, OpenPort, ProcessPort, WritePort};
use crate::settings::RunSettings;
use anyhow::Context;
use chrono::Utc;
use sha2::{Digest, Sha256};
use shipkit_render::render_run_md;
use shipkit_tasks::{StepAction, StepSpec, TaskSpec};
use shipkit_types::receipt::{
    RunReceipt, StepCounts, StepRecord, StepStatus, ToolInfo, VerdictStatus,
};
use tracing::{debug, info};

/// Error type for pipeline results.  Exit code 2 = policy block, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("policy block")]
    PolicyBlock,
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::PolicyBlock => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_task`.
pub struct RunOutcome {
    pub receipt: RunReceipt,
    pub policy_block: bool,
}

/// Run one task. Returns the receipt; the caller writes artifacts (via
/// `write_run_artifacts`) and maps `policy_block` to exit code 2.
pub fn run_task(
    settings: &RunSettings,
    spec: &TaskSpec,
    procs: &dyn ProcessPort,
    git: &dyn GitPort,
    opener: &dyn OpenPort,
    fsport: &dyn WritePort,
    tool: ToolInfo,
) -> Result<RunOutcome, ToolError> {
    let mut receipt = RunReceipt::new(tool, spec.task.as_str());
    receipt.run.started_at = Some(Utc::now());
    receipt.run.head_sha = git.head_sha(&settings.repo_root).ok().flatten();
    receipt.run.dirty = git.is_dirty(&settings.repo_root).ok().flatten();

    let mut policy_block = false;

    if spec.gate_clean_tree
        && !settings.dry_run
        && !settings.allow_dirty
        && receipt.run.dirty == Some(true)
    {
        // Gate refusal blocks the whole task; nothing executes.
        for step in &spec.steps {
            receipt.steps.push(StepRecord {
                name: step.name.clone(),
                command: Some(step.rendered()),
                status: StepStatus::Blocked,
                exit_code: None,
                duration_ms: None,
                message: None,
                blocked_reason: Some("dirty working tree".to_string()),
            });
        }
        receipt.verdict.reasons.push("dirty_working_tree".to_string());
        policy_block = true;
    } else if settings.dry_run {
        for step in &spec.steps {
            receipt.steps.push(skipped(step, "dry-run"));
        }
        receipt.verdict.reasons.push("dry_run".to_string());
    } else {
        let mut failed = false;
        for step in &spec.steps {
            if failed {
                receipt.steps.push(skipped(step, "previous step failed"));
                continue;
            }
            if let Some(reason) = &step.skip {
                receipt.steps.push(skipped(step, reason));
                continue;
            }

            let record = match &step.action {
                StepAction::Command { program, args } => {
                    run_command_step(settings, step, program, args, procs)
                }
                StepAction::OpenPath { path } => run_open_step(step, path, opener),
                StepAction::RemoveDir { path } => {
                    // The staging dir is about to disappear; record what it
                    // held first.
                    if let Some(pattern) = &spec.package_glob {
                        match package_digests(pattern) {
                            Ok(Some(data)) => receipt.data = Some(data),
                            Ok(None) => debug!(pattern = %pattern, "no package files matched"),
                            Err(e) => debug!("package digest failed: {e:#}"),
                        }
                    }
                    run_remove_step(step, path, fsport)
                }
            };
            if record.status == StepStatus::Failed {
                failed = true;
            }
            receipt.steps.push(record);
        }
        if failed {
            receipt.verdict.reasons.push("step_failed".to_string());
        }
    }

    receipt.run.ended_at = Some(Utc::now());
    receipt.verdict.counts = count_steps(&receipt.steps);
    receipt.verdict.status = verdict_status(&receipt.verdict.counts);

    Ok(RunOutcome {
        receipt,
        policy_block,
    })
}

/// Write the run artifacts (report.json, run.md) to the output directory.
pub fn write_run_artifacts(
    outcome: &RunOutcome,
    out_dir: &camino::Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(&outcome.receipt).context("serialize receipt")?;
    writer.write_file(&out_dir.join("report.json"), json.as_bytes())?;

    let md = render_run_md(&outcome.receipt);
    writer.write_file(&out_dir.join("run.md"), md.as_bytes())?;

    Ok(())
}

fn skipped(step: &StepSpec, reason: &str) -> StepRecord {
    StepRecord {
        name: step.name.clone(),
        command: Some(step.rendered()),
        status: StepStatus::Skipped,
        exit_code: None,
        duration_ms: None,
        message: Some(reason.to_string()),
        blocked_reason: None,
    }
}

fn run_command_step(
    settings: &RunSettings,
    step: &StepSpec,
    program: &str,
    args: &[String],
    procs: &dyn ProcessPort,
) -> StepRecord {
    info!(step = step.name.as_str(), command = %step.rendered(), "running step");
    let start = std::time::Instant::now();

    let mut record = StepRecord {
        name: step.name.clone(),
        command: Some(step.rendered()),
        status: StepStatus::Ran,
        exit_code: None,
        duration_ms: None,
        message: None,
        blocked_reason: None,
    };

    match procs.run(program, args, &settings.repo_root) {
        Ok(outcome) => {
            record.duration_ms = Some(start.elapsed().as_millis() as u64);
            record.exit_code = outcome.exit_code;
            if !outcome.success {
                record.status = StepStatus::Failed;
                record.message = Some(match outcome.exit_code {
                    Some(code) => format!("exited with code {code}"),
                    None => "terminated by signal".to_string(),
                });
            }
        }
        Err(e) => {
            record.status = StepStatus::Failed;
            record.message = Some(format!("{e:#}"));
        }
    }
    record
}

fn run_open_step(step: &StepSpec, path: &camino::Utf8Path, opener: &dyn OpenPort) -> StepRecord {
    info!(step = step.name.as_str(), path = %path, "opening");
    let mut record = StepRecord {
        name: step.name.clone(),
        command: Some(step.rendered()),
        status: StepStatus::Ran,
        exit_code: None,
        duration_ms: None,
        message: None,
        blocked_reason: None,
    };
    if let Err(e) = opener.open_path(path) {
        record.status = StepStatus::Failed;
        record.message = Some(format!("{e:#}"));
    }
    record
}

fn run_remove_step(step: &StepSpec, path: &camino::Utf8Path, fsport: &dyn WritePort) -> StepRecord {
    info!(step = step.name.as_str(), path = %path, "removing");
    let mut record = StepRecord {
        name: step.name.clone(),
        command: Some(step.rendered()),
        status: StepStatus::Ran,
        exit_code: None,
        duration_ms: None,
        message: None,
        blocked_reason: None,
    };
    if let Err(e) = fsport.remove_dir_all(path) {
        record.status = StepStatus::Failed;
        record.message = Some(format!("{e:#}"));
    }
    record
}

/// Digest the package files matching `pattern` into the receipt payload.
fn package_digests(pattern: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern).context("glob package files")? {
        let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
        let bytes = fs_err::read(&path).with_context(|| format!("read {}", path.display()))?;
        files.push(serde_json::json!({
            "path": path.to_string_lossy(),
            "sha256": sha256_hex(&bytes),
        }));
    }
    if files.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::json!({ "package": { "files": files } })))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn count_steps(steps: &[StepRecord]) -> StepCounts {
    let mut counts = StepCounts::default();
    for s in steps {
        match s.status {
            StepStatus::Ran => counts.ran += 1,
            StepStatus::Failed => counts.failed += 1,
            StepStatus::Skipped => counts.skipped += 1,
            StepStatus::Blocked => counts.blocked += 1,
        }
    }
    counts
}

fn verdict_status(counts: &StepCounts) -> VerdictStatus {
    if counts.failed > 0 {
        VerdictStatus::Fail
    } else if counts.blocked > 0 {
        VerdictStatus::Warn
    } else if counts.ran > 0 {
        VerdictStatus::Pass
    } else {
        // Nothing executed (dry-run, or every step skipped).
        VerdictStatus::Warn
    }
}
