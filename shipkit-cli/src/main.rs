mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use shipkit_core::adapters::{FsWritePort, ShellGitPort, ShellProcessPort, SystemOpenPort};
use shipkit_core::{ToolError, run_task, write_run_artifacts};
use shipkit_core::settings::RunSettings;
use shipkit_tasks::{TASK_REGISTRY, build_task, list_task_keys, lookup_task};
use shipkit_types::receipt::{ToolInfo, VerdictStatus};
use shipkit_types::task::TaskId;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "shipkit",
    version,
    about = "Receipt-recorded convenience targets (cov, docs, publish) for Cargo projects."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the test suite under the coverage runner.
    Cov(TaskArgs),
    /// Build the API docs and open them in the browser.
    Docs(DocsArgs),
    /// Package the crate, upload it, and clean the staging directory.
    Publish(PublishArgs),
    /// Summarize recorded runs from the artifacts directory.
    Runs(RunsArgs),
    /// Explain what a task does, step by step.
    Explain(ExplainArgs),
    /// List all tasks.
    ListTasks(ListTasksArgs),
}

#[derive(Debug, Parser)]
struct TaskArgs {
    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Artifacts directory (default: <repo_root>/artifacts).
    #[arg(long)]
    artifacts_dir: Option<Utf8PathBuf>,

    /// Record the run without executing any step.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Parser)]
struct DocsArgs {
    #[command(flatten)]
    task: TaskArgs,

    /// Skip opening the built docs in the browser.
    #[arg(long, default_value_t = false)]
    no_open: bool,
}

#[derive(Debug, Parser)]
struct PublishArgs {
    #[command(flatten)]
    task: TaskArgs,

    /// Allow publishing when the git working tree has uncommitted changes.
    #[arg(long, default_value_t = false)]
    allow_dirty: bool,
}

#[derive(Debug, Parser)]
struct RunsArgs {
    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Artifacts directory (default: <repo_root>/artifacts).
    #[arg(long)]
    artifacts_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Task key to explain (e.g., "cov", "publish").
    task_key: String,
}

#[derive(Debug, Parser)]
struct ListTasksArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Cov(args) => cmd_task(TaskId::Cov, args, false, false),
        Command::Docs(args) => cmd_task(TaskId::Docs, args.task, args.no_open, false),
        Command::Publish(args) => cmd_task(TaskId::Publish, args.task, false, args.allow_dirty),
        Command::Runs(args) => cmd_runs(args),
        Command::Explain(args) => cmd_explain(args),
        Command::ListTasks(args) => cmd_list_tasks(args),
    }
}

fn cmd_task(
    task: TaskId,
    args: TaskArgs,
    no_open: bool,
    allow_dirty: bool,
) -> anyhow::Result<ExitCode> {
    let repo_root = args.repo_root;

    // Load config file and merge with CLI arguments
    let file_config = config::load_or_default(&repo_root).context("load shipkit.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_task_args(no_open, allow_dirty);

    let artifacts_dir = args
        .artifacts_dir
        .unwrap_or_else(|| repo_root.join(&merged.artifacts_dir));

    debug!(
        "merged config: artifacts_dir={}, open_docs={}, allow_dirty={}",
        artifacts_dir, merged.options.open_docs, merged.allow_dirty
    );

    let spec = build_task(task, &repo_root, &artifacts_dir, &merged.options)
        .with_context(|| format!("build task '{task}'"))?;

    let settings = RunSettings {
        repo_root: repo_root.clone(),
        artifacts_dir: artifacts_dir.clone(),
        dry_run: args.dry_run,
        allow_dirty: merged.allow_dirty,
    };

    let writer = FsWritePort;
    let outcome = run_task(
        &settings,
        &spec,
        &ShellProcessPort,
        &ShellGitPort,
        &SystemOpenPort,
        &writer,
        tool_info(),
    )?;

    let out_dir = artifacts_dir.join(task.as_str());
    write_run_artifacts(&outcome, &out_dir, &writer)?;
    info!("wrote run artifacts to {}", out_dir);

    if outcome.policy_block {
        error!(
            "publish blocked: git working tree has uncommitted changes; \
             commit or stash changes first, or use --allow-dirty to override"
        );
        return Ok(ExitCode::from(ToolError::PolicyBlock.exit_code()));
    }
    if outcome.receipt.verdict.status == VerdictStatus::Fail {
        anyhow::bail!("task '{}' failed; see {}", task, out_dir.join("report.json"));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_runs(args: RunsArgs) -> anyhow::Result<ExitCode> {
    let repo_root = args.repo_root;
    let file_config = config::load_or_default(&repo_root).context("load shipkit.toml config")?;
    let merged = ConfigMerger::new(file_config).merge_task_args(false, false);
    let artifacts_dir = args
        .artifacts_dir
        .unwrap_or_else(|| repo_root.join(&merged.artifacts_dir));

    let receipts = shipkit_receipts::load_receipts(&artifacts_dir)
        .with_context(|| format!("load receipts from {}", artifacts_dir))?;

    if receipts.is_empty() {
        println!("No runs recorded under {}.", artifacts_dir);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Recorded runs:\n");
    println!("  {:<10} {:<8} {:<26} RUN", "TASK", "VERDICT", "STARTED");
    for loaded in &receipts {
        match &loaded.receipt {
            Ok(receipt) => {
                let started = receipt
                    .run
                    .started_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:<10} {:<8} {:<26} {}",
                    receipt.task,
                    verdict_label(receipt.verdict.status),
                    started,
                    receipt.run_id
                );
            }
            Err(e) => {
                println!("  {:<10} failed to load {}: {}", loaded.task_id, loaded.path, e);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<ExitCode> {
    let Some(task) = lookup_task(&args.task_key) else {
        let available = list_task_keys().join(", ");
        anyhow::bail!(
            "Unknown task key: '{}'\n\nAvailable tasks: {}",
            args.task_key,
            available
        );
    };

    println!("================================================================================");
    println!("TASK: {}", task.title);
    println!("================================================================================");
    println!();
    println!("Key: {}", task.key);
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", task.description);
    println!();

    println!("STEPS");
    println!("--------------------------------------------------------------------------------");
    for step in task.steps {
        println!("  - {}", step);
    }
    println!();

    Ok(ExitCode::SUCCESS)
}

fn cmd_list_tasks(args: ListTasksArgs) -> anyhow::Result<ExitCode> {
    match args.format {
        OutputFormat::Text => {
            println!("Available tasks:\n");
            println!("  {:<10} {:<6} TITLE", "KEY", "STEPS");
            println!("  {:<10} {:<6} -----", "---", "-----");
            for task in TASK_REGISTRY {
                println!("  {:<10} {:<6} {}", task.key, task.steps.len(), task.title);
            }
            println!();
            println!("Use 'shipkit explain <key>' for details.");
        }
        OutputFormat::Json => {
            let tasks: Vec<_> = TASK_REGISTRY
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "key": t.key,
                        "title": t.title,
                        "steps": t.steps,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "shipkit".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        commit: None,
    }
}

fn verdict_label(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Pass => "pass",
        VerdictStatus::Warn => "warn",
        VerdictStatus::Fail => "fail",
        VerdictStatus::Unknown => "unknown",
    }
}
