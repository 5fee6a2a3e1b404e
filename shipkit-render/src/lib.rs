//! Rendering helpers (markdown) for human-readable run artifacts.

use shipkit_types::receipt::{RunReceipt, StepStatus, VerdictStatus};

pub fn render_run_md(receipt: &RunReceipt) -> String {
    let mut out = String::new();
    out.push_str(&format!("# shipkit {}\n\n", receipt.task));
    out.push_str(&format!("- Run: `{}`\n", receipt.run_id));
    out.push_str(&format!(
        "- Verdict: `{}`\n",
        verdict_label(receipt.verdict.status)
    ));
    out.push_str(&format!(
        "- Steps: {} ran, {} failed, {} skipped, {} blocked\n",
        receipt.verdict.counts.ran,
        receipt.verdict.counts.failed,
        receipt.verdict.counts.skipped,
        receipt.verdict.counts.blocked
    ));
    if let Some(sha) = &receipt.run.head_sha {
        out.push_str(&format!("- HEAD: `{}`\n", sha));
    }
    if !receipt.verdict.reasons.is_empty() {
        out.push_str(&format!(
            "- Reasons: {}\n",
            receipt.verdict.reasons.join(", ")
        ));
    }

    out.push_str("\n## Steps\n\n");
    if receipt.steps.is_empty() {
        out.push_str("_No steps recorded._\n");
        return out;
    }

    for (i, step) in receipt.steps.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, step.name));
        out.push_str(&format!("- Status: `{}`\n", step_label(step.status)));
        if let Some(command) = &step.command {
            out.push_str(&format!("- Command: `{}`\n", command));
        }
        if let Some(code) = step.exit_code {
            out.push_str(&format!("- Exit code: {}\n", code));
        }
        if let Some(ms) = step.duration_ms {
            out.push_str(&format!("- Duration: {} ms\n", ms));
        }
        if let Some(message) = &step.message {
            out.push_str(&format!("- Message: {}\n", message));
        }
        if let Some(reason) = &step.blocked_reason {
            out.push_str(&format!("- Blocked reason: {}\n", reason));
        }
        out.push('\n');
    }

    out
}

fn verdict_label(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Pass => "pass",
        VerdictStatus::Warn => "warn",
        VerdictStatus::Fail => "fail",
        VerdictStatus::Unknown => "unknown",
    }
}

fn step_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Ran => "ran",
        StepStatus::Failed => "failed",
        StepStatus::Skipped => "skipped",
        StepStatus::Blocked => "blocked",
    }
}
