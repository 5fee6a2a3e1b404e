use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The receipt written after every task run.
///
/// shipkit tries hard to be *tolerant* when reading receipts back:
/// - Unknown fields are ignored.
/// - Optional fields may be absent.
///
/// The writer side always fills everything in; the tolerance exists so that
/// `shipkit runs` stays useful with receipts "as found" on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReceipt {
    /// Schema identifier, e.g. "shipkit.report.v1".
    pub schema: String,

    /// Unique id for this run.
    pub run_id: String,

    pub tool: ToolInfo,

    /// Task key ("cov", "docs", "publish"). Kept as a string so receipts
    /// from newer shipkit versions with more tasks still load.
    pub task: String,

    #[serde(default)]
    pub run: RunInfo,

    #[serde(default)]
    pub verdict: Verdict,

    #[serde(default)]
    pub steps: Vec<StepRecord>,

    /// Optional, task-specific payload (e.g. package digest for publish).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RunReceipt {
    pub fn new(tool: ToolInfo, task: &str) -> Self {
        Self {
            schema: crate::schema::SHIPKIT_REPORT_V1.to_string(),
            run_id: Uuid::new_v4().to_string(),
            tool,
            task: task.to_string(),
            run: RunInfo::default(),
            verdict: Verdict::default(),
            steps: vec![],
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// Git HEAD SHA at the time of the run, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_sha: Option<String>,

    /// Whether the working tree had uncommitted changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dirty: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub status: VerdictStatus,

    #[serde(default)]
    pub counts: StepCounts,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Warn,
    Fail,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepCounts {
    #[serde(default)]
    pub ran: u64,

    #[serde(default)]
    pub failed: u64,

    #[serde(default)]
    pub skipped: u64,

    #[serde(default)]
    pub blocked: u64,
}

/// One entry per step of the task, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,

    /// Rendered command line (or a description for built-in steps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default)]
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Present only when a policy gate refused the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ran,
    Failed,
    #[default]
    Skipped,
    Blocked,
}
