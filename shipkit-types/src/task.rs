use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The convenience targets shipkit knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskId {
    Cov,
    Docs,
    Publish,
}

impl TaskId {
    pub const ALL: [TaskId; 3] = [TaskId::Cov, TaskId::Docs, TaskId::Publish];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskId::Cov => "cov",
            TaskId::Docs => "docs",
            TaskId::Publish => "publish",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskId {
    type Err = UnknownTask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cov" => Ok(TaskId::Cov),
            "docs" => Ok(TaskId::Docs),
            "publish" => Ok(TaskId::Publish),
            other => Err(UnknownTask(other.to_string())),
        }
    }
}

/// Error for a task key that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTask(pub String);

impl fmt::Display for UnknownTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task: '{}'", self.0)
    }
}

impl std::error::Error for UnknownTask {}
