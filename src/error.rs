use std::path::PathBuf;
use thiserror::Error;

use crate::workflow::ConversationPhase;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Operation requires phase '{expected}', workflow is in '{actual}'")]
    WrongPhase {
        expected: ConversationPhase,
        actual: ConversationPhase,
    },

    #[error("No plan has been set")]
    NoPlan,

    #[error("Plan must be confirmed before execution")]
    PlanNotConfirmed,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Tool '{0}' has an empty command")]
    EmptyCommand(String),

    #[error("Retry max_attempts must be at least 1")]
    NoRetryAttempts,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Plan has no tasks")]
    Empty,

    #[error("Plan is confirmed; tasks can no longer change")]
    Confirmed,

    #[error("Duplicate task id '{0}'")]
    DuplicateTask(String),

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read session file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse session script: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Failed to (de)serialize workflow snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Execution timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode tool input: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error raised by a task handler in place of a result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TaskError {
    pub message: String,
}

impl TaskError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<DispatchError> for TaskError {
    fn from(e: DispatchError) -> Self {
        Self::new(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
