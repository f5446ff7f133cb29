use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::clarification::ClarificationState;
use super::execution::ExecutionState;
use super::phase::ConversationPhase;
use super::plan::Plan;
use super::review::ReviewState;
use crate::error::SessionError;

const SNAPSHOT_FILE: &str = "session.json";

/// Aggregate root of one conversation workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationWorkflowState {
    pub phase: ConversationPhase,
    pub session_id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub clarification: ClarificationState,
    pub plan: Option<Plan>,
    pub execution: ExecutionState,
    pub review: Option<ReviewState>,
}

impl Default for ConversationWorkflowState {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

impl ConversationWorkflowState {
    pub fn new(session_id: String) -> Self {
        Self {
            phase: ConversationPhase::Idle,
            session_id,
            started_at: None,
            clarification: ClarificationState::default(),
            plan: None,
            execution: ExecutionState::default(),
            review: None,
        }
    }

    /// Load the last snapshot from `dir`, if any
    pub fn load(dir: &Path) -> Result<Option<Self>, SessionError> {
        let path = Self::snapshot_path(dir);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write a snapshot to `dir`, creating it if needed
    pub fn save(&self, dir: &Path) -> Result<PathBuf, SessionError> {
        fs::create_dir_all(dir)?;
        let path = Self::snapshot_path(dir);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    pub fn snapshot_path(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }
}
