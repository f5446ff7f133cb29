use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::report::build_review_markdown;
use crate::error::OutputError;
use crate::workflow::{ConversationWorkflowState, OverallStatus, ReviewItem, ReviewItemStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewReport {
    pub timestamp: String,
    pub session_id: String,
    pub request: String,
    pub plan_title: String,
    pub plan_version: u32,
    pub duration_sec: f64,
    pub overall_status: OverallStatus,
    pub summary: String,
    pub items: Vec<ReviewItem>,
    pub succeeded: usize,
    pub warnings: usize,
    pub errors: usize,
    pub exit_code: i32,
}

/// Write `review.json` and `review.md` into `report_dir`. Returns the JSON path.
pub fn write_review(
    report_dir: &Path,
    state: &ConversationWorkflowState,
) -> Result<PathBuf, OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let report = build_report(state);

    let json_path = report_dir.join("review.json");
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    let md_path = report_dir.join("review.md");
    let md = build_review_markdown(&report);
    fs::write(&md_path, md).map_err(OutputError::WriteReport)?;

    Ok(json_path)
}

pub fn build_report(state: &ConversationWorkflowState) -> ReviewReport {
    let (overall_status, summary, items) = match &state.review {
        Some(review) => (
            review.overall_status,
            review.summary.clone(),
            review.items.clone(),
        ),
        None => (
            OverallStatus::Success,
            "No tasks were executed".to_string(),
            Vec::new(),
        ),
    };

    let count = |status: ReviewItemStatus| items.iter().filter(|i| i.status == status).count();
    let succeeded = count(ReviewItemStatus::Success);
    let warnings = count(ReviewItemStatus::Warning);
    let errors = count(ReviewItemStatus::Error);

    let progress = &state.execution.progress;
    let duration_sec = match (progress.started_at, progress.completed_at) {
        (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 1000.0,
        _ => 0.0,
    };

    let exit_code = if overall_status == OverallStatus::Success {
        0
    } else {
        1
    };

    ReviewReport {
        timestamp: Utc::now().to_rfc3339(),
        session_id: state.session_id.clone(),
        request: state.clarification.original_request.clone(),
        plan_title: state
            .plan
            .as_ref()
            .map(|p| p.title.clone())
            .unwrap_or_default(),
        plan_version: state.plan.as_ref().map(|p| p.version).unwrap_or(0),
        duration_sec,
        overall_status,
        summary,
        items,
        succeeded,
        warnings,
        errors,
        exit_code,
    }
}
