//! Review aggregation: turns task outcomes into the post-execution review

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::execution::TaskExecutionResult;
use super::plan::PlanTask;

pub const CANCELLED_ERROR: &str = "Execution cancelled";
pub const DEPENDENCIES_ERROR: &str = "Dependencies not met";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewItemStatus {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for ReviewItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewItemStatus::Success => write!(f, "success"),
            ReviewItemStatus::Warning => write!(f, "warning"),
            ReviewItemStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Success,
    Partial,
    Failed,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Success => write!(f, "success"),
            OverallStatus::Partial => write!(f, "partial"),
            OverallStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReviewItem {
    pub task_id: String,
    pub task_title: String,
    pub status: ReviewItemStatus,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReviewState {
    pub items: Vec<ReviewItem>,
    pub overall_status: OverallStatus,
    pub summary: String,
}

impl ReviewState {
    pub fn count(&self, status: ReviewItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}

/// Build the review for a finished run. Pure; `results` are in attempt order.
pub fn build_review(tasks: &[PlanTask], results: &[TaskExecutionResult]) -> ReviewState {
    let titles: HashMap<&str, &str> = tasks
        .iter()
        .map(|t| (t.id.as_str(), t.title.as_str()))
        .collect();

    let items = results
        .iter()
        .map(|r| {
            let task_title = titles
                .get(r.task_id.as_str())
                .copied()
                .unwrap_or(r.task_id.as_str())
                .to_string();
            let error = r.error.as_deref().unwrap_or("Unknown error");

            let (status, summary) = if r.success {
                (
                    ReviewItemStatus::Success,
                    r.result
                        .clone()
                        .unwrap_or_else(|| "Completed successfully".to_string()),
                )
            } else if error == CANCELLED_ERROR || error == DEPENDENCIES_ERROR {
                (ReviewItemStatus::Warning, error.to_string())
            } else {
                (ReviewItemStatus::Error, error.to_string())
            };

            ReviewItem {
                task_id: r.task_id.clone(),
                task_title,
                status,
                summary,
                details: if r.success { None } else { r.result.clone() },
            }
        })
        .collect();

    let total = results.len();
    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = total - succeeded;

    ReviewState {
        items,
        overall_status: overall_status(results),
        summary: summarize(succeeded, total, failed),
    }
}

/// `Failed` iff every result failed, `Success` iff none did
pub fn overall_status(results: &[TaskExecutionResult]) -> OverallStatus {
    let failed = results.iter().filter(|r| !r.success).count();
    if !results.is_empty() && failed == results.len() {
        OverallStatus::Failed
    } else if failed > 0 {
        OverallStatus::Partial
    } else {
        OverallStatus::Success
    }
}

fn summarize(succeeded: usize, total: usize, failed: usize) -> String {
    if failed > 0 {
        format!("Completed {} of {} tasks ({} failed)", succeeded, total, failed)
    } else {
        format!("Completed {} of {} tasks", succeeded, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks() -> Vec<PlanTask> {
        vec![
            PlanTask::new("a", "Create folder", 1),
            PlanTask::new("b", "Create case", 2),
            PlanTask::new("c", "Link signal", 3),
        ]
    }

    #[test]
    fn test_all_success() {
        let results = vec![
            TaskExecutionResult::success("a", "folder 1"),
            TaskExecutionResult::success("b", "case 9"),
            TaskExecutionResult::success("c", "linked"),
        ];
        let review = build_review(&tasks(), &results);
        assert_eq!(review.overall_status, OverallStatus::Success);
        assert_eq!(review.summary, "Completed 3 of 3 tasks");
        assert_eq!(review.items[1].task_title, "Create case");
        assert_eq!(review.items[1].summary, "case 9");
    }

    #[test]
    fn test_item_status_classification() {
        let results = vec![
            TaskExecutionResult::failure("a", "HTTP 500"),
            TaskExecutionResult::failure("b", DEPENDENCIES_ERROR),
            TaskExecutionResult::failure("c", CANCELLED_ERROR),
        ];
        let review = build_review(&tasks(), &results);
        let statuses: Vec<_> = review.items.iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![
                ReviewItemStatus::Error,
                ReviewItemStatus::Warning,
                ReviewItemStatus::Warning
            ]
        );
        assert_eq!(review.overall_status, OverallStatus::Failed);
        assert_eq!(review.summary, "Completed 0 of 3 tasks (3 failed)");
    }

    #[test]
    fn test_partial() {
        let results = vec![
            TaskExecutionResult::success("a", "ok"),
            TaskExecutionResult::failure("b", "boom"),
        ];
        let review = build_review(&tasks(), &results);
        assert_eq!(review.overall_status, OverallStatus::Partial);
        assert_eq!(review.summary, "Completed 1 of 2 tasks (1 failed)");
        assert_eq!(review.count(ReviewItemStatus::Error), 1);
    }

    #[test]
    fn test_overall_status_law() {
        let ok = TaskExecutionResult::success("a", "");
        let bad = TaskExecutionResult::failure("b", "x");
        assert_eq!(overall_status(&[]), OverallStatus::Success);
        assert_eq!(overall_status(&[ok.clone()]), OverallStatus::Success);
        assert_eq!(overall_status(&[bad.clone()]), OverallStatus::Failed);
        assert_eq!(overall_status(&[ok, bad]), OverallStatus::Partial);
    }

    #[test]
    fn test_unknown_task_falls_back_to_id() {
        let review = build_review(&[], &[TaskExecutionResult::success("ghost", "done")]);
        assert_eq!(review.items[0].task_title, "ghost");
    }
}
