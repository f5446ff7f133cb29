//! Execution bookkeeping kept in the workflow state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::{PlanTask, TaskStatus};

/// Per-task outcome recorded by the executor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TaskExecutionResult {
    pub task_id: String,

    pub success: bool,

    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl TaskExecutionResult {
    pub fn success(task_id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            success: true,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failure(task_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExecutionProgress {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub current_task_id: Option<String>,
    pub percentage: u8,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExecutionProgress {
    /// Recount from task statuses. Skipped tasks count toward failures.
    pub fn recount(&mut self, tasks: &[PlanTask]) {
        self.total_tasks = tasks.len();
        self.completed_tasks = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        self.failed_tasks = tasks
            .iter()
            .filter(|t| matches!(t.status, TaskStatus::Failed | TaskStatus::Skipped))
            .count();

        let finished = self.completed_tasks + self.failed_tasks;
        self.percentage = if self.total_tasks == 0 {
            0
        } else {
            ((finished * 100) / self.total_tasks) as u8
        };
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExecutionState {
    pub progress: ExecutionProgress,
    pub results: Vec<TaskExecutionResult>,
    pub is_paused: bool,
    pub is_cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recount_percentage() {
        let mut tasks = vec![
            PlanTask::new("a", "A", 1),
            PlanTask::new("b", "B", 2),
            PlanTask::new("c", "C", 3),
            PlanTask::new("d", "D", 4),
        ];
        tasks[0].status = TaskStatus::Completed;
        tasks[1].status = TaskStatus::Skipped;
        tasks[2].status = TaskStatus::InProgress;

        let mut progress = ExecutionProgress::default();
        progress.recount(&tasks);
        assert_eq!(progress.total_tasks, 4);
        assert_eq!(progress.completed_tasks, 1);
        assert_eq!(progress.failed_tasks, 1);
        assert_eq!(progress.percentage, 50);
    }

    #[test]
    fn test_recount_empty() {
        let mut progress = ExecutionProgress::default();
        progress.recount(&[]);
        assert_eq!(progress.percentage, 0);
    }
}
