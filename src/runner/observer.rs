use tracing::{debug, info, warn};

use crate::error::TaskError;
use crate::workflow::{PlanTask, TaskExecutionResult};

/// Progress hooks. Called inline by the executor, so implementations must
/// return quickly.
pub trait ExecutionObserver: Send + Sync {
    fn on_task_start(&self, _task: &PlanTask) {}

    fn on_task_complete(&self, _task: &PlanTask, _result: &TaskExecutionResult) {}

    fn on_error(&self, _task: &PlanTask, _error: &TaskError) {}

    fn on_all_complete(&self, _results: &[TaskExecutionResult]) {}
}

/// Logs executor progress through `tracing`
pub struct TracingObserver;

impl ExecutionObserver for TracingObserver {
    fn on_task_start(&self, task: &PlanTask) {
        info!("Starting task {} ({})", task.id, task.title);
    }

    fn on_task_complete(&self, task: &PlanTask, result: &TaskExecutionResult) {
        if result.success {
            info!("Task {} completed", task.id);
        } else {
            warn!(
                "Task {} failed: {}",
                task.id,
                result.error.as_deref().unwrap_or("no error given")
            );
        }
    }

    fn on_error(&self, task: &PlanTask, error: &TaskError) {
        warn!("Task {} raised an error: {}", task.id, error);
    }

    fn on_all_complete(&self, results: &[TaskExecutionResult]) {
        let ok = results.iter().filter(|r| r.success).count();
        debug!("Run finished: {} of {} succeeded", ok, results.len());
    }
}
