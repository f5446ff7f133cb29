//! Task handlers: the seam through which executed tasks reach the outside world

mod command;

pub use command::{CommandDispatcher, ToolOutput};

use async_trait::async_trait;
use std::future::Future;

use crate::error::TaskError;
use crate::workflow::{PlanTask, TaskExecutionResult};

/// Performs the actual unit of work for a task.
///
/// `Err` is treated like a thrown callback: the task fails and observers get
/// `on_error`. A handler that hangs hangs the whole run.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn execute_task(&self, task: &PlanTask) -> Result<TaskExecutionResult, TaskError>;
}

/// Adapter turning an async closure into a [`TaskHandler`]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(PlanTask) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TaskExecutionResult, TaskError>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> TaskHandler for FnHandler<F>
where
    F: Fn(PlanTask) -> Fut + Send + Sync,
    Fut: Future<Output = Result<TaskExecutionResult, TaskError>> + Send + 'static,
{
    async fn execute_task(&self, task: &PlanTask) -> Result<TaskExecutionResult, TaskError> {
        (self.f)(task.clone()).await
    }
}
