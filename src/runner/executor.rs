use std::sync::Arc;
use tracing::{debug, info};

use super::control::ExecutionControl;
use super::observer::ExecutionObserver;
use crate::dispatch::TaskHandler;
use crate::workflow::review::{build_review, CANCELLED_ERROR, DEPENDENCIES_ERROR};
use crate::workflow::{PlanTask, ReviewState, TaskExecutionResult, TaskStatus};

/// Receives every state change the executor makes.
///
/// The executor never touches plan tasks itself; the sink (normally the
/// workflow orchestrator) is the single writer of workflow state.
pub trait ExecutionSink {
    fn begin_execution(&mut self, total_tasks: usize);

    fn update_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        outcome: Option<&TaskExecutionResult>,
    );

    fn set_current_task(&mut self, task_id: Option<&str>);

    fn record_result(&mut self, result: &TaskExecutionResult);

    fn set_control_flags(&mut self, _paused: bool, _cancelled: bool) {}

    fn complete_execution(&mut self, review: ReviewState);
}

/// Sink for runs that are not attached to a workflow
#[derive(Debug, Default)]
pub struct NullSink;

impl ExecutionSink for NullSink {
    fn begin_execution(&mut self, _total_tasks: usize) {}
    fn update_task_status(&mut self, _: &str, _: TaskStatus, _: Option<&TaskExecutionResult>) {}
    fn set_current_task(&mut self, _task_id: Option<&str>) {}
    fn record_result(&mut self, _result: &TaskExecutionResult) {}
    fn complete_execution(&mut self, _review: ReviewState) {}
}

/// Runs a plan's tasks one at a time in ascending `order`
pub struct TaskExecutor {
    handler: Arc<dyn TaskHandler>,
    observers: Vec<Arc<dyn ExecutionObserver>>,
    control: ExecutionControl,
}

impl TaskExecutor {
    pub fn new(handler: Arc<dyn TaskHandler>) -> Self {
        Self {
            handler,
            observers: Vec::new(),
            control: ExecutionControl::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Handle for pausing, resuming or cancelling from another task
    pub fn control(&self) -> ExecutionControl {
        self.control.clone()
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Execute `tasks` and return one result per task, in attempt order.
    ///
    /// Every task ends `completed`, `failed` or `skipped`. A cancel issued
    /// before this call applies to this run. Control flags are cleared when it
    /// ends; the sink is left with `paused = false` and whether it was cancelled.
    pub async fn execute<S>(&self, tasks: &[PlanTask], sink: &mut S) -> Vec<TaskExecutionResult>
    where
        S: ExecutionSink + ?Sized,
    {
        let mut ordered: Vec<&PlanTask> = tasks.iter().collect();
        ordered.sort_by_key(|t| t.order);

        let mut results: Vec<TaskExecutionResult> = Vec::with_capacity(ordered.len());
        sink.begin_execution(ordered.len());
        info!("Executing {} tasks", ordered.len());

        let mut cancelled = false;

        for task in ordered {
            if self.control.is_paused() && !self.control.is_cancelled() {
                info!("Execution paused before task {}", task.id);
                sink.set_control_flags(true, false);
                let by_cancel = self.control.wait_while_paused().await;
                sink.set_control_flags(false, false);
                debug!("Execution released (cancelled: {})", by_cancel);
            }

            if self.control.is_cancelled() {
                if !cancelled {
                    info!("Execution cancelled before task {}", task.id);
                    cancelled = true;
                    sink.set_control_flags(false, true);
                }
                self.skip(task, CANCELLED_ERROR, sink, &mut results);
                continue;
            }

            let deps_met = task.dependencies.iter().all(|dep| {
                results
                    .iter()
                    .any(|r| r.task_id == *dep && r.success)
            });
            if !deps_met {
                self.skip(task, DEPENDENCIES_ERROR, sink, &mut results);
                continue;
            }

            sink.set_current_task(Some(task.id.as_str()));
            sink.update_task_status(&task.id, TaskStatus::InProgress, None);
            for observer in &self.observers {
                observer.on_task_start(task);
            }

            let result = match self.handler.execute_task(task).await {
                Ok(mut result) => {
                    if result.task_id != task.id {
                        debug!(
                            "Handler reported task id {} for task {}",
                            result.task_id, task.id
                        );
                        result.task_id = task.id.clone();
                    }
                    let status = if result.success {
                        TaskStatus::Completed
                    } else {
                        TaskStatus::Failed
                    };
                    sink.update_task_status(&task.id, status, Some(&result));
                    for observer in &self.observers {
                        observer.on_task_complete(task, &result);
                    }
                    result
                }
                Err(e) => {
                    let result = TaskExecutionResult::failure(&task.id, e.message.clone());
                    sink.update_task_status(&task.id, TaskStatus::Failed, Some(&result));
                    for observer in &self.observers {
                        observer.on_error(task, &e);
                    }
                    result
                }
            };

            sink.record_result(&result);
            results.push(result);
        }

        let review = build_review(tasks, &results);
        info!("{}", review.summary);

        // A finished run is never paused; the cancel mark stays for the review
        sink.set_control_flags(false, cancelled);
        sink.set_current_task(None);
        sink.complete_execution(review);
        for observer in &self.observers {
            observer.on_all_complete(&results);
        }

        self.control.reset();
        results
    }

    fn skip<S>(
        &self,
        task: &PlanTask,
        reason: &str,
        sink: &mut S,
        results: &mut Vec<TaskExecutionResult>,
    ) where
        S: ExecutionSink + ?Sized,
    {
        debug!("Skipping task {}: {}", task.id, reason);
        let result = TaskExecutionResult::failure(&task.id, reason);
        sink.update_task_status(&task.id, TaskStatus::Skipped, Some(&result));
        sink.record_result(&result);
        results.push(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::handler_fn;
    use crate::error::TaskError;
    use crate::workflow::OverallStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        statuses: HashMap<String, TaskStatus>,
        transitions: Vec<(String, TaskStatus)>,
        review: Option<ReviewState>,
        current: Option<String>,
        flags: Vec<(bool, bool)>,
    }

    impl ExecutionSink for RecordingSink {
        fn begin_execution(&mut self, _total_tasks: usize) {}

        fn update_task_status(
            &mut self,
            task_id: &str,
            status: TaskStatus,
            _outcome: Option<&TaskExecutionResult>,
        ) {
            self.statuses.insert(task_id.to_string(), status);
            self.transitions.push((task_id.to_string(), status));
        }

        fn set_current_task(&mut self, task_id: Option<&str>) {
            self.current = task_id.map(str::to_string);
        }

        fn record_result(&mut self, _result: &TaskExecutionResult) {}

        fn set_control_flags(&mut self, paused: bool, cancelled: bool) {
            self.flags.push((paused, cancelled));
        }

        fn complete_execution(&mut self, review: ReviewState) {
            self.review = Some(review);
        }
    }

    /// Handler that records call order and fails the listed task ids
    fn scripted(
        calls: Arc<Mutex<Vec<String>>>,
        failing: &'static [&'static str],
    ) -> Arc<dyn TaskHandler> {
        Arc::new(handler_fn(move |task: PlanTask| {
            calls.lock().unwrap().push(task.id.clone());
            async move {
                if failing.contains(&task.id.as_str()) {
                    Ok(TaskExecutionResult::failure(&task.id, "tool failed"))
                } else {
                    Ok(TaskExecutionResult::success(&task.id, format!("{} done", task.id)))
                }
            }
        }))
    }

    #[derive(Default)]
    struct EventLog(Mutex<Vec<String>>);

    impl ExecutionObserver for EventLog {
        fn on_task_start(&self, task: &PlanTask) {
            self.0.lock().unwrap().push(format!("start:{}", task.id));
        }
        fn on_task_complete(&self, task: &PlanTask, _result: &TaskExecutionResult) {
            self.0.lock().unwrap().push(format!("complete:{}", task.id));
        }
        fn on_error(&self, task: &PlanTask, _error: &TaskError) {
            self.0.lock().unwrap().push(format!("error:{}", task.id));
        }
        fn on_all_complete(&self, results: &[TaskExecutionResult]) {
            self.0.lock().unwrap().push(format!("all:{}", results.len()));
        }
    }

    #[tokio::test]
    async fn test_tasks_run_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls.clone(), &[]));
        let tasks = vec![
            PlanTask::new("third", "C", 3),
            PlanTask::new("first", "A", 1),
            PlanTask::new("second", "B", 2),
        ];

        let results = executor.execute(&tasks, &mut NullSink).await;

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
        let ids: Vec<_> = results.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_equal_order_keeps_input_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls.clone(), &[]));
        let tasks = vec![
            PlanTask::new("x", "X", 5),
            PlanTask::new("y", "Y", 5),
            PlanTask::new("z", "Z", 1),
        ];
        executor.execute(&tasks, &mut NullSink).await;
        assert_eq!(*calls.lock().unwrap(), vec!["z", "x", "y"]);
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls, &[]));
        let tasks = vec![
            PlanTask::new("a", "A", 1),
            PlanTask::new("b", "B", 2),
            PlanTask::new("c", "C", 3),
        ];
        let mut sink = RecordingSink::default();
        executor.execute(&tasks, &mut sink).await;

        let review = sink.review.unwrap();
        assert_eq!(review.overall_status, OverallStatus::Success);
        assert_eq!(review.summary, "Completed 3 of 3 tasks");
        assert!(sink.current.is_none());
    }

    #[tokio::test]
    async fn test_failed_dependency_skips_dependent() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls.clone(), &["a"]));
        let tasks = vec![
            PlanTask::new("a", "Create folder", 1),
            PlanTask::new("b", "Create case", 2).depends_on(&["a"]),
        ];
        let mut sink = RecordingSink::default();
        let results = executor.execute(&tasks, &mut sink).await;

        assert_eq!(*calls.lock().unwrap(), vec!["a"]);
        assert_eq!(results[1].error.as_deref(), Some(DEPENDENCIES_ERROR));
        assert_eq!(sink.statuses["a"], TaskStatus::Failed);
        assert_eq!(sink.statuses["b"], TaskStatus::Skipped);
        assert_eq!(sink.review.unwrap().overall_status, OverallStatus::Failed);
    }

    #[tokio::test]
    async fn test_dependency_on_later_task_is_unmet() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls.clone(), &[]));
        let tasks = vec![
            PlanTask::new("a", "A", 1).depends_on(&["b"]),
            PlanTask::new("b", "B", 2),
        ];
        let results = executor.execute(&tasks, &mut NullSink).await;
        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(*calls.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_handler_error_does_not_abort_run() {
        let handler = Arc::new(handler_fn(|task: PlanTask| async move {
            if task.id == "a" {
                Err(TaskError::new("connection refused"))
            } else {
                Ok(TaskExecutionResult::success(&task.id, "ok"))
            }
        }));
        let log = Arc::new(EventLog::default());
        let executor = TaskExecutor::new(handler).with_observer(log.clone());
        let tasks = vec![PlanTask::new("a", "A", 1), PlanTask::new("b", "B", 2)];

        let mut sink = RecordingSink::default();
        let results = executor.execute(&tasks, &mut sink).await;

        assert_eq!(results[0].error.as_deref(), Some("connection refused"));
        assert!(results[1].success);
        assert_eq!(
            *log.0.lock().unwrap(),
            vec!["start:a", "error:a", "start:b", "complete:b", "all:2"]
        );
        let review = sink.review.unwrap();
        assert_eq!(review.overall_status, OverallStatus::Partial);
        assert_eq!(review.summary, "Completed 1 of 2 tasks (1 failed)");
    }

    #[tokio::test]
    async fn test_every_task_reaches_terminal_status() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls, &["b"]));
        let tasks = vec![
            PlanTask::new("a", "A", 1),
            PlanTask::new("b", "B", 2),
            PlanTask::new("c", "C", 3).depends_on(&["b"]),
            PlanTask::new("d", "D", 4).depends_on(&["a"]),
        ];
        let mut sink = RecordingSink::default();
        executor.execute(&tasks, &mut sink).await;

        assert_eq!(sink.statuses.len(), 4);
        for status in sink.statuses.values() {
            assert!(status.is_terminal());
        }
        let in_progress = sink
            .transitions
            .iter()
            .filter(|(_, s)| *s == TaskStatus::InProgress)
            .count();
        assert_eq!(in_progress, 3);
    }

    #[tokio::test]
    async fn test_cancel_before_execute_skips_everything() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls.clone(), &[]));
        let tasks = vec![PlanTask::new("a", "A", 1), PlanTask::new("b", "B", 2)];

        executor.cancel();
        let mut sink = RecordingSink::default();
        let results = executor.execute(&tasks, &mut sink).await;

        assert!(calls.lock().unwrap().is_empty());
        for result in &results {
            assert!(!result.success);
            assert_eq!(result.error.as_deref(), Some(CANCELLED_ERROR));
        }
        assert_eq!(sink.review.unwrap().overall_status, OverallStatus::Failed);
        assert!(!executor.control().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_mid_run_skips_remaining() {
        let control_slot: Arc<Mutex<Option<ExecutionControl>>> = Arc::new(Mutex::new(None));
        let slot = control_slot.clone();
        let handler = Arc::new(handler_fn(move |task: PlanTask| {
            // Cancel while task "b" is in flight; it still finishes
            if task.id == "b" {
                if let Some(control) = slot.lock().unwrap().as_ref() {
                    control.cancel();
                }
            }
            async move { Ok(TaskExecutionResult::success(&task.id, "ok")) }
        }));
        let executor = TaskExecutor::new(handler);
        *control_slot.lock().unwrap() = Some(executor.control());

        let tasks = vec![
            PlanTask::new("a", "A", 1),
            PlanTask::new("b", "B", 2),
            PlanTask::new("c", "C", 3),
            PlanTask::new("d", "D", 4),
        ];
        let results = executor.execute(&tasks, &mut NullSink).await;

        assert!(results[0].success);
        assert!(results[1].success);
        assert_eq!(results[2].error.as_deref(), Some(CANCELLED_ERROR));
        assert_eq!(results[3].error.as_deref(), Some(CANCELLED_ERROR));
    }

    #[tokio::test]
    async fn test_pause_holds_at_task_boundary() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = Arc::new(TaskExecutor::new(scripted(calls.clone(), &[])));
        let control = executor.control();
        control.pause();

        let run = {
            let executor = executor.clone();
            tokio::spawn(async move {
                let tasks = vec![PlanTask::new("a", "A", 1), PlanTask::new("b", "B", 2)];
                executor.execute(&tasks, &mut NullSink).await
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(calls.lock().unwrap().is_empty());
        assert!(!run.is_finished());

        control.resume();
        let results = run.await.unwrap();
        assert!(results.iter().all(|r| r.success));
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_cancel_while_paused() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = Arc::new(TaskExecutor::new(scripted(calls.clone(), &[])));
        let control = executor.control();
        control.pause();

        let run = {
            let executor = executor.clone();
            tokio::spawn(async move {
                let tasks = vec![PlanTask::new("a", "A", 1), PlanTask::new("b", "B", 2)];
                let mut sink = RecordingSink::default();
                let results = executor.execute(&tasks, &mut sink).await;
                (results, sink)
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        control.cancel();
        let (results, sink) = run.await.unwrap();

        assert!(calls.lock().unwrap().is_empty());
        assert!(results
            .iter()
            .all(|r| r.error.as_deref() == Some(CANCELLED_ERROR)));
        // paused, released, cancelled once, final state
        assert_eq!(
            sink.flags,
            vec![(true, false), (false, false), (false, true), (false, true)]
        );
    }

    #[tokio::test]
    async fn test_cancel_without_pause_reports_flags() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let executor = TaskExecutor::new(scripted(calls, &[]));
        executor.cancel();
        let tasks = vec![PlanTask::new("a", "A", 1), PlanTask::new("b", "B", 2)];

        let mut sink = RecordingSink::default();
        executor.execute(&tasks, &mut sink).await;

        assert_eq!(sink.flags, vec![(false, true), (false, true)]);
        assert!(!executor.control().is_cancelled());
    }

    #[tokio::test]
    async fn test_mismatched_task_id_is_normalized() {
        let handler = Arc::new(handler_fn(|_task: PlanTask| async move {
            Ok(TaskExecutionResult::success("wrong", "ok"))
        }));
        let executor = TaskExecutor::new(handler);
        let tasks = vec![
            PlanTask::new("a", "A", 1),
            PlanTask::new("b", "B", 2).depends_on(&["a"]),
        ];
        let results = executor.execute(&tasks, &mut NullSink).await;
        assert_eq!(results[0].task_id, "a");
        assert!(results[1].success);
    }
}
