use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;
use tracing::debug;

use super::TaskHandler;
use crate::config::{Config, RetryConfig, ToolCommand};
use crate::error::{DispatchError, TaskError};
use crate::runner::retry_with_backoff;
use crate::workflow::{PlanTask, TaskExecutionResult, ToolCall};

pub const NO_TOOL_RESULT: &str = "No tool call required";

#[derive(Debug)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub exit_code: i32,
    /// Set when the tool exited before taking all of its input
    pub input_error: Option<String>,
}

/// Dispatches each task's tool call to an external command.
///
/// The tool input is written to the child's stdin as JSON and its stdout
/// becomes the task result. Spawn failures and timeouts are retried; a
/// non-zero exit is a task failure and is not.
pub struct CommandDispatcher {
    tools: HashMap<String, ToolCommand>,
    default_timeout: Duration,
    retry: RetryConfig,
}

impl CommandDispatcher {
    pub fn new(
        tools: HashMap<String, ToolCommand>,
        default_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self {
            tools,
            default_timeout,
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tools.clone(),
            Duration::from_secs(config.timeout_sec),
            config.retry.clone(),
        )
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    async fn run_tool(
        &self,
        tool: &ToolCommand,
        call: &ToolCall,
        task_id: &str,
    ) -> Result<ToolOutput, DispatchError> {
        let input = serde_json::to_vec(&call.input)?;
        let timeout = tool
            .timeout_sec
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        // Plain command names go through PATH lookup
        let binary_str = tool.command.to_string_lossy();
        let mut cmd = if binary_str.contains('/') || binary_str.contains('\\') {
            Command::new(&tool.command)
        } else {
            Command::new(binary_str.as_ref())
        };

        cmd.args(&tool.args)
            .envs(&tool.env)
            .env("CASEFLOW_TASK_ID", task_id)
            .env("CASEFLOW_TOOL", &call.name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = tool.working_dir {
            cmd.current_dir(dir);
        }

        let start = std::time::Instant::now();
        let mut child = cmd.spawn()?;

        // Feed stdin while collecting output, both under the timeout. Dropping
        // the future on timeout drops the child, which kills it.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio_timeout(timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| DispatchError::Timeout(timeout))?;
        let output = output?;

        let input_error = fed.err().map(|e| {
            debug!("Tool {} did not consume its input: {}", call.name, e);
            e.to_string()
        });

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration: start.elapsed(),
            exit_code: output.status.code().unwrap_or(-1),
            input_error,
        })
    }
}

#[async_trait]
impl TaskHandler for CommandDispatcher {
    async fn execute_task(&self, task: &PlanTask) -> Result<TaskExecutionResult, TaskError> {
        let Some(call) = task.tool.as_ref() else {
            return Ok(TaskExecutionResult::success(&task.id, NO_TOOL_RESULT));
        };

        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| TaskError::new(format!("Unknown tool '{}'", call.name)))?;

        debug!("Dispatching task {} to tool {}", task.id, call.name);

        let output = retry_with_backoff(&self.retry, &call.name, || {
            self.run_tool(tool, call, &task.id)
        })
        .await?;

        debug!(
            "Tool {} exited with {} in {:?}",
            call.name, output.exit_code, output.duration
        );

        if output.exit_code == 0 {
            if let Some(ref e) = output.input_error {
                return Ok(TaskExecutionResult::failure(
                    &task.id,
                    format!("Tool '{}' did not accept its input: {}", call.name, e),
                ));
            }
            Ok(TaskExecutionResult::success(&task.id, output.stdout.trim()))
        } else {
            let stderr = output.stderr.trim();
            let error = if stderr.is_empty() {
                format!("Tool '{}' exited with code {}", call.name, output.exit_code)
            } else {
                stderr.to_string()
            };
            Ok(TaskExecutionResult {
                task_id: task.id.clone(),
                success: false,
                result: Some(output.stdout.trim().to_string()).filter(|s| !s.is_empty()),
                error: Some(error),
            })
        }
    }
}
