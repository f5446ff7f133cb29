//! Plan model: the ordered, revisable task list produced during planning

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::PlanError;

/// Opaque tool invocation handed to the task handler
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolCall {
    pub name: String,

    #[serde(default)]
    pub input: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// A single unit of planned work
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlanTask {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tool: Option<ToolCall>,

    /// Ids of tasks that must succeed first
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub status: TaskStatus,

    /// Execution rank; need not be contiguous
    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl PlanTask {
    pub fn new(id: impl Into<String>, title: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            tool: None,
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            order,
            result: None,
            error: None,
        }
    }

    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.dependencies = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_tool(mut self, name: impl Into<String>, input: serde_json::Value) -> Self {
        self.tool = Some(ToolCall {
            name: name.into(),
            input,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Plan {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tasks: Vec<PlanTask>,

    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub feedback: Vec<String>,
}

fn default_version() -> u32 {
    1
}

/// Partial update merged into a plan by `Plan::apply`
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tasks: Option<Vec<PlanTask>>,
    pub feedback: Option<Vec<String>>,
}

impl Plan {
    pub fn new(title: impl Into<String>, tasks: Vec<PlanTask>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            tasks,
            version: 1,
            confirmed_at: None,
            feedback: Vec::new(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    /// Merge `update` into the plan and bump the version.
    ///
    /// Task changes are refused once the plan is confirmed; nothing is
    /// applied in that case.
    pub fn apply(&mut self, update: PlanUpdate) -> Result<(), PlanError> {
        if update.tasks.is_some() && self.is_confirmed() {
            return Err(PlanError::Confirmed);
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(tasks) = update.tasks {
            self.tasks = tasks;
        }
        if let Some(feedback) = update.feedback {
            self.feedback = feedback;
        }
        self.version += 1;
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), PlanError> {
        if self.tasks.is_empty() {
            return Err(PlanError::Empty);
        }
        self.validate_dependencies()?;
        self.confirmed_at = Some(Utc::now());
        Ok(())
    }

    pub fn add_feedback(&mut self, feedback: impl Into<String>) {
        self.feedback.push(feedback.into());
    }

    pub fn task(&self, id: &str) -> Option<&PlanTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut PlanTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Check ids are unique, dependencies resolve, and the graph is acyclic
    pub fn validate_dependencies(&self) -> Result<(), PlanError> {
        let mut ids = HashSet::new();
        for task in &self.tasks {
            if !ids.insert(task.id.as_str()) {
                return Err(PlanError::DuplicateTask(task.id.clone()));
            }
        }

        for task in &self.tasks {
            for dep in &task.dependencies {
                if !ids.contains(dep.as_str()) {
                    return Err(PlanError::UnknownDependency {
                        task: task.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let graph: HashMap<&str, &[String]> = self
            .tasks
            .iter()
            .map(|t| (t.id.as_str(), t.dependencies.as_slice()))
            .collect();

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut path: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if let Some(cycle) = find_cycle(task.id.as_str(), &graph, &mut marks, &mut path) {
                return Err(PlanError::DependencyCycle(cycle));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn find_cycle<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match marks.get(node) {
        Some(Mark::Done) => return None,
        Some(Mark::Visiting) => {
            let start = path.iter().position(|n| *n == node).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(node.to_string());
            return Some(cycle);
        }
        None => {}
    }

    marks.insert(node, Mark::Visiting);
    path.push(node);
    for dep in graph.get(node).copied().unwrap_or_default() {
        if let Some(cycle) = find_cycle(dep.as_str(), graph, marks, path) {
            return Some(cycle);
        }
    }
    path.pop();
    marks.insert(node, Mark::Done);
    None
}
