//! Workflow orchestrator: owns the conversation state and its mutation API
//!
//! Every phase change goes through the transition table in `phase.rs`. An
//! illegal request returns `false` and leaves the state untouched.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::clarification::{ClarificationQuestion, ClarificationState};
use super::execution::{ExecutionState, TaskExecutionResult};
use super::phase::{next_phase, ConversationPhase, PhaseTransitionEvent};
use super::plan::{Plan, PlanUpdate, TaskStatus};
use super::review::ReviewState;
use super::state::ConversationWorkflowState;
use super::validation::{validate_state, ValidationResult};
use crate::error::WorkflowError;
use crate::runner::{ExecutionSink, TaskExecutor};

#[derive(Debug, Default)]
pub struct WorkflowOrchestrator {
    state: ConversationWorkflowState,
}

impl WorkflowOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously saved state
    pub fn from_state(state: ConversationWorkflowState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ConversationWorkflowState {
        &self.state
    }

    pub fn into_state(self) -> ConversationWorkflowState {
        self.state
    }

    pub fn phase(&self) -> ConversationPhase {
        self.state.phase
    }

    pub fn can_transition(&self, event: PhaseTransitionEvent) -> bool {
        next_phase(self.state.phase, event).is_some()
    }

    /// Fire `event`. Returns false if the table has no such edge.
    pub fn transition(&mut self, event: PhaseTransitionEvent) -> bool {
        let from = self.state.phase;
        let Some(to) = next_phase(from, event) else {
            warn!("Rejected {} in phase {}", event, from);
            return false;
        };

        match event {
            PhaseTransitionEvent::StartWorkflow | PhaseTransitionEvent::RequestNewTask => {
                self.state.started_at = Some(Utc::now());
                self.state.clarification = ClarificationState::with_request("");
                self.state.plan = None;
                self.state.execution = ExecutionState::default();
                self.state.review = None;
            }
            PhaseTransitionEvent::ExitWorkflow => {
                let session_id = std::mem::take(&mut self.state.session_id);
                self.state = ConversationWorkflowState::new(session_id);
            }
            PhaseTransitionEvent::PlanConfirmed => {
                self.state.execution = ExecutionState::default();
                if let Some(ref plan) = self.state.plan {
                    self.state.execution.progress.recount(&plan.tasks);
                }
            }
            PhaseTransitionEvent::ExecutionComplete => {
                self.state.execution.progress.completed_at = Some(Utc::now());
                self.state.execution.progress.current_task_id = None;
            }
            PhaseTransitionEvent::RequirementsComplete | PhaseTransitionEvent::GoBack => {}
        }

        self.state.phase = to;
        info!("Workflow {}: {} --{}--> {}", self.state.session_id, from, event, to);
        true
    }

    /// Move to `phase` if some legal event reaches it from the current phase
    pub fn set_phase(&mut self, phase: ConversationPhase) -> bool {
        let event = self
            .state
            .phase
            .allowed_events()
            .into_iter()
            .find(|e| next_phase(self.state.phase, *e) == Some(phase));
        match event {
            Some(event) => self.transition(event),
            None => {
                warn!("No transition from {} to {}", self.state.phase, phase);
                false
            }
        }
    }

    pub fn start_workflow(&mut self, request: impl Into<String>) -> bool {
        if !self.transition(PhaseTransitionEvent::StartWorkflow) {
            return false;
        }
        self.state.clarification.original_request = request.into();
        true
    }

    /// Questions can only change while clarifying
    pub fn set_questions(&mut self, questions: Vec<ClarificationQuestion>) -> bool {
        if self.state.phase != ConversationPhase::Clarification {
            return false;
        }
        self.state.clarification.set_questions(questions);
        true
    }

    pub fn answer_question(&mut self, id: &str, answer: impl Into<String>) -> bool {
        if self.state.phase != ConversationPhase::Clarification {
            return false;
        }
        self.state.clarification.answer_question(id, answer)
    }

    pub fn complete_requirements(&mut self) -> bool {
        self.transition(PhaseTransitionEvent::RequirementsComplete)
    }

    /// Replace the plan; any previous confirmation is dropped
    pub fn set_plan(&mut self, mut plan: Plan) -> bool {
        if self.state.phase != ConversationPhase::Planning {
            return false;
        }
        plan.confirmed_at = None;
        debug!("Plan {} set with {} tasks", plan.id, plan.tasks.len());
        self.state.plan = Some(plan);
        true
    }

    pub fn update_plan(&mut self, update: PlanUpdate) -> Result<(), WorkflowError> {
        self.planning_plan_mut()?.apply(update)?;
        Ok(())
    }

    pub fn confirm_plan(&mut self) -> Result<(), WorkflowError> {
        let plan = self.planning_plan_mut()?;
        plan.confirm()?;
        info!("Plan {} confirmed at version {}", plan.id, plan.version);
        Ok(())
    }

    pub fn add_plan_feedback(&mut self, feedback: impl Into<String>) -> Result<(), WorkflowError> {
        self.planning_plan_mut()?.add_feedback(feedback);
        Ok(())
    }

    /// Run the confirmed plan. The workflow lands in `review` when done.
    pub async fn execute_plan(
        &mut self,
        executor: &TaskExecutor,
    ) -> Result<Vec<TaskExecutionResult>, WorkflowError> {
        self.expect_phase(ConversationPhase::Execution)?;
        let plan = self.state.plan.as_ref().ok_or(WorkflowError::NoPlan)?;
        if !plan.is_confirmed() {
            return Err(WorkflowError::PlanNotConfirmed);
        }
        let tasks = plan.tasks.clone();
        Ok(executor.execute(&tasks, self).await)
    }

    pub fn set_review(&mut self, review: ReviewState) {
        self.state.review = Some(review);
    }

    /// Loop back to clarification with a fresh request
    pub fn request_new_task(&mut self, request: impl Into<String>) -> bool {
        if !self.transition(PhaseTransitionEvent::RequestNewTask) {
            return false;
        }
        self.state.clarification.original_request = request.into();
        true
    }

    pub fn exit_workflow(&mut self) -> bool {
        self.transition(PhaseTransitionEvent::ExitWorkflow)
    }

    /// Only meaningful from planning; a no-op elsewhere
    pub fn go_back(&mut self) -> bool {
        if self.state.phase != ConversationPhase::Planning {
            return false;
        }
        self.transition(PhaseTransitionEvent::GoBack)
    }

    /// Drop everything and return to idle without going through the table
    pub fn reset(&mut self) {
        self.state = ConversationWorkflowState::default();
    }

    pub fn validate_phase_completion(&self) -> ValidationResult {
        validate_state(&self.state)
    }

    fn expect_phase(&self, expected: ConversationPhase) -> Result<(), WorkflowError> {
        if self.state.phase != expected {
            return Err(WorkflowError::WrongPhase {
                expected,
                actual: self.state.phase,
            });
        }
        Ok(())
    }

    fn planning_plan_mut(&mut self) -> Result<&mut Plan, WorkflowError> {
        self.expect_phase(ConversationPhase::Planning)?;
        self.state.plan.as_mut().ok_or(WorkflowError::NoPlan)
    }
}

impl ExecutionSink for WorkflowOrchestrator {
    fn begin_execution(&mut self, total_tasks: usize) {
        let progress = &mut self.state.execution.progress;
        progress.total_tasks = total_tasks;
        progress.started_at = Some(Utc::now());
        progress.completed_at = None;
        self.state.execution.results.clear();
        self.state.execution.is_paused = false;
        self.state.execution.is_cancelled = false;
    }

    fn update_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        outcome: Option<&TaskExecutionResult>,
    ) {
        let Some(plan) = self.state.plan.as_mut() else {
            return;
        };
        let Some(task) = plan.task_mut(task_id) else {
            warn!("Status update for unknown task {}", task_id);
            return;
        };
        task.status = status;
        if let Some(outcome) = outcome {
            task.result = outcome.result.clone();
            task.error = outcome.error.clone();
        }
        self.state.execution.progress.recount(&plan.tasks);
    }

    fn set_current_task(&mut self, task_id: Option<&str>) {
        self.state.execution.progress.current_task_id = task_id.map(str::to_string);
    }

    fn record_result(&mut self, result: &TaskExecutionResult) {
        self.state.execution.results.push(result.clone());
    }

    fn set_control_flags(&mut self, paused: bool, cancelled: bool) {
        self.state.execution.is_paused = paused;
        self.state.execution.is_cancelled = cancelled;
    }

    fn complete_execution(&mut self, review: ReviewState) {
        self.set_review(review);
        self.transition(PhaseTransitionEvent::ExecutionComplete);
    }
}
