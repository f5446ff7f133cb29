//! Phase completion checks. Failures are reported as data, never as errors.

use serde::Serialize;

use super::phase::ConversationPhase;
use super::state::ConversationWorkflowState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSnapshot {
    pub confirmed: bool,
    pub task_count: usize,
}

/// Counts-only view of the workflow for callers without the full state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseSnapshot {
    /// Text of required questions without an answer
    pub required_unanswered: Vec<String>,
    pub plan: Option<PlanSnapshot>,
    pub pending_tasks: usize,
}

impl From<&ConversationWorkflowState> for PhaseSnapshot {
    fn from(state: &ConversationWorkflowState) -> Self {
        Self {
            required_unanswered: state
                .clarification
                .unanswered_required()
                .into_iter()
                .map(|q| q.question.clone())
                .collect(),
            plan: state.plan.as_ref().map(|p| PlanSnapshot {
                confirmed: p.is_confirmed(),
                task_count: p.tasks.len(),
            }),
            pending_tasks: state
                .plan
                .as_ref()
                .map(|p| {
                    p.tasks
                        .iter()
                        .filter(|t| !t.status.is_terminal())
                        .count()
                })
                .unwrap_or(0),
        }
    }
}

/// Check whether `phase` has met its preconditions for moving on
pub fn validate_phase_completion(
    phase: ConversationPhase,
    snapshot: &PhaseSnapshot,
) -> ValidationResult {
    let mut errors = Vec::new();

    match phase {
        ConversationPhase::Clarification => {
            for question in &snapshot.required_unanswered {
                errors.push(format!("Required question not answered: {}", question));
            }
        }
        ConversationPhase::Planning => match snapshot.plan {
            None => errors.push("Plan is required".to_string()),
            Some(plan) => {
                if plan.task_count == 0 {
                    errors.push("Plan must have at least one task".to_string());
                }
                if !plan.confirmed {
                    errors.push("Plan must be confirmed before execution".to_string());
                }
            }
        },
        ConversationPhase::Execution => {
            if snapshot.pending_tasks > 0 {
                errors.push(format!("{} task(s) still pending", snapshot.pending_tasks));
            }
        }
        ConversationPhase::Idle | ConversationPhase::Review => {}
    }

    ValidationResult::from_errors(errors)
}

pub fn validate_state(state: &ConversationWorkflowState) -> ValidationResult {
    validate_phase_completion(state.phase, &PhaseSnapshot::from(state))
}
