//! Conversation workflow: clarification → planning → execution → review
//!
//! The orchestrator owns a [`ConversationWorkflowState`] and is the only
//! writer of it. Phase legality lives in [`phase`]; the pieces below hold the
//! per-phase bookkeeping.

pub mod clarification;
pub mod execution;
pub mod orchestrator;
pub mod phase;
pub mod plan;
pub mod review;
pub mod state;
pub mod validation;

pub use clarification::{AnswerType, ClarificationQuestion, ClarificationState};
pub use execution::{ExecutionProgress, ExecutionState, TaskExecutionResult};
pub use orchestrator::WorkflowOrchestrator;
pub use phase::{can_transition, next_phase, ConversationPhase, PhaseTransitionEvent};
pub use plan::{Plan, PlanTask, PlanUpdate, TaskStatus, ToolCall};
pub use review::{build_review, OverallStatus, ReviewItem, ReviewItemStatus, ReviewState};
pub use state::ConversationWorkflowState;
pub use validation::{
    validate_phase_completion, validate_state, PhaseSnapshot, PlanSnapshot, ValidationResult,
};
