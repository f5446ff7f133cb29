//! caseflow: a conversation workflow engine for case management.
//!
//! A request moves through clarification, planning, execution and review.
//! [`workflow::WorkflowOrchestrator`] owns the state; [`runner::TaskExecutor`]
//! runs a confirmed plan through a [`dispatch::TaskHandler`].

pub mod config;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod runner;
pub mod session;
pub mod workflow;

pub use error::WorkflowError;
pub use workflow::{ConversationPhase, ConversationWorkflowState, WorkflowOrchestrator};
