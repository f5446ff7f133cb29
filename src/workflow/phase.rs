//! Phase transition table for the conversation workflow
//!
//! The table below is the only place phase legality is decided. Every
//! (phase, event) pair not listed is illegal.

use serde::{Deserialize, Serialize};

/// The five mutually exclusive phases of a conversation workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    #[default]
    Idle,
    Clarification,
    Planning,
    Execution,
    Review,
}

impl ConversationPhase {
    pub const ALL: [ConversationPhase; 5] = [
        ConversationPhase::Idle,
        ConversationPhase::Clarification,
        ConversationPhase::Planning,
        ConversationPhase::Execution,
        ConversationPhase::Review,
    ];

    /// Events that are legal from this phase, in table order
    pub fn allowed_events(self) -> Vec<PhaseTransitionEvent> {
        TRANSITIONS
            .iter()
            .filter(|(from, _, _)| *from == self)
            .map(|(_, event, _)| *event)
            .collect()
    }
}

impl std::fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationPhase::Idle => write!(f, "idle"),
            ConversationPhase::Clarification => write!(f, "clarification"),
            ConversationPhase::Planning => write!(f, "planning"),
            ConversationPhase::Execution => write!(f, "execution"),
            ConversationPhase::Review => write!(f, "review"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseTransitionEvent {
    StartWorkflow,
    RequirementsComplete,
    PlanConfirmed,
    ExecutionComplete,
    RequestNewTask,
    ExitWorkflow,
    GoBack,
}

impl PhaseTransitionEvent {
    pub const ALL: [PhaseTransitionEvent; 7] = [
        PhaseTransitionEvent::StartWorkflow,
        PhaseTransitionEvent::RequirementsComplete,
        PhaseTransitionEvent::PlanConfirmed,
        PhaseTransitionEvent::ExecutionComplete,
        PhaseTransitionEvent::RequestNewTask,
        PhaseTransitionEvent::ExitWorkflow,
        PhaseTransitionEvent::GoBack,
    ];
}

impl std::fmt::Display for PhaseTransitionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PhaseTransitionEvent::StartWorkflow => "START_WORKFLOW",
            PhaseTransitionEvent::RequirementsComplete => "REQUIREMENTS_COMPLETE",
            PhaseTransitionEvent::PlanConfirmed => "PLAN_CONFIRMED",
            PhaseTransitionEvent::ExecutionComplete => "EXECUTION_COMPLETE",
            PhaseTransitionEvent::RequestNewTask => "REQUEST_NEW_TASK",
            PhaseTransitionEvent::ExitWorkflow => "EXIT_WORKFLOW",
            PhaseTransitionEvent::GoBack => "GO_BACK",
        };
        f.write_str(name)
    }
}

use ConversationPhase as P;
use PhaseTransitionEvent as E;

const TRANSITIONS: [(ConversationPhase, PhaseTransitionEvent, ConversationPhase); 9] = [
    (P::Idle, E::StartWorkflow, P::Clarification),
    (P::Clarification, E::RequirementsComplete, P::Planning),
    (P::Clarification, E::ExitWorkflow, P::Idle),
    (P::Planning, E::PlanConfirmed, P::Execution),
    (P::Planning, E::GoBack, P::Clarification),
    (P::Planning, E::ExitWorkflow, P::Idle),
    (P::Execution, E::ExecutionComplete, P::Review),
    (P::Review, E::RequestNewTask, P::Clarification),
    (P::Review, E::ExitWorkflow, P::Idle),
];

/// Destination phase for `event` fired in `from`, or `None` if illegal
pub fn next_phase(from: ConversationPhase, event: PhaseTransitionEvent) -> Option<ConversationPhase> {
    TRANSITIONS
        .iter()
        .find(|(f, e, _)| *f == from && *e == event)
        .map(|(_, _, to)| *to)
}

pub fn can_transition(from: ConversationPhase, event: PhaseTransitionEvent) -> bool {
    next_phase(from, event).is_some()
}
