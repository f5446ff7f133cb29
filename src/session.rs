//! Session scripts: a YAML description of one request, its answers and its
//! plan, used to drive a workflow without a chat front end.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{SessionError, WorkflowError};
use crate::workflow::{
    ClarificationQuestion, ConversationPhase, PhaseTransitionEvent, Plan, PlanTask,
    ValidationResult, WorkflowOrchestrator,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionScript {
    /// Free-text request that starts the workflow
    pub request: String,

    /// Questions to ask; an `answer` here is replayed as the user's reply
    #[serde(default)]
    pub questions: Vec<ClarificationQuestion>,

    pub plan: PlanScript,

    /// Revision notes recorded against the plan before confirmation
    #[serde(default)]
    pub feedback: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanScript {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tasks: Vec<PlanTask>,
}

impl SessionScript {
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let content = std::fs::read_to_string(path).map_err(|e| SessionError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Questions as they are first presented, with answers stripped
    pub fn blank_questions(&self) -> Vec<ClarificationQuestion> {
        self.questions
            .iter()
            .cloned()
            .map(|mut q| {
                q.answer = None;
                q.answered_at = None;
                q
            })
            .collect()
    }

    /// (question id, answer) pairs to replay in order
    pub fn answers(&self) -> Vec<(String, String)> {
        self.questions
            .iter()
            .filter_map(|q| q.answer.clone().map(|a| (q.id.clone(), a)))
            .collect()
    }

    pub fn build_plan(&self) -> Plan {
        let mut plan = Plan::new(self.plan.title.clone(), self.plan.tasks.clone());
        plan.description = self.plan.description.clone();
        plan
    }

    /// Replay the script through clarification and planning.
    ///
    /// Returns the first failing phase validation. When every phase passes the
    /// workflow is left in `execution` with a confirmed plan.
    pub fn replay(&self, wf: &mut WorkflowOrchestrator) -> Result<ValidationResult, WorkflowError> {
        if !wf.start_workflow(self.request.clone()) {
            return Err(WorkflowError::WrongPhase {
                expected: ConversationPhase::Idle,
                actual: wf.phase(),
            });
        }

        wf.set_questions(self.blank_questions());
        for (id, answer) in self.answers() {
            if !wf.answer_question(&id, answer) {
                warn!("Session answers unknown question '{}'", id);
            }
        }
        let result = wf.validate_phase_completion();
        if !result.is_valid {
            return Ok(result);
        }
        wf.complete_requirements();

        wf.set_plan(self.build_plan());
        for note in &self.feedback {
            wf.add_plan_feedback(note.clone())?;
        }
        if !self.plan.tasks.is_empty() {
            wf.confirm_plan()?;
        }
        let result = wf.validate_phase_completion();
        if !result.is_valid {
            return Ok(result);
        }

        wf.transition(PhaseTransitionEvent::PlanConfirmed);
        debug!("Session replayed into {}", wf.phase());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::workflow::TaskStatus;

    const SCRIPT: &str = r#"
request: Escalate signal 42 into a new case
questions:
  - id: folder
    question: Which folder should the case live in?
    answer: Fraud
  - id: assignee
    question: Who should own it?
    required: false
plan:
  title: Escalate signal 42
  tasks:
    - id: create-case
      title: Create case
      order: 1
      tool:
        name: create_case
        input: { title: "Signal 42" }
    - id: link
      title: Link signal to case
      order: 2
      dependencies: [create-case]
feedback:
  - Use the fraud template
"#;

    #[test]
    fn test_parse_script() {
        let script: SessionScript = serde_yaml::from_str(SCRIPT).unwrap();
        assert_eq!(script.questions.len(), 2);
        assert_eq!(
            script.answers(),
            vec![("folder".to_string(), "Fraud".to_string())]
        );
        assert!(script.blank_questions().iter().all(|q| q.answer.is_none()));

        let plan = script.build_plan();
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[1].dependencies, vec!["create-case"]);
        assert!(plan.tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert!(plan.validate_dependencies().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SessionScript::load(Path::new("/nonexistent/session.yaml")).unwrap_err();
        assert!(matches!(err, SessionError::ReadFile { .. }));
    }

    #[test]
    fn test_replay_reaches_execution() {
        let script: SessionScript = serde_yaml::from_str(SCRIPT).unwrap();
        let mut wf = WorkflowOrchestrator::new();

        let result = script.replay(&mut wf).unwrap();
        assert!(result.is_valid);
        assert_eq!(wf.phase(), ConversationPhase::Execution);

        let plan = wf.state().plan.as_ref().unwrap();
        assert!(plan.is_confirmed());
        assert_eq!(plan.feedback, vec!["Use the fraud template"]);
        assert_eq!(wf.state().clarification.original_request, script.request);
    }

    #[test]
    fn test_replay_stops_on_missing_answer() {
        let mut script: SessionScript = serde_yaml::from_str(SCRIPT).unwrap();
        script.questions[0].answer = None;
        let mut wf = WorkflowOrchestrator::new();

        let result = script.replay(&mut wf).unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Required question not answered: Which folder should the case live in?"]
        );
        assert_eq!(wf.phase(), ConversationPhase::Clarification);
    }

    #[test]
    fn test_replay_reports_empty_plan() {
        let mut script: SessionScript = serde_yaml::from_str(SCRIPT).unwrap();
        script.plan.tasks.clear();
        let mut wf = WorkflowOrchestrator::new();

        let result = script.replay(&mut wf).unwrap();
        assert_eq!(
            result.errors,
            vec![
                "Plan must have at least one task",
                "Plan must be confirmed before execution"
            ]
        );
        assert_eq!(wf.phase(), ConversationPhase::Planning);
    }

    #[test]
    fn test_replay_rejects_cycle() {
        let mut script: SessionScript = serde_yaml::from_str(SCRIPT).unwrap();
        script.plan.tasks[0].dependencies = vec!["link".to_string()];
        let mut wf = WorkflowOrchestrator::new();

        let err = script.replay(&mut wf).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Plan(PlanError::DependencyCycle(_))
        ));
    }
}
