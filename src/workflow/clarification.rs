//! Clarification tracker: questions asked before planning and their answers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a question expects to be answered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    #[default]
    Text,
    Choice,
    Confirm,
    MultiSelect,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClarificationQuestion {
    pub id: String,

    pub question: String,

    #[serde(default)]
    pub answer_type: AnswerType,

    /// Possible answers for choice questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default)]
    pub answer: Option<String>,

    #[serde(default)]
    pub answered_at: Option<DateTime<Utc>>,
}

fn default_required() -> bool {
    true
}

impl ClarificationQuestion {
    pub fn new(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer_type: AnswerType::Text,
            options: Vec::new(),
            required: true,
            answer: None,
            answered_at: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_choices(mut self, answer_type: AnswerType, options: Vec<String>) -> Self {
        self.answer_type = answer_type;
        self.options = options;
        self
    }

    pub fn is_answered(&self) -> bool {
        self.answer
            .as_deref()
            .map(|a| !a.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClarificationState {
    pub questions: Vec<ClarificationQuestion>,

    /// Advisory pointer for one-at-a-time presentation
    pub current_question_index: usize,

    pub is_complete: bool,

    pub original_request: String,
}

impl ClarificationState {
    pub fn with_request(request: impl Into<String>) -> Self {
        Self {
            original_request: request.into(),
            // No questions means nothing blocks planning
            is_complete: true,
            ..Self::default()
        }
    }

    pub fn set_questions(&mut self, questions: Vec<ClarificationQuestion>) {
        self.questions = questions;
        self.current_question_index = 0;
        self.recompute();
    }

    /// Record an answer. Returns false when no question has this id.
    pub fn answer_question(&mut self, id: &str, answer: impl Into<String>) -> bool {
        let Some(question) = self.questions.iter_mut().find(|q| q.id == id) else {
            return false;
        };
        question.answer = Some(answer.into());
        question.answered_at = Some(Utc::now());
        self.recompute();
        true
    }

    pub fn current_question(&self) -> Option<&ClarificationQuestion> {
        self.questions.get(self.current_question_index)
    }

    pub fn next_question(&mut self) -> Option<&ClarificationQuestion> {
        if self.current_question_index + 1 < self.questions.len() {
            self.current_question_index += 1;
        }
        self.current_question()
    }

    pub fn previous_question(&mut self) -> Option<&ClarificationQuestion> {
        self.current_question_index = self.current_question_index.saturating_sub(1);
        self.current_question()
    }

    /// Required questions still lacking a non-empty answer
    pub fn unanswered_required(&self) -> Vec<&ClarificationQuestion> {
        self.questions
            .iter()
            .filter(|q| q.required && !q.is_answered())
            .collect()
    }

    fn recompute(&mut self) {
        self.is_complete = self.unanswered_required().is_empty();
    }
}
