//! Error types for exam loading and session transitions.
//!
//! `LoadError` is defined here rather than in `examkit-loader` so that the
//! session launcher can tell fetch failures from malformed documents without
//! string matching.

use thiserror::Error;

use crate::model::ExamMode;

/// Errors that can occur while fetching or validating an exam document.
///
/// Question numbers in these errors are 1-based, as shown to the user.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The transport failed before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The source answered with a non-success status.
    #[error("failed to fetch exam '{exam_id}' (HTTP {status})")]
    Status { exam_id: String, status: u16 },

    /// The source has no document under this identifier.
    #[error("exam not found: {0}")]
    NotFound(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The document is not valid JSON or misses required fields.
    #[error("malformed exam document: {0}")]
    Malformed(String),

    /// The document declares no questions.
    #[error("exam has no questions")]
    NoQuestions,

    /// A question declares no options.
    #[error("question {question} has no options")]
    NoOptions { question: usize },

    /// An answer key index does not point at an option.
    #[error("question {question}: answer index {index} is out of range ({option_count} options)")]
    AnswerOutOfRange {
        question: usize,
        index: usize,
        option_count: usize,
    },

    /// A multi-answer key is an empty array.
    #[error("question {question} has an empty answer key")]
    EmptyAnswerKey { question: usize },
}

impl LoadError {
    /// Returns `true` if the document never arrived, as opposed to arriving
    /// in a shape that cannot be used.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            LoadError::Network(_)
                | LoadError::Status { .. }
                | LoadError::NotFound(_)
                | LoadError::Timeout(_)
        )
    }
}

/// Errors returned when an action cannot be applied to a session.
///
/// None of these change session state; the caller can keep dispatching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session already terminated")]
    Terminated,

    #[error("{action} is not available in {mode} mode")]
    NotAvailableInMode {
        action: &'static str,
        mode: ExamMode,
    },

    #[error("option {option} does not exist ({option_count} options)")]
    OptionOutOfRange { option: usize, option_count: usize },

    #[error("question {index} does not exist ({total} questions)")]
    QuestionOutOfRange { index: usize, total: usize },

    #[error("no option selected")]
    NothingSelected,

    #[error("feedback is shown, acknowledge it first")]
    FeedbackPending,

    #[error("check the answer before moving on")]
    FeedbackRequired,
}
