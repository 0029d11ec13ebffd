//! Error types for learning-core.

use crate::types::CefrLevel;
use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the placement test, the scheduler and the bank loader.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No unused question at any level reachable from `level`.
    #[error("question bank exhausted (current level {level})")]
    EmptyBank { level: CefrLevel },

    #[error("placement test not complete after {answered} answers")]
    TestNotComplete { answered: usize },

    #[error("placement test already complete")]
    TestAlreadyComplete,

    #[error("question {id} was already answered")]
    QuestionAlreadyAnswered { id: String },

    #[error("question {id} is not in the bank")]
    UnknownQuestion { id: String },

    #[error("answer index {index} out of range for question {id} with {options} options")]
    AnswerOutOfRange {
        id: String,
        index: usize,
        options: usize,
    },

    #[error("invalid rating: {0}")]
    InvalidRating(String),

    #[error("duplicate question id {id}")]
    DuplicateQuestionId { id: String },

    #[error("question {id} has no options")]
    MissingOptions { id: String },

    #[error("question {id} marks option {index} correct but has {options} options")]
    CorrectAnswerOutOfRange {
        id: String,
        index: usize,
        options: usize,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Raised by storage collaborators.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
