//! Error types for question-bank loading.
//!
//! Callers route `ResourceLoad` and `Validation` to a safe fallback view;
//! neither is fatal to the application.

use thiserror::Error;

use exam_core::model::QuestionError;

/// Reasons a question resource could not be retrieved.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResourceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("no resource registered for test {0:?}")]
    Missing(String),
}

/// Reasons a retrieved payload could not be turned into questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("payload is not a JSON array of question records: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by the question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("question resource unavailable: {0}")]
    ResourceLoad(#[from] ResourceError),

    #[error("invalid question payload: {0}")]
    Validation(#[from] ValidationError),

    #[error("no questions tagged {skill:?} in test {test_id:?}")]
    EmptyResult { test_id: String, skill: String },
}
