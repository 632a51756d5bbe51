//! Shared error types for the services crate.

use thiserror::Error;

use bank::BankError;
use exam_core::model::AnswerSheetError;

/// Errors emitted by the exam session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no question bank loaded")]
    NotLoaded,

    #[error("exam already started")]
    AlreadyStarted,

    #[error("exam is not in progress")]
    NotInProgress,

    #[error("exam is not completed")]
    NotCompleted,

    #[error("shared session state poisoned")]
    Poisoned,

    #[error(transparent)]
    Answers(#[from] AnswerSheetError),

    #[error(transparent)]
    Bank(#[from] BankError),
}
