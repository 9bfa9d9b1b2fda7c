//! Shared error types for the services crate.

use thiserror::Error;

use api::ApiError;
use survey_core::model::{AnswerKindError, OptionId, QuestionId};

/// Errors emitted by the response workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResponseError {
    #[error("failed to load survey instance")]
    Load(#[source] ApiError),
    #[error("survey has no questions")]
    NoQuestions,
    #[error("survey instance is not open")]
    NotOpen,
    #[error("participation already completed")]
    AlreadyCompleted,
    #[error("participant cannot take part in this survey")]
    CannotParticipate,
    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),
    #[error("option {option} does not belong to question {question}")]
    UnknownOption {
        question: QuestionId,
        option: OptionId,
    },
    #[error(transparent)]
    AnswerKind(#[from] AnswerKindError),
    #[error("submit is only available on the last step")]
    NotLastStep,
    #[error("a submit is already in progress")]
    SubmitInProgress,
    #[error("partial save failed")]
    Save(#[source] ApiError),
    #[error("submit failed")]
    Submit(#[source] ApiError),
    #[error("failed to load instance statistics")]
    Stats(#[source] ApiError),
    #[error("failed to list open survey instances")]
    Listing(#[source] ApiError),
}

impl ResponseError {
    /// The underlying API error, if any.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ResponseError::Load(e)
            | ResponseError::Save(e)
            | ResponseError::Submit(e)
            | ResponseError::Stats(e)
            | ResponseError::Listing(e) => Some(e),
            _ => None,
        }
    }
}
