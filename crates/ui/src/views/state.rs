use dioxus::prelude::*;

use api::ApiError;
use services::ResponseError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Load,
    NotFound,
    NotOpen,
    AlreadyCompleted,
    CannotParticipate,
    NoQuestions,
    InvalidAnswer,
    Save,
    Submit,
    Stats,
    Listing,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn from_response(err: &ResponseError) -> Self {
        match err {
            ResponseError::Load(ApiError::NotFound) => ViewError::NotFound,
            ResponseError::Load(_) => ViewError::Load,
            ResponseError::NotOpen => ViewError::NotOpen,
            ResponseError::AlreadyCompleted => ViewError::AlreadyCompleted,
            ResponseError::CannotParticipate => ViewError::CannotParticipate,
            ResponseError::NoQuestions => ViewError::NoQuestions,
            ResponseError::UnknownQuestion(_)
            | ResponseError::UnknownOption { .. }
            | ResponseError::AnswerKind(_) => ViewError::InvalidAnswer,
            ResponseError::Save(_) => ViewError::Save,
            ResponseError::NotLastStep
            | ResponseError::SubmitInProgress
            | ResponseError::Submit(_) => ViewError::Submit,
            ResponseError::Stats(_) => ViewError::Stats,
            ResponseError::Listing(_) => ViewError::Listing,
            _ => ViewError::Unknown,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Load => "We couldn't load this survey. Please try again.",
            ViewError::NotFound => "This survey does not exist.",
            ViewError::NotOpen => "This survey is not open for answers.",
            ViewError::AlreadyCompleted => "You have already completed this survey.",
            ViewError::CannotParticipate => "You cannot take part in this survey.",
            ViewError::NoQuestions => "This survey has no questions yet.",
            ViewError::InvalidAnswer => "That answer does not fit this question.",
            ViewError::Save => "Your answers could not be saved. We'll try again on the next step.",
            ViewError::Submit => "Your answers could not be submitted. Please try again.",
            ViewError::Stats => "Results are not available right now.",
            ViewError::Listing => "We couldn't load the open surveys. Please try again.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }

    /// Load refusals that retrying will not fix.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(
            self,
            ViewError::NotFound
                | ViewError::NotOpen
                | ViewError::AlreadyCompleted
                | ViewError::CannotParticipate
                | ViewError::NoQuestions
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
