use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use survey_core::model::{
    InstanceId, InstanceStats, InstanceSummary, InstanceSurvey, Participation, ParticipationId,
    SurveyId,
};
use survey_core::{PartialSaveRequest, SubmitRequest};
use thiserror::Error;

/// Errors surfaced by survey API adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    /// The instance exists but does not take answers in its current state.
    #[error("survey instance is {state}: {message}")]
    Closed { state: String, message: String },

    #[error("request rejected ({status}): {message}")]
    Status { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// Message fit for showing to a participant, when the server supplied one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } | ApiError::Closed { message, .. }
                if !message.is_empty() =>
            {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Answer of the submit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub participation_id: ParticipationId,
    #[serde(default)]
    pub message: Option<String>,
}

/// Contract of the remote survey API as used by the answering flow.
#[async_trait]
pub trait SurveyApi: Send + Sync {
    /// List the instances currently open to the public.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or decoding failures.
    async fn open_instances(&self) -> Result<Vec<InstanceSummary>, ApiError>;

    /// Fetch an instance with its ordered questions and the caller's status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the instance is missing, `ApiError::Closed` if it
    /// does not take answers, or other transport errors.
    async fn instance_survey(&self, instance_id: InstanceId) -> Result<InstanceSurvey, ApiError>;

    /// Fetch a participation with its stored answers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if missing, or other transport errors.
    async fn participation(&self, id: ParticipationId) -> Result<Participation, ApiError>;

    /// Persist in-progress answers without completing the participation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the save or is unreachable.
    async fn save_partial(
        &self,
        instance_id: InstanceId,
        request: &PartialSaveRequest,
    ) -> Result<Participation, ApiError>;

    /// Persist the final answers and complete the participation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the submit or is unreachable.
    async fn submit(
        &self,
        instance_id: InstanceId,
        request: &SubmitRequest,
    ) -> Result<SubmitReceipt, ApiError>;

    /// Fetch participation counters for an instance.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or lookup failures.
    async fn instance_stats(
        &self,
        survey_id: SurveyId,
        instance_id: InstanceId,
    ) -> Result<InstanceStats, ApiError>;
}
