use serde::Deserialize;
use survey_core::model::{Participation, ParticipationId, ParticipationState, StoredAnswer};

use crate::gateway::ApiError;

/// Wire shape of a participation.
///
/// The results endpoint nests id and state under `participation`, the save endpoint
/// returns them flat; both map onto `Participation`.
#[derive(Debug, Deserialize)]
pub(crate) struct ParticipationRecord {
    #[serde(default)]
    participation: Option<ParticipationHeader>,
    #[serde(default)]
    id: Option<ParticipationId>,
    #[serde(default)]
    state: Option<ParticipationState>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    answers: Vec<StoredAnswer>,
}

#[derive(Debug, Deserialize)]
struct ParticipationHeader {
    id: ParticipationId,
    #[serde(default)]
    state: Option<ParticipationState>,
}

impl From<ParticipationRecord> for Participation {
    fn from(record: ParticipationRecord) -> Self {
        let (header_id, header_state) = record
            .participation
            .map_or((None, None), |h| (Some(h.id), h.state));
        let state = header_state.or(record.state);
        Self {
            id: header_id.or(record.id),
            state,
            completed: record
                .completed
                .unwrap_or(state == Some(ParticipationState::Completed)),
            answers: record.answers,
        }
    }
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    /// Instance state, sent along with refusals for instances that are not open.
    #[serde(default)]
    state: Option<String>,
}

impl ErrorBody {
    pub(crate) fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Most specific human-readable message available.
    pub(crate) fn into_message(self) -> String {
        self.message
            .or(self.detail)
            .or(self.error)
            .unwrap_or_default()
    }
}

/// Classify a non-2xx response.
///
/// A 403 naming the instance `state` is a closed instance, not a transport failure.
pub(crate) fn status_error(status: u16, body: &[u8]) -> ApiError {
    if status == 404 {
        return ApiError::NotFound;
    }
    let mut body = ErrorBody::parse(body);
    match body.state.take() {
        Some(state) if status == 403 => ApiError::Closed {
            state,
            message: body.into_message(),
        },
        _ => ApiError::Status {
            status,
            message: body.into_message(),
        },
    }
}
