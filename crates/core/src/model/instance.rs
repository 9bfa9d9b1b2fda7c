use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{InstanceId, ParticipationId, SurveyId};
use crate::model::participation::ParticipationState;
use crate::model::question::Question;

/// Lifecycle of a survey instance. Only `Open` instances accept answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Draft,
    Open,
    Closed,
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceState::Draft => "draft",
            InstanceState::Open => "open",
            InstanceState::Closed => "closed",
            InstanceState::Unknown => "unknown",
        }
    }
}

/// A scheduled, time-bounded run of a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyInstance {
    pub id: InstanceId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub state: InstanceState,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closure_date: Option<DateTime<Utc>>,
}

impl SurveyInstance {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == InstanceState::Open
    }
}

/// What the server knows about the current participant and this instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatus {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default = "can_participate_default")]
    pub can_participate: bool,
    #[serde(default)]
    pub participation_state: Option<ParticipationState>,
    #[serde(default)]
    pub participation_id: Option<ParticipationId>,
}

fn can_participate_default() -> bool {
    true
}

impl Default for UserStatus {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            can_participate: true,
            participation_state: None,
            participation_id: None,
        }
    }
}

/// An instance together with its ordered questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSurvey {
    pub instance: SurveyInstance,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub user_status: UserStatus,
}

/// The survey an instance runs, as embedded in instance listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySummary {
    pub id: SurveyId,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// One entry of the public listing of instances open for answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub id: InstanceId,
    pub survey: SurveySummary,
    pub state: InstanceState,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closure_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_questions: u32,
}

impl InstanceSummary {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == InstanceState::Open
    }
}

/// Participation counters for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstanceStats {
    #[serde(default)]
    pub total_participations: u32,
    #[serde(default)]
    pub completed_participations: u32,
    #[serde(default)]
    pub total_questions: u32,
}

impl InstanceStats {
    /// Share of participations that were completed, in percent.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        if self.total_participations == 0 {
            return 0.0;
        }
        f64::from(self.completed_participations) / f64::from(self.total_participations) * 100.0
    }
}
