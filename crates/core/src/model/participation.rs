use serde::{Deserialize, Serialize};

use crate::model::answer::Answer;
use crate::model::ids::{OptionId, ParticipationId, QuestionId};
use crate::model::question::{QuestionKind, UnknownQuestionKind};

/// Server-side lifecycle of a participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationState {
    InProgress,
    Completed,
    Abandoned,
}

/// Reference to the question a stored answer belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuestionRef {
    pub id: QuestionId,
    /// Raw kind string; resolved lazily so one bad answer does not spoil the rest.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A selected option as stored by the server: a bare id or an expanded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredOption {
    Id(OptionId),
    Detailed {
        id: OptionId,
        #[serde(default)]
        content: Option<String>,
    },
}

impl StoredOption {
    #[must_use]
    pub fn id(&self) -> OptionId {
        match self {
            StoredOption::Id(id) | StoredOption::Detailed { id, .. } => *id,
        }
    }
}

/// An answer previously persisted in a participation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub question: StoredQuestionRef,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub selected_options: Vec<StoredOption>,
}

impl StoredAnswer {
    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question.id
    }

    /// Translate into the answer-store shape of its question kind.
    ///
    /// Text takes `content`, single takes the first stored option, multiple takes all
    /// stored options.
    ///
    /// # Errors
    ///
    /// Returns `UnknownQuestionKind` when the stored kind is not recognised.
    pub fn to_answer(&self) -> Result<Answer, UnknownQuestionKind> {
        let kind = self.question.kind.parse::<QuestionKind>()?;
        Ok(match kind {
            QuestionKind::Text => Answer::text(self.content.clone().unwrap_or_default()),
            QuestionKind::Single => Answer::Single {
                selected_option: self.selected_options.first().map(StoredOption::id),
            },
            QuestionKind::Multiple => {
                Answer::multiple(self.selected_options.iter().map(StoredOption::id))
            }
        })
    }
}

/// A participant's record against one instance, as known to the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Participation {
    #[serde(default)]
    pub id: Option<ParticipationId>,
    #[serde(default)]
    pub state: Option<ParticipationState>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub answers: Vec<StoredAnswer>,
}

impl Participation {
    /// Completed either by flag or by state; the two are reported by different endpoints.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed || self.state == Some(ParticipationState::Completed)
    }
}
