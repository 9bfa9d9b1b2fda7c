use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// A question kind string that is not one of the supported kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown question kind: {0}")]
pub struct UnknownQuestionKind(pub String);

/// Errors raised while building a question from server data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownQuestionKind),
    #[error("question {question} lists option {option} twice")]
    DuplicateOption { question: QuestionId, option: OptionId },
}

//
// ─── QUESTION KIND ────────────────────────────────────────────────────────────
//

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text.
    Text,
    /// Exactly one option (or none yet).
    Single,
    /// Any subset of the options.
    Multiple,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Single => "single",
            QuestionKind::Multiple => "multiple",
        }
    }

    #[must_use]
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionKind::Single | QuestionKind::Multiple)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = UnknownQuestionKind;

    /// Accepts the canonical names plus the legacy names the backend still emits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" | "open" | "textarea" => Ok(Self::Text),
            "single" | "single_choice" => Ok(Self::Single),
            "multiple" | "multiple_choice" => Ok(Self::Multiple),
            other => Err(UnknownQuestionKind(other.to_owned())),
        }
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    #[serde(alias = "text")]
    pub content: String,
}

impl QuestionOption {
    #[must_use]
    pub fn new(id: OptionId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

/// A question as loaded from a survey instance. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    content: String,
    kind: QuestionKind,
    options: Vec<QuestionOption>,
}

impl Question {
    /// Build a question, checking the option list against the kind.
    ///
    /// Options given to a text question are dropped. A choice question may come
    /// without options; it is shown with nothing to pick.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::DuplicateOption` when an option id repeats.
    pub fn new(
        id: QuestionId,
        content: impl Into<String>,
        kind: QuestionKind,
        mut options: Vec<QuestionOption>,
    ) -> Result<Self, QuestionError> {
        if kind.is_choice() {
            for (idx, option) in options.iter().enumerate() {
                if options[..idx].iter().any(|prev| prev.id == option.id) {
                    return Err(QuestionError::DuplicateOption {
                        question: id,
                        option: option.id,
                    });
                }
            }
        } else {
            options.clear();
        }

        Ok(Self {
            id,
            content: content.into(),
            kind,
            options,
        })
    }

    /// Shorthand for a free-text question.
    #[must_use]
    pub fn text(id: QuestionId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            kind: QuestionKind::Text,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: OptionId) -> bool {
        self.options.iter().any(|o| o.id == option)
    }
}

/// Wire shape of a question; `type` is kept as a string so legacy names resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionRecord {
    id: QuestionId,
    #[serde(alias = "text")]
    content: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Vec<QuestionOption>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let kind = record.kind.parse::<QuestionKind>()?;
        Question::new(record.id, record.content, kind, record.options)
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            content: question.content,
            kind: question.kind.as_str().to_owned(),
            options: question.options,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
