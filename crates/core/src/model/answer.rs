use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};
use crate::model::question::{Question, QuestionKind};

/// An answer whose variant does not fit the question it is meant for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("question {question} expects a {expected} answer, got {actual}")]
pub struct AnswerKindError {
    pub question: QuestionId,
    pub expected: QuestionKind,
    pub actual: QuestionKind,
}

/// A participant's in-progress answer to one question.
///
/// Each variant carries exactly the fields of its question kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text { content: String },
    Single { selected_option: Option<OptionId> },
    Multiple { selected_options: Vec<OptionId> },
}

impl Answer {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn single(option: OptionId) -> Self {
        Self::Single {
            selected_option: Some(option),
        }
    }

    #[must_use]
    pub fn multiple(options: impl IntoIterator<Item = OptionId>) -> Self {
        Self::Multiple {
            selected_options: options.into_iter().collect(),
        }
    }

    /// The empty answer of the given kind.
    #[must_use]
    pub fn empty(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::Text => Self::text(""),
            QuestionKind::Single => Self::Single {
                selected_option: None,
            },
            QuestionKind::Multiple => Self::Multiple {
                selected_options: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::Text { .. } => QuestionKind::Text,
            Answer::Single { .. } => QuestionKind::Single,
            Answer::Multiple { .. } => QuestionKind::Multiple,
        }
    }

    /// Whether the answer counts towards progress.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            Answer::Text { content } => !content.trim().is_empty(),
            Answer::Single { selected_option } => selected_option.is_some(),
            Answer::Multiple { selected_options } => !selected_options.is_empty(),
        }
    }

    #[must_use]
    pub fn is_selected(&self, option: OptionId) -> bool {
        match self {
            Answer::Text { .. } => false,
            Answer::Single { selected_option } => *selected_option == Some(option),
            Answer::Multiple { selected_options } => selected_options.contains(&option),
        }
    }

    /// Toggle an option of a multiple-choice answer, keeping selection order.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn toggled(mut self, option: OptionId) -> Self {
        if let Answer::Multiple { selected_options } = &mut self {
            if let Some(pos) = selected_options.iter().position(|id| *id == option) {
                selected_options.remove(pos);
            } else {
                selected_options.push(option);
            }
        }
        self
    }

    /// # Errors
    ///
    /// Returns `AnswerKindError` if the variant does not match the question kind.
    pub fn check_kind(&self, question: &Question) -> Result<(), AnswerKindError> {
        let actual = self.kind();
        if actual == question.kind() {
            Ok(())
        } else {
            Err(AnswerKindError {
                question: question.id(),
                expected: question.kind(),
                actual,
            })
        }
    }
}
