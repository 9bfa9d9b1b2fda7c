//! Server-ready answer payloads for partial saves and final submits.

use serde::{Deserialize, Serialize};

use crate::answer_store::AnswerStore;
use crate::model::{Answer, OptionId, Question, QuestionId};

/// Kind-specific part of a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Single { option_id: OptionId },
    Multiple { option_ids: Vec<OptionId> },
    Text { content: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub question_id: QuestionId,
    #[serde(flatten)]
    pub value: PayloadValue,
}

impl AnswerPayload {
    /// `None` for a single-choice answer without a selection.
    #[must_use]
    pub fn from_answer(question_id: QuestionId, answer: &Answer) -> Option<Self> {
        let value = match answer {
            Answer::Text { content } => PayloadValue::Text {
                content: content.clone(),
            },
            Answer::Single { selected_option } => PayloadValue::Single {
                option_id: (*selected_option)?,
            },
            Answer::Multiple { selected_options } => PayloadValue::Multiple {
                option_ids: selected_options.clone(),
            },
        };
        Some(Self { question_id, value })
    }
}

/// Format the store's answers in question order.
///
/// Questions without a stored answer are omitted, as are stored answers for ids
/// outside `questions`.
#[must_use]
pub fn format_answers(store: &AnswerStore, questions: &[Question]) -> Vec<AnswerPayload> {
    questions
        .iter()
        .filter_map(|question| {
            let answer = store.get_answer(question.id())?;
            AnswerPayload::from_answer(question.id(), answer)
        })
        .collect()
}

/// Body of a partial save. Never carries a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSaveRequest {
    pub answers: Vec<AnswerPayload>,
}

/// Body of a final submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub answers: Vec<AnswerPayload>,
    pub completed: bool,
}

impl SubmitRequest {
    #[must_use]
    pub fn completed(answers: Vec<AnswerPayload>) -> Self {
        Self {
            answers,
            completed: true,
        }
    }
}
