use std::collections::HashMap;

use crate::model::{Answer, Question, QuestionId};

/// Aggregated view of form progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormProgress {
    pub answered: usize,
    pub total: usize,
}

impl FormProgress {
    /// Percentage of answered questions; `0.0` for an empty question list.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.answered as f64 / self.total as f64 * 100.0
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.answered == self.total
    }
}

/// Per-question in-progress answers of one participant.
///
/// No shape validation happens here; callers that know the question list check
/// answer kinds before storing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    answers: HashMap<QuestionId, Answer>,
    dirty: bool,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored answer for `question_id` and mark the store dirty.
    pub fn set_answer(&mut self, question_id: QuestionId, answer: Answer) {
        self.answers.insert(question_id, answer);
        self.dirty = true;
    }

    #[must_use]
    pub fn get_answer(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    #[must_use]
    pub fn is_answered(&self, question: &Question) -> bool {
        self.get_answer(question.id()).is_some_and(Answer::is_answered)
    }

    #[must_use]
    pub fn progress(&self, questions: &[Question]) -> FormProgress {
        FormProgress {
            answered: questions.iter().filter(|q| self.is_answered(q)).count(),
            total: questions.len(),
        }
    }

    /// `answered / total * 100` over the given questions.
    #[must_use]
    pub fn compute_progress(&self, questions: &[Question]) -> f64 {
        self.progress(questions).percent()
    }

    /// Clear all answers and the dirty flag.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.dirty = false;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
