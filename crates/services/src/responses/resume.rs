use survey_core::model::{Answer, Participation, Question, QuestionId};
use tracing::warn;

/// What resuming a participation will restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResumePlan {
    pub answers: Vec<(QuestionId, Answer)>,
    pub step: usize,
    pub completed: bool,
    pub skipped: usize,
}

/// Result of the resume step when a survey view is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// Answers already exist in the session; nothing was replayed.
    Skipped,
    /// No earlier participation to resume.
    NoPrior,
    Restored {
        answers: usize,
        skipped: usize,
        step: usize,
        completed: bool,
    },
}

/// Translate stored answers and pick the step to continue from.
///
/// Completed participations land on the highest answered question for review; in-progress
/// ones land one past it, clamped to the last question.
pub(crate) fn plan_resume(questions: &[Question], participation: &Participation) -> ResumePlan {
    let mut answers = Vec::with_capacity(participation.answers.len());
    let mut highest: Option<usize> = None;
    let mut skipped = 0;

    for stored in &participation.answers {
        let question_id = stored.question_id();
        let Some(index) = questions.iter().position(|q| q.id() == question_id) else {
            warn!(question = %question_id, "stored answer for unknown question, skipping");
            skipped += 1;
            continue;
        };
        let answer = match stored.to_answer() {
            Ok(answer) => answer,
            Err(err) => {
                warn!(question = %question_id, error = %err, "malformed stored answer, skipping");
                skipped += 1;
                continue;
            }
        };
        if let Err(err) = answer.check_kind(&questions[index]) {
            warn!(error = %err, "stored answer kind mismatch, skipping");
            skipped += 1;
            continue;
        }

        highest = Some(highest.map_or(index, |h| h.max(index)));
        answers.push((question_id, answer));
    }

    let completed = participation.is_completed();
    let last = questions.len().saturating_sub(1);
    let step = match highest {
        None => 0,
        Some(index) if completed => index,
        Some(index) => (index + 1).min(last),
    };

    ResumePlan {
        answers,
        step,
        completed,
        skipped,
    }
}
