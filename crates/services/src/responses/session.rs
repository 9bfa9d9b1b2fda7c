use chrono::{DateTime, Utc};
use tracing::debug;

use api::{ApiError, SubmitReceipt};
use survey_core::model::{
    Answer, InstanceId, InstanceSurvey, OptionId, Participation, ParticipationId,
    ParticipationState, Question, QuestionId, QuestionKind, SurveyInstance, UserStatus,
};
use survey_core::{
    AnswerStore, FormProgress, PartialSaveRequest, StepNavigator, SubmitRequest, format_answers,
};

use super::resume::{ResumeOutcome, plan_resume};
use super::save_gate::{SaveGate, SaveTicket};
use crate::error::ResponseError;

/// A partial save taken from a session, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    ticket: SaveTicket,
    instance_id: InstanceId,
    request: PartialSaveRequest,
}

impl PendingSave {
    #[must_use]
    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    #[must_use]
    pub fn request(&self) -> &PartialSaveRequest {
        &self.request
    }
}

/// In-memory answering state for one participant and one survey instance.
///
/// Owns the answer store and the navigator; network calls live in
/// `ResponseLoopService`, which feeds their results back through the `finish_*` methods.
#[derive(Debug, Clone)]
pub struct ResponseSession {
    instance: SurveyInstance,
    questions: Vec<Question>,
    user_status: UserStatus,
    answers: AnswerStore,
    navigator: StepNavigator,
    participation_id: Option<ParticipationId>,
    completed: bool,
    saves: SaveGate,
    revision: u64,
    submitting: bool,
    last_saved_at: Option<DateTime<Utc>>,
}

impl ResponseSession {
    /// Build a session from a freshly loaded instance.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::NotOpen` for instances that are not open,
    /// `ResponseError::AlreadyCompleted` or `ResponseError::CannotParticipate` when the
    /// participant may not answer, and `ResponseError::NoQuestions` for an empty survey.
    pub fn new(survey: InstanceSurvey) -> Result<Self, ResponseError> {
        let InstanceSurvey {
            instance,
            questions,
            user_status,
        } = survey;

        if !instance.is_open() {
            return Err(ResponseError::NotOpen);
        }
        if !user_status.can_participate {
            return Err(
                if user_status.participation_state == Some(ParticipationState::Completed) {
                    ResponseError::AlreadyCompleted
                } else {
                    ResponseError::CannotParticipate
                },
            );
        }
        if questions.is_empty() {
            return Err(ResponseError::NoQuestions);
        }

        Ok(Self {
            navigator: StepNavigator::new(questions.len()),
            participation_id: user_status.participation_id,
            instance,
            questions,
            user_status,
            answers: AnswerStore::new(),
            completed: false,
            saves: SaveGate::default(),
            revision: 0,
            submitting: false,
            last_saved_at: None,
        })
    }

    // ─── ACCESSORS ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn instance(&self) -> &SurveyInstance {
        &self.instance
    }

    #[must_use]
    pub fn instance_id(&self) -> InstanceId {
        self.instance.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn user_status(&self) -> &UserStatus {
        &self.user_status
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    #[must_use]
    pub fn current_step(&self) -> usize {
        self.navigator.current_step()
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.navigator.total_steps()
    }

    #[must_use]
    pub fn is_first_step(&self) -> bool {
        self.navigator.is_first_step()
    }

    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.navigator.is_last_step()
    }

    /// The question under the navigator. Sessions always hold at least one question.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.navigator.current_step())
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get_answer(question_id)
    }

    #[must_use]
    pub fn progress(&self) -> FormProgress {
        self.answers.progress(&self.questions)
    }

    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.answers.compute_progress(&self.questions)
    }

    /// Whether the question at `index` has an answer counting towards progress.
    #[must_use]
    pub fn is_question_answered(&self, index: usize) -> bool {
        self.questions
            .get(index)
            .is_some_and(|question| self.answers.is_answered(question))
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.answers.is_dirty()
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saves.is_saving()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Completed sessions are read-only: answers are frozen and no saves are made.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn participation_id(&self) -> Option<ParticipationId> {
        self.participation_id
    }

    #[must_use]
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    // ─── ANSWERS ───────────────────────────────────────────────────────────────

    /// Record an answer after checking it fits its question.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::AlreadyCompleted` for completed sessions,
    /// `ResponseError::UnknownQuestion` / `ResponseError::UnknownOption` for ids outside
    /// the survey, and `ResponseError::AnswerKind` when the variant does not match.
    pub fn set_answer(
        &mut self,
        question_id: QuestionId,
        answer: Answer,
    ) -> Result<(), ResponseError> {
        if self.completed {
            return Err(ResponseError::AlreadyCompleted);
        }
        let question = self.question(question_id)?;
        answer.check_kind(question)?;

        let selected: &[OptionId] = match &answer {
            Answer::Text { .. } => &[],
            Answer::Single { selected_option } => selected_option.as_slice(),
            Answer::Multiple { selected_options } => selected_options,
        };
        if let Some(option) = selected.iter().find(|id| !question.has_option(**id)) {
            return Err(ResponseError::UnknownOption {
                question: question_id,
                option: *option,
            });
        }

        self.answers.set_answer(question_id, answer);
        self.revision += 1;
        Ok(())
    }

    /// # Errors
    ///
    /// See `set_answer`.
    pub fn set_text(
        &mut self,
        question_id: QuestionId,
        content: impl Into<String>,
    ) -> Result<(), ResponseError> {
        self.set_answer(question_id, Answer::text(content))
    }

    /// # Errors
    ///
    /// See `set_answer`.
    pub fn select_option(
        &mut self,
        question_id: QuestionId,
        option: OptionId,
    ) -> Result<(), ResponseError> {
        self.set_answer(question_id, Answer::single(option))
    }

    /// Add or remove an option of a multiple-choice answer.
    ///
    /// # Errors
    ///
    /// See `set_answer`.
    pub fn toggle_option(
        &mut self,
        question_id: QuestionId,
        option: OptionId,
    ) -> Result<(), ResponseError> {
        let current = match self.answers.get_answer(question_id) {
            Some(answer @ Answer::Multiple { .. }) => answer.clone(),
            _ => Answer::empty(QuestionKind::Multiple),
        };
        self.set_answer(question_id, current.toggled(option))
    }

    fn question(&self, question_id: QuestionId) -> Result<&Question, ResponseError> {
        self.questions
            .iter()
            .find(|q| q.id() == question_id)
            .ok_or(ResponseError::UnknownQuestion(question_id))
    }

    // ─── NAVIGATION ────────────────────────────────────────────────────────────

    pub fn next(&mut self) -> bool {
        self.navigator.next()
    }

    pub fn previous(&mut self) -> bool {
        self.navigator.previous()
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.navigator.jump_to(index)
    }

    // ─── SAVES ─────────────────────────────────────────────────────────────────

    /// Take a snapshot for a partial save.
    ///
    /// Returns `None` for completed sessions, or when a save is already in flight; in that
    /// case one follow-up is handed out by `finish_save`.
    pub fn begin_save(&mut self) -> Option<PendingSave> {
        if self.completed {
            return None;
        }
        let ticket = self.saves.begin(self.revision)?;
        Some(self.pending(ticket))
    }

    fn pending(&self, ticket: SaveTicket) -> PendingSave {
        PendingSave {
            ticket,
            instance_id: self.instance.id,
            request: PartialSaveRequest {
                answers: format_answers(&self.answers, &self.questions),
            },
        }
    }

    /// Apply the result of a partial save.
    ///
    /// On success returns the queued follow-up save, if one was requested meanwhile.
    /// The store is marked clean only when no edit happened after the snapshot was taken.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Save` when the save failed; answers stay unsaved.
    pub fn finish_save(
        &mut self,
        pending: &PendingSave,
        result: Result<Participation, ApiError>,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingSave>, ResponseError> {
        let succeeded = result.is_ok();
        let follow_up = self.saves.finish(pending.ticket, succeeded);
        if self.completed {
            debug!("ignoring partial save result for completed session");
            return Ok(None);
        }

        let participation = result.map_err(ResponseError::Save)?;
        if let Some(id) = participation.id {
            self.participation_id = Some(id);
        }
        self.last_saved_at = Some(now);
        if pending.ticket.revision() == self.revision {
            self.answers.mark_clean();
        }

        if !follow_up {
            return Ok(None);
        }
        Ok(self.begin_save())
    }

    // ─── SUBMIT ────────────────────────────────────────────────────────────────

    /// Build the final submit request and mark the session as submitting.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::AlreadyCompleted`, `ResponseError::NotLastStep` or
    /// `ResponseError::SubmitInProgress` when submitting is not allowed right now.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, ResponseError> {
        if self.completed {
            return Err(ResponseError::AlreadyCompleted);
        }
        if !self.navigator.is_last_step() {
            return Err(ResponseError::NotLastStep);
        }
        if self.submitting {
            return Err(ResponseError::SubmitInProgress);
        }
        self.submitting = true;
        Ok(SubmitRequest::completed(format_answers(
            &self.answers,
            &self.questions,
        )))
    }

    /// # Errors
    ///
    /// Returns `ResponseError::Submit` when the server refused the answers; the session
    /// stays on the current step so the participant can retry.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmitReceipt, ApiError>,
    ) -> Result<ParticipationId, ResponseError> {
        self.submitting = false;
        let receipt = result.map_err(ResponseError::Submit)?;
        self.completed = true;
        self.participation_id = Some(receipt.participation_id);
        self.user_status.participation_id = Some(receipt.participation_id);
        self.user_status.participation_state = Some(ParticipationState::Completed);
        self.answers.mark_clean();
        Ok(receipt.participation_id)
    }

    // ─── RESUME ────────────────────────────────────────────────────────────────

    /// Replay a stored participation into an untouched session.
    pub fn apply_resume(&mut self, participation: &Participation) -> ResumeOutcome {
        if !self.answers.is_empty() {
            return ResumeOutcome::Skipped;
        }

        let plan = plan_resume(&self.questions, participation);
        let restored = plan.answers.len();
        for (question_id, answer) in plan.answers {
            self.answers.set_answer(question_id, answer);
        }
        self.answers.mark_clean();
        self.navigator.jump_to(plan.step);
        if let Some(id) = participation.id {
            self.participation_id = Some(id);
        }
        self.completed = plan.completed;

        ResumeOutcome::Restored {
            answers: restored,
            skipped: plan.skipped,
            step: self.navigator.current_step(),
            completed: plan.completed,
        }
    }
}
