use std::sync::Arc;

use api::{ApiError, SubmitReceipt, SurveyApi};
use survey_core::{Clock, SubmitRequest};
use survey_core::model::{
    InstanceId, InstanceStats, InstanceSummary, Participation, ParticipationId, SurveyId,
};
use tracing::{debug, error, info, warn};

use super::resume::ResumeOutcome;
use super::session::{PendingSave, ResponseSession};
use crate::error::ResponseError;

/// What a partial-save request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Answers reached the server; `rounds` counts coalesced follow-ups plus the first save.
    Saved { rounds: usize },
    /// Another save is in flight; a single follow-up will carry the latest answers.
    Queued,
    /// Completed sessions are not saved.
    Skipped,
}

/// Result of a step transition.
#[derive(Debug)]
pub struct StepOutcome {
    pub moved: bool,
    pub step: usize,
    /// Set when the partial save preceding the move failed. The move still happens.
    pub save_error: Option<ResponseError>,
}

/// Orchestrates loading, resuming, saving and submitting against a `SurveyApi`.
#[derive(Clone)]
pub struct ResponseLoopService {
    clock: Clock,
    api: Arc<dyn SurveyApi>,
}

impl ResponseLoopService {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn SurveyApi>) -> Self {
        Self { clock, api }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Load an instance and start answering it.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::NotOpen` when the server refuses a closed instance,
    /// `ResponseError::Load` if the instance cannot be fetched, or the refusals of
    /// `ResponseSession::new`.
    pub async fn load(&self, instance_id: InstanceId) -> Result<ResponseSession, ResponseError> {
        let survey = match self.api.instance_survey(instance_id).await {
            Ok(survey) => survey,
            Err(ApiError::Closed { state, message }) => {
                info!(instance = %instance_id, %state, %message, "instance not open");
                return Err(ResponseError::NotOpen);
            }
            Err(err) => return Err(ResponseError::Load(err)),
        };
        debug!(
            instance = %instance_id,
            questions = survey.questions.len(),
            "loaded survey instance"
        );
        ResponseSession::new(survey)
    }

    /// Load an instance and restore any earlier participation.
    ///
    /// # Errors
    ///
    /// See `load`. Resume problems never fail the call.
    pub async fn open(
        &self,
        instance_id: InstanceId,
    ) -> Result<(ResponseSession, ResumeOutcome), ResponseError> {
        let mut session = self.load(instance_id).await?;
        let outcome = self.resume(&mut session).await;
        Ok((session, outcome))
    }

    /// Restore answers and position from the participant's earlier participation.
    pub async fn resume(&self, session: &mut ResponseSession) -> ResumeOutcome {
        if !session.answers().is_empty() {
            return ResumeOutcome::Skipped;
        }
        let Some(participation_id) = session.user_status().participation_id else {
            debug!(instance = %session.instance_id(), "no earlier participation to resume");
            return ResumeOutcome::NoPrior;
        };

        let participation = match self.api.participation(participation_id).await {
            Ok(participation) => participation,
            Err(err) => {
                warn!(
                    participation = %participation_id,
                    error = %err,
                    "could not fetch participation, starting fresh"
                );
                return ResumeOutcome::NoPrior;
            }
        };

        let outcome = session.apply_resume(&participation);
        if let ResumeOutcome::Restored {
            answers,
            skipped,
            step,
            completed,
        } = outcome
        {
            info!(
                participation = %participation_id,
                answers,
                skipped,
                step,
                completed,
                "resumed participation"
            );
        }
        outcome
    }

    /// Send one partial save without touching the session.
    ///
    /// Pair with `ResponseSession::finish_save` when the session cannot be borrowed across
    /// the request.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the request.
    pub async fn send_save(&self, pending: &PendingSave) -> Result<Participation, ApiError> {
        self.api
            .save_partial(pending.instance_id(), pending.request())
            .await
    }

    /// Persist in-progress answers, including any follow-up requested meanwhile.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Save` if a save fails; answers stay marked unsaved.
    pub async fn save_partial(
        &self,
        session: &mut ResponseSession,
    ) -> Result<SaveOutcome, ResponseError> {
        if session.is_completed() {
            return Ok(SaveOutcome::Skipped);
        }
        let Some(mut pending) = session.begin_save() else {
            return Ok(SaveOutcome::Queued);
        };

        let mut rounds = 0;
        loop {
            rounds += 1;
            let result = self.send_save(&pending).await;
            if let Err(err) = &result {
                warn!(instance = %pending.instance_id(), error = %err, "partial save failed");
            }
            match session.finish_save(&pending, result, self.clock.now())? {
                Some(next) => pending = next,
                None => break,
            }
        }

        info!(
            instance = %session.instance_id(),
            participation = ?session.participation_id(),
            rounds,
            "saved answers"
        );
        Ok(SaveOutcome::Saved { rounds })
    }

    /// Save, then advance one step.
    pub async fn go_next(&self, session: &mut ResponseSession) -> StepOutcome {
        let save_error = self.save_before_move(session).await;
        let moved = session.next();
        StepOutcome {
            moved,
            step: session.current_step(),
            save_error,
        }
    }

    /// Save, then go back one step.
    pub async fn go_previous(&self, session: &mut ResponseSession) -> StepOutcome {
        let save_error = self.save_before_move(session).await;
        let moved = session.previous();
        StepOutcome {
            moved,
            step: session.current_step(),
            save_error,
        }
    }

    /// Save, then jump to `index`. Out-of-range indices leave the step unchanged.
    pub async fn go_to(&self, session: &mut ResponseSession, index: usize) -> StepOutcome {
        let save_error = self.save_before_move(session).await;
        let moved = session.jump_to(index);
        StepOutcome {
            moved,
            step: session.current_step(),
            save_error,
        }
    }

    async fn save_before_move(&self, session: &mut ResponseSession) -> Option<ResponseError> {
        self.save_partial(session).await.err()
    }

    /// Send a final submit built by `ResponseSession::begin_submit`.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the request.
    pub async fn send_submit(
        &self,
        instance_id: InstanceId,
        request: &SubmitRequest,
    ) -> Result<SubmitReceipt, ApiError> {
        self.api.submit(instance_id, request).await
    }

    /// Submit the final answers from the last step.
    ///
    /// # Errors
    ///
    /// Returns the refusals of `ResponseSession::begin_submit`, or `ResponseError::Submit`
    /// if the server rejects the answers.
    pub async fn submit(
        &self,
        session: &mut ResponseSession,
    ) -> Result<ParticipationId, ResponseError> {
        let request = session.begin_submit()?;
        let instance_id = session.instance_id();
        let result = self.send_submit(instance_id, &request).await;
        match session.finish_submit(result) {
            Ok(participation_id) => {
                info!(
                    instance = %instance_id,
                    participation = %participation_id,
                    answers = request.answers.len(),
                    "submitted participation"
                );
                Ok(participation_id)
            }
            Err(err) => {
                error!(instance = %instance_id, error = ?err, "submit failed");
                Err(err)
            }
        }
    }

    /// Instances open for answers, in the order the server lists them.
    ///
    /// # Errors
    ///
    /// Returns `ResponseError::Listing` if the listing cannot be fetched.
    pub async fn open_instances(&self) -> Result<Vec<InstanceSummary>, ResponseError> {
        let listed = self
            .api
            .open_instances()
            .await
            .map_err(ResponseError::Listing)?;
        debug!(count = listed.len(), "listed open instances");
        Ok(listed)
    }

    /// # Errors
    ///
    /// Returns `ResponseError::Stats` if the statistics cannot be fetched.
    pub async fn stats(
        &self,
        survey_id: SurveyId,
        instance_id: InstanceId,
    ) -> Result<InstanceStats, ResponseError> {
        self.api
            .instance_stats(survey_id, instance_id)
            .await
            .map_err(ResponseError::Stats)
    }
}
