use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use survey_core::model::{
    InstanceId, InstanceStats, InstanceSummary, InstanceSurvey, Participation, ParticipationId,
    ParticipationState, Question, StoredAnswer, StoredOption, StoredQuestionRef, SurveyId,
    SurveySummary,
};
use survey_core::{AnswerPayload, PartialSaveRequest, PayloadValue, SubmitRequest};

use crate::gateway::{ApiError, SubmitReceipt, SurveyApi};

/// Endpoints of `InMemorySurveyApi` that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    OpenInstances,
    InstanceSurvey,
    Participation,
    SavePartial,
    Submit,
    Stats,
}

#[derive(Default)]
struct State {
    surveys: HashMap<InstanceId, InstanceSurvey>,
    survey_ids: HashMap<InstanceId, SurveyId>,
    participations: HashMap<ParticipationId, (InstanceId, Participation)>,
    saves: Vec<(InstanceId, PartialSaveRequest)>,
    submits: Vec<(InstanceId, SubmitRequest)>,
    failing: HashSet<FailPoint>,
    next_participation_id: u64,
}

/// In-memory survey backend for tests and prototyping.
///
/// Mirrors the server rules the answering flow relies on: only open instances accept
/// answers, each save replaces the stored answers, completed participations are final.
#[derive(Clone, Default)]
pub struct InMemorySurveyApi {
    state: Arc<Mutex<State>>,
}

impl InMemorySurveyApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Unavailable(e.to_string()))
    }

    fn check(state: &State, point: FailPoint) -> Result<(), ApiError> {
        if state.failing.contains(&point) {
            return Err(ApiError::Unavailable(format!("{point:?} failure injected")));
        }
        Ok(())
    }

    /// Register an instance of survey `survey_id`. Replaces any previous one with the
    /// same instance id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the state lock is poisoned.
    pub fn insert_survey(&self, survey_id: SurveyId, survey: InstanceSurvey) -> Result<(), ApiError> {
        let mut state = self.lock()?;
        state.survey_ids.insert(survey.instance.id, survey_id);
        state.surveys.insert(survey.instance.id, survey);
        Ok(())
    }

    /// Attach an existing participation to an instance's current participant.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the instance is unknown.
    pub fn insert_participation(
        &self,
        instance_id: InstanceId,
        mut participation: Participation,
    ) -> Result<ParticipationId, ApiError> {
        let mut state = self.lock()?;
        let id = match participation.id {
            Some(id) => id,
            None => {
                state.next_participation_id += 1;
                ParticipationId::new(state.next_participation_id)
            }
        };
        participation.id = Some(id);
        let survey = state.surveys.get_mut(&instance_id).ok_or(ApiError::NotFound)?;
        survey.user_status.participation_id = Some(id);
        survey.user_status.participation_state = participation.state;
        survey.user_status.can_participate = !participation.is_completed();
        state.participations.insert(id, (instance_id, participation));
        Ok(id)
    }

    /// Make every following call to `point` fail until `recover` is called.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the state lock is poisoned.
    pub fn fail(&self, point: FailPoint) -> Result<(), ApiError> {
        self.lock()?.failing.insert(point);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the state lock is poisoned.
    pub fn recover(&self, point: FailPoint) -> Result<(), ApiError> {
        self.lock()?.failing.remove(&point);
        Ok(())
    }

    /// Partial saves received so far, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the state lock is poisoned.
    pub fn saves(&self) -> Result<Vec<(InstanceId, PartialSaveRequest)>, ApiError> {
        Ok(self.lock()?.saves.clone())
    }

    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the state lock is poisoned.
    pub fn submits(&self) -> Result<Vec<(InstanceId, SubmitRequest)>, ApiError> {
        Ok(self.lock()?.submits.clone())
    }

    fn store_answers(
        state: &mut State,
        instance_id: InstanceId,
        answers: &[AnswerPayload],
        completed: bool,
    ) -> Result<Participation, ApiError> {
        let survey = state.surveys.get_mut(&instance_id).ok_or(ApiError::NotFound)?;
        if !survey.instance.is_open() {
            return Err(ApiError::Status {
                status: 403,
                message: "Survey not available".into(),
            });
        }

        let id = match survey.user_status.participation_id {
            Some(id) => id,
            None => {
                state.next_participation_id += 1;
                ParticipationId::new(state.next_participation_id)
            }
        };
        if state
            .participations
            .get(&id)
            .is_some_and(|(_, existing)| existing.is_completed())
        {
            return Err(ApiError::Status {
                status: 400,
                message: "Already completed".into(),
            });
        }

        let answers = answers
            .iter()
            .filter_map(|answer| stored_answer(&survey.questions, answer))
            .collect();
        let participation_state = if completed {
            ParticipationState::Completed
        } else {
            ParticipationState::InProgress
        };
        let participation = Participation {
            id: Some(id),
            state: Some(participation_state),
            completed,
            answers,
        };

        survey.user_status.participation_id = Some(id);
        survey.user_status.participation_state = Some(participation_state);
        survey.user_status.can_participate = !completed;
        state
            .participations
            .insert(id, (instance_id, participation.clone()));
        Ok(participation)
    }
}

/// Answers for questions outside the instance are dropped, like the server does.
fn stored_answer(questions: &[Question], answer: &AnswerPayload) -> Option<StoredAnswer> {
    let question = questions.iter().find(|q| q.id() == answer.question_id)?;
    let question_ref = StoredQuestionRef {
        id: question.id(),
        kind: question.kind().as_str().to_owned(),
    };
    let (content, selected_options) = match &answer.value {
        PayloadValue::Text { content } => (Some(content.clone()), Vec::new()),
        PayloadValue::Single { option_id } => (None, vec![StoredOption::Id(*option_id)]),
        PayloadValue::Multiple { option_ids } => (
            None,
            option_ids.iter().copied().map(StoredOption::Id).collect(),
        ),
    };
    Some(StoredAnswer {
        question: question_ref,
        content,
        selected_options,
    })
}

#[async_trait]
impl SurveyApi for InMemorySurveyApi {
    async fn open_instances(&self) -> Result<Vec<InstanceSummary>, ApiError> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::OpenInstances)?;
        let mut listed: Vec<InstanceSummary> = state
            .surveys
            .values()
            .filter(|survey| survey.instance.is_open())
            .filter_map(|survey| {
                let instance = &survey.instance;
                let survey_id = *state.survey_ids.get(&instance.id)?;
                Some(InstanceSummary {
                    id: instance.id,
                    survey: SurveySummary {
                        id: survey_id,
                        title: instance.title.clone(),
                        description: instance.description.clone(),
                    },
                    state: instance.state,
                    creation_date: instance.creation_date,
                    closure_date: instance.closure_date,
                    total_questions: u32::try_from(survey.questions.len()).unwrap_or(u32::MAX),
                })
            })
            .collect();
        listed.sort_by_key(|entry| entry.id);
        Ok(listed)
    }

    /// Non-open instances are refused with `ApiError::Closed`, as the server does.
    async fn instance_survey(&self, instance_id: InstanceId) -> Result<InstanceSurvey, ApiError> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::InstanceSurvey)?;
        let survey = state.surveys.get(&instance_id).ok_or(ApiError::NotFound)?;
        if !survey.instance.is_open() {
            return Err(ApiError::Closed {
                state: survey.instance.state.as_str().to_owned(),
                message: "Survey not available".into(),
            });
        }
        Ok(survey.clone())
    }

    async fn participation(&self, id: ParticipationId) -> Result<Participation, ApiError> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::Participation)?;
        state
            .participations
            .get(&id)
            .map(|(_, participation)| participation.clone())
            .ok_or(ApiError::NotFound)
    }

    async fn save_partial(
        &self,
        instance_id: InstanceId,
        request: &PartialSaveRequest,
    ) -> Result<Participation, ApiError> {
        let mut state = self.lock()?;
        Self::check(&state, FailPoint::SavePartial)?;
        state.saves.push((instance_id, request.clone()));
        Self::store_answers(&mut state, instance_id, &request.answers, false)
    }

    async fn submit(
        &self,
        instance_id: InstanceId,
        request: &SubmitRequest,
    ) -> Result<SubmitReceipt, ApiError> {
        let mut state = self.lock()?;
        Self::check(&state, FailPoint::Submit)?;
        state.submits.push((instance_id, request.clone()));
        if request.answers.is_empty() {
            return Err(ApiError::Status {
                status: 400,
                message: "No answers provided".into(),
            });
        }
        let participation =
            Self::store_answers(&mut state, instance_id, &request.answers, request.completed)?;
        let participation_id = participation.id.ok_or(ApiError::NotFound)?;
        Ok(SubmitReceipt {
            participation_id,
            message: Some("Answers saved".into()),
        })
    }

    async fn instance_stats(
        &self,
        survey_id: SurveyId,
        instance_id: InstanceId,
    ) -> Result<InstanceStats, ApiError> {
        let state = self.lock()?;
        Self::check(&state, FailPoint::Stats)?;
        if state.survey_ids.get(&instance_id) != Some(&survey_id) {
            return Err(ApiError::NotFound);
        }
        let survey = state.surveys.get(&instance_id).ok_or(ApiError::NotFound)?;
        let for_instance = || {
            state
                .participations
                .values()
                .filter(move |(instance, _)| *instance == instance_id)
        };
        let count = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        Ok(InstanceStats {
            total_participations: count(for_instance().count()),
            completed_participations: count(
                for_instance().filter(|(_, p)| p.is_completed()).count(),
            ),
            total_questions: count(survey.questions.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::model::{
        InstanceState, OptionId, QuestionId, QuestionKind, QuestionOption, SurveyInstance,
        UserStatus,
    };

    const SURVEY: SurveyId = SurveyId::new(3);

    fn survey(state: InstanceState) -> InstanceSurvey {
        InstanceSurvey {
            instance: SurveyInstance {
                id: InstanceId::new(1),
                title: "Lunch".into(),
                description: String::new(),
                state,
                creation_date: None,
                closure_date: None,
            },
            questions: vec![
                Question::text(QuestionId::new(1), "Where?"),
                Question::new(
                    QuestionId::new(2),
                    "When?",
                    QuestionKind::Single,
                    vec![
                        QuestionOption::new(OptionId::new(10), "12:00"),
                        QuestionOption::new(OptionId::new(11), "13:00"),
                    ],
                )
                .unwrap(),
            ],
            user_status: UserStatus::default(),
        }
    }

    fn answers() -> Vec<AnswerPayload> {
        vec![
            AnswerPayload {
                question_id: QuestionId::new(1),
                value: PayloadValue::Text {
                    content: "canteen".into(),
                },
            },
            AnswerPayload {
                question_id: QuestionId::new(99),
                value: PayloadValue::Text {
                    content: "stray".into(),
                },
            },
        ]
    }

    #[tokio::test]
    async fn save_creates_then_reuses_participation() {
        let api = InMemorySurveyApi::new();
        api.insert_survey(SURVEY, survey(InstanceState::Open)).unwrap();
        let request = PartialSaveRequest { answers: answers() };

        let first = api.save_partial(InstanceId::new(1), &request).await.unwrap();
        let second = api.save_partial(InstanceId::new(1), &request).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.answers.len(), 1, "stray answer dropped");
        assert!(!second.is_completed());

        let status = api.instance_survey(InstanceId::new(1)).await.unwrap().user_status;
        assert_eq!(status.participation_id, first.id);
        assert_eq!(api.saves().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn submit_completes_and_blocks_further_saves() {
        let api = InMemorySurveyApi::new();
        api.insert_survey(SURVEY, survey(InstanceState::Open)).unwrap();
        let receipt = api
            .submit(InstanceId::new(1), &SubmitRequest::completed(answers()))
            .await
            .unwrap();

        let stored = api.participation(receipt.participation_id).await.unwrap();
        assert!(stored.is_completed());

        let err = api
            .save_partial(InstanceId::new(1), &PartialSaveRequest { answers: answers() })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));

        let stats = api.instance_stats(SURVEY, InstanceId::new(1)).await.unwrap();
        assert_eq!(stats.completed_participations, 1);
        assert_eq!(stats.total_questions, 2);
    }

    #[tokio::test]
    async fn closed_instance_is_refused_and_not_listed() {
        let api = InMemorySurveyApi::new();
        api.insert_survey(SURVEY, survey(InstanceState::Closed)).unwrap();
        let err = api.instance_survey(InstanceId::new(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Closed { ref state, .. } if state == "closed"));
        assert!(api.open_instances().await.unwrap().is_empty());
        let err = api
            .submit(InstanceId::new(1), &SubmitRequest::completed(answers()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn empty_submit_is_rejected() {
        let api = InMemorySurveyApi::new();
        api.insert_survey(SURVEY, survey(InstanceState::Open)).unwrap();
        let err = api
            .submit(InstanceId::new(1), &SubmitRequest::completed(Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("No answers provided"));
    }

    #[tokio::test]
    async fn injected_failures_can_be_recovered() {
        let api = InMemorySurveyApi::new();
        api.insert_survey(SURVEY, survey(InstanceState::Open)).unwrap();
        api.fail(FailPoint::InstanceSurvey).unwrap();
        assert!(api.instance_survey(InstanceId::new(1)).await.is_err());
        api.recover(FailPoint::InstanceSurvey).unwrap();
        assert!(api.instance_survey(InstanceId::new(1)).await.is_ok());
    }

    #[tokio::test]
    async fn open_instances_carry_their_survey() {
        let api = InMemorySurveyApi::new();
        api.insert_survey(SURVEY, survey(InstanceState::Open)).unwrap();
        let listed = api.open_instances().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].survey.id, SURVEY);
        assert_eq!(listed[0].survey.title, "Lunch");
        assert_eq!(listed[0].total_questions, 2);
    }

    #[tokio::test]
    async fn stats_require_the_matching_survey() {
        let api = InMemorySurveyApi::new();
        api.insert_survey(SURVEY, survey(InstanceState::Open)).unwrap();
        let err = api
            .instance_stats(SurveyId::new(99), InstanceId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn missing_instance_is_not_found() {
        let api = InMemorySurveyApi::new();
        let err = api.instance_survey(InstanceId::new(404)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
