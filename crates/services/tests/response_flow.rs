use std::sync::Arc;

use api::{FailPoint, InMemorySurveyApi};
use serde_json::json;
use services::{Clock, ResponseError, ResponseLoopService, ResumeOutcome, SaveOutcome};
use survey_core::model::{
    Answer, InstanceId, InstanceState, InstanceSurvey, OptionId, Participation, ParticipationState,
    Question, QuestionId, QuestionKind, QuestionOption, StoredAnswer, StoredQuestionRef,
    SurveyId, SurveyInstance, UserStatus,
};
use survey_core::time::fixed_now;

const SURVEY: SurveyId = SurveyId::new(9);
const INSTANCE: InstanceId = InstanceId::new(42);

fn instance(state: InstanceState) -> SurveyInstance {
    SurveyInstance {
        id: INSTANCE,
        title: "Onboarding feedback".into(),
        description: "Two minutes, promise.".into(),
        state,
        creation_date: None,
        closure_date: None,
    }
}

fn two_question_survey() -> InstanceSurvey {
    InstanceSurvey {
        instance: instance(InstanceState::Open),
        questions: vec![
            Question::text(QuestionId::new(1), "How was your first week?"),
            Question::new(
                QuestionId::new(2),
                "Would you recommend us?",
                QuestionKind::Single,
                vec![
                    QuestionOption::new(OptionId::new(10), "Yes"),
                    QuestionOption::new(OptionId::new(11), "No"),
                ],
            )
            .unwrap(),
        ],
        user_status: UserStatus::default(),
    }
}

fn five_text_questions() -> InstanceSurvey {
    InstanceSurvey {
        instance: instance(InstanceState::Open),
        questions: (1..=5)
            .map(|id| Question::text(QuestionId::new(id), format!("Question {id}")))
            .collect(),
        user_status: UserStatus::default(),
    }
}

fn stored_text(id: u64) -> StoredAnswer {
    StoredAnswer {
        question: StoredQuestionRef {
            id: QuestionId::new(id),
            kind: "text".into(),
        },
        content: Some(format!("answer {id}")),
        selected_options: Vec::new(),
    }
}

fn service(api: &InMemorySurveyApi) -> ResponseLoopService {
    ResponseLoopService::new(Clock::fixed(fixed_now()), Arc::new(api.clone()))
}

#[tokio::test]
async fn answering_and_submitting_sends_expected_payload() {
    let api = InMemorySurveyApi::new();
    api.insert_survey(SURVEY, two_question_survey()).unwrap();
    let svc = service(&api);

    let (mut session, resumed) = svc.open(INSTANCE).await.unwrap();
    assert_eq!(resumed, ResumeOutcome::NoPrior);

    session.set_text(QuestionId::new(1), "ok").unwrap();
    let step = svc.go_next(&mut session).await;
    assert!(step.save_error.is_none());
    assert!(session.is_last_step());

    session
        .select_option(QuestionId::new(2), OptionId::new(10))
        .unwrap();
    let participation_id = svc.submit(&mut session).await.unwrap();

    let submits = api.submits().unwrap();
    assert_eq!(submits.len(), 1);
    assert_eq!(
        serde_json::to_value(&submits[0].1).unwrap(),
        json!({
            "answers": [
                {"question_id": 1, "content": "ok"},
                {"question_id": 2, "option_id": 10},
            ],
            "completed": true,
        })
    );
    assert_eq!(session.participation_id(), Some(participation_id));
    assert!(session.is_completed());

    let saves = api.saves().unwrap();
    assert_eq!(saves.len(), 1);
    assert_eq!(
        serde_json::to_value(&saves[0].1).unwrap(),
        json!({"answers": [{"question_id": 1, "content": "ok"}]})
    );
}

#[tokio::test]
async fn in_progress_participation_resumes_after_last_answer() {
    let api = InMemorySurveyApi::new();
    api.insert_survey(SURVEY, five_text_questions()).unwrap();
    api.insert_participation(
        INSTANCE,
        Participation {
            state: Some(ParticipationState::InProgress),
            answers: (1..=3).map(stored_text).collect(),
            ..Participation::default()
        },
    )
    .unwrap();

    let (session, resumed) = service(&api).open(INSTANCE).await.unwrap();
    assert!(matches!(
        resumed,
        ResumeOutcome::Restored {
            answers: 3,
            step: 3,
            completed: false,
            ..
        }
    ));
    assert_eq!(session.current_step(), 3);
    assert_eq!(
        session.answer_for(QuestionId::new(2)),
        Some(&Answer::text("answer 2"))
    );
    assert!(!session.has_unsaved_changes());
    assert_eq!(session.progress().answered, 3);
}

#[tokio::test]
async fn completed_participation_is_refused_on_load() {
    let api = InMemorySurveyApi::new();
    api.insert_survey(SURVEY, five_text_questions()).unwrap();
    api.insert_participation(
        INSTANCE,
        Participation {
            state: Some(ParticipationState::Completed),
            completed: true,
            answers: (1..=3).map(stored_text).collect(),
            ..Participation::default()
        },
    )
    .unwrap();

    let err = service(&api).open(INSTANCE).await.unwrap_err();
    assert!(matches!(err, ResponseError::AlreadyCompleted));
}

#[tokio::test]
async fn completed_participation_that_may_still_be_viewed_opens_read_only() {
    let api = InMemorySurveyApi::new();
    let mut survey = five_text_questions();
    api.insert_survey(SURVEY, survey.clone()).unwrap();
    let participation_id = api
        .insert_participation(
            INSTANCE,
            Participation {
                state: Some(ParticipationState::Completed),
                completed: true,
                answers: (1..=3).map(stored_text).collect(),
                ..Participation::default()
            },
        )
        .unwrap();
    survey.user_status.participation_id = Some(participation_id);
    survey.user_status.participation_state = Some(ParticipationState::Completed);
    api.insert_survey(SURVEY, survey).unwrap();

    let svc = service(&api);
    let (mut session, resumed) = svc.open(INSTANCE).await.unwrap();
    assert!(matches!(
        resumed,
        ResumeOutcome::Restored {
            step: 2,
            completed: true,
            ..
        }
    ));
    assert!(session.is_completed());
    assert_eq!(
        svc.save_partial(&mut session).await.unwrap(),
        SaveOutcome::Skipped
    );
    assert!(api.saves().unwrap().is_empty());
}

#[tokio::test]
async fn failed_participation_fetch_starts_fresh() {
    let api = InMemorySurveyApi::new();
    api.insert_survey(SURVEY, five_text_questions()).unwrap();
    api.insert_participation(
        INSTANCE,
        Participation {
            state: Some(ParticipationState::InProgress),
            answers: vec![stored_text(1)],
            ..Participation::default()
        },
    )
    .unwrap();
    api.fail(FailPoint::Participation).unwrap();

    let (session, resumed) = service(&api).open(INSTANCE).await.unwrap();
    assert_eq!(resumed, ResumeOutcome::NoPrior);
    assert_eq!(session.current_step(), 0);
    assert!(session.answers().is_empty());
}

#[tokio::test]
async fn closed_instance_is_refused() {
    let api = InMemorySurveyApi::new();
    let mut survey = two_question_survey();
    survey.instance = instance(InstanceState::Closed);
    api.insert_survey(SURVEY, survey).unwrap();

    let err = service(&api).open(INSTANCE).await.unwrap_err();
    assert!(matches!(err, ResponseError::NotOpen));
}

#[tokio::test]
async fn submit_is_only_allowed_from_last_step() {
    let api = InMemorySurveyApi::new();
    api.insert_survey(SURVEY, two_question_survey()).unwrap();
    let svc = service(&api);
    let (mut session, _) = svc.open(INSTANCE).await.unwrap();
    session.set_text(QuestionId::new(1), "early").unwrap();

    let err = svc.submit(&mut session).await.unwrap_err();
    assert!(matches!(err, ResponseError::NotLastStep));
    assert!(api.submits().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_submit_stays_on_step_and_can_retry() {
    let api = InMemorySurveyApi::new();
    api.insert_survey(SURVEY, two_question_survey()).unwrap();
    let svc = service(&api);
    let (mut session, _) = svc.open(INSTANCE).await.unwrap();
    let _ = svc.go_to(&mut session, 1).await;

    let err = svc.submit(&mut session).await.unwrap_err();
    let message = err.api_error().and_then(|e| e.server_message());
    assert_eq!(message, Some("No answers provided"));
    assert_eq!(session.current_step(), 1);
    assert!(!session.is_submitting());

    session
        .select_option(QuestionId::new(2), OptionId::new(11))
        .unwrap();
    svc.submit(&mut session).await.unwrap();

    let stats = svc.stats(SURVEY, INSTANCE).await.unwrap();
    assert_eq!(stats.completed_participations, 1);
    assert_eq!(stats.total_questions, 2);
}

#[tokio::test]
async fn navigation_is_noop_at_bounds_but_still_saves() {
    let api = InMemorySurveyApi::new();
    api.insert_survey(SURVEY, two_question_survey()).unwrap();
    let svc = service(&api);
    let (mut session, _) = svc.open(INSTANCE).await.unwrap();

    let step = svc.go_previous(&mut session).await;
    assert!(!step.moved);
    assert_eq!(step.step, 0);

    let _ = svc.go_next(&mut session).await;
    let step = svc.go_next(&mut session).await;
    assert!(!step.moved);
    assert_eq!(step.step, 1);

    let step = svc.go_to(&mut session, 9).await;
    assert!(!step.moved);
    assert_eq!(api.saves().unwrap().len(), 4);
}
