use dioxus::prelude::ReadableExt;
use api::{FailPoint, InMemorySurveyApi};
use survey_core::model::{
    InstanceState, OptionId, Participation, ParticipationState, QuestionId, StoredAnswer,
    StoredQuestionRef,
};

use super::test_harness::{
    TEST_INSTANCE, TEST_SURVEY, ViewKind, sample_survey, setup_view_harness,
};
use crate::vm::ResponseIntent;

fn api_with(state: InstanceState) -> InMemorySurveyApi {
    let api = InMemorySurveyApi::new();
    api.insert_survey(TEST_SURVEY, sample_survey(state)).expect("insert survey");
    api
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_open_surveys() {
    let mut harness = setup_view_harness(ViewKind::Home, api_with(InstanceState::Open));
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Open surveys"), "missing heading in {html}");
    assert!(html.contains("Team retro"), "missing listed survey in {html}");
    assert!(html.contains("2 questions"), "missing question count in {html}");
    assert!(html.contains("Answer"), "missing answer link in {html}");
    assert!(html.contains("Results"), "missing results link in {html}");
    assert!(
        html.contains("Continue survey #7"),
        "missing pinned shortcut in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_hides_closed_surveys() {
    let mut harness = setup_view_harness(ViewKind::Home, api_with(InstanceState::Closed));
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("No surveys are open right now."),
        "missing empty state in {html}"
    );
    assert!(!html.contains("Team retro"), "closed survey listed in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_listing_failure_offers_retry() {
    let api = api_with(InstanceState::Open);
    api.fail(FailPoint::OpenInstances).expect("fail");
    let mut harness = setup_view_harness(ViewKind::Home, api);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("load the open surveys"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn survey_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::Survey, api_with(InstanceState::Open));
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Team retro"), "missing title in {html}");
    assert!(html.contains("Question 1 of 2"), "missing step label in {html}");
    assert!(html.contains("What went well?"), "missing question in {html}");
    assert!(html.contains("0 of 2 answered"), "missing progress in {html}");
    assert!(html.contains("survey-next"), "missing next button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn survey_view_smoke_refuses_closed_instance() {
    let mut harness = setup_view_harness(ViewKind::Survey, api_with(InstanceState::Closed));
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("This survey is not open for answers."),
        "missing refusal in {html}"
    );
    assert!(!html.contains("Retry"), "final refusal offers retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn survey_view_smoke_load_failure_offers_retry() {
    let api = api_with(InstanceState::Open);
    api.fail(FailPoint::InstanceSurvey).expect("fail");
    let mut harness = setup_view_harness(ViewKind::Survey, api);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("load this survey"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn survey_view_smoke_resumes_in_progress_participation() {
    let api = api_with(InstanceState::Open);
    api.insert_participation(
        TEST_INSTANCE,
        Participation {
            state: Some(ParticipationState::InProgress),
            answers: vec![StoredAnswer {
                question: StoredQuestionRef {
                    id: QuestionId::new(1),
                    kind: "text".into(),
                },
                content: Some("Pairing".into()),
                selected_options: Vec::new(),
            }],
            ..Participation::default()
        },
    )
    .expect("insert participation");

    let mut harness = setup_view_harness(ViewKind::Survey, api);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 2 of 2"), "not resumed in {html}");
    assert!(html.contains("Welcome back"), "missing resume note in {html}");
    assert!(
        html.contains("survey-selector__step--answered"),
        "missing answered marker in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn survey_intents_smoke_answer_save_and_submit() {
    let mut harness = setup_view_harness(ViewKind::Survey, api_with(InstanceState::Open));
    harness.rebuild();
    harness.settle().await;

    let dispatch = harness.survey_handles.dispatch();
    let vm = harness.survey_handles.vm();

    dispatch.call(ResponseIntent::SetText {
        question: QuestionId::new(1),
        content: "Good pairing".into(),
    });
    harness.settle().await;
    assert!(harness.render().contains("Unsaved changes"));

    dispatch.call(ResponseIntent::Next);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 2 of 2"), "did not move in {html}");
    assert!(html.contains("survey-submit"), "missing submit in {html}");
    assert!(html.contains("Saved "), "missing saved time in {html}");
    assert_eq!(harness.api.saves().expect("saves").len(), 1);
    assert!(
        vm.read()
            .as_ref()
            .is_some_and(|vm| !vm.has_unsaved_changes())
    );

    dispatch.call(ResponseIntent::Select {
        question: QuestionId::new(2),
        option: OptionId::new(10),
    });
    dispatch.call(ResponseIntent::Submit);
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("Thank you! Your answers were submitted."),
        "missing flash in {html}"
    );
    let submits = harness.api.submits().expect("submits");
    assert_eq!(submits.len(), 1);
    assert_eq!(submits[0].1.answers.len(), 2);
    assert!(submits[0].1.completed);
}

#[tokio::test(flavor = "current_thread")]
async fn survey_intents_smoke_failed_save_still_moves_with_notice() {
    let mut harness = setup_view_harness(ViewKind::Survey, api_with(InstanceState::Open));
    harness.rebuild();
    harness.settle().await;
    harness.api.fail(FailPoint::SavePartial).expect("fail");

    let dispatch = harness.survey_handles.dispatch();
    dispatch.call(ResponseIntent::SetText {
        question: QuestionId::new(1),
        content: "Flaky wifi".into(),
    });
    dispatch.call(ResponseIntent::Next);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Question 2 of 2"), "did not move in {html}");
    assert!(
        html.contains("could not be saved"),
        "missing save notice in {html}"
    );
    assert!(html.contains("Unsaved changes"), "lost dirty flag in {html}");

    dispatch.call(ResponseIntent::ClearNotice);
    harness.settle().await;
    assert!(!harness.render().contains("could not be saved"));
}

#[tokio::test(flavor = "current_thread")]
async fn survey_intents_smoke_submit_error_keeps_step() {
    let mut harness = setup_view_harness(ViewKind::Survey, api_with(InstanceState::Open));
    harness.rebuild();
    harness.settle().await;

    let dispatch = harness.survey_handles.dispatch();
    dispatch.call(ResponseIntent::JumpTo(1));
    harness.settle().await;
    dispatch.call(ResponseIntent::Submit);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("could not be submitted"), "missing error in {html}");
    assert!(html.contains("No answers provided"), "missing server detail in {html}");
    assert!(html.contains("Question 2 of 2"), "left step in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_stats() {
    let api = api_with(InstanceState::Open);
    api.insert_participation(
        TEST_INSTANCE,
        Participation {
            state: Some(ParticipationState::Completed),
            completed: true,
            ..Participation::default()
        },
    )
    .expect("insert participation");

    let mut harness = setup_view_harness(ViewKind::Results, api);
    harness.rebuild();
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Results"), "missing title in {html}");
    assert!(html.contains("Completion rate"), "missing stats in {html}");
    assert!(html.contains("100%"), "missing rate in {html}");
}
