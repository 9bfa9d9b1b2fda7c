use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use api::InMemorySurveyApi;
use services::{Clock, ResponseLoopService};
use survey_core::model::{
    InstanceId, InstanceState, InstanceSurvey, OptionId, Question, QuestionId, QuestionKind,
    QuestionOption, SurveyId, SurveyInstance, UserStatus,
};
use survey_core::time::fixed_now;

use crate::context::{UiApp, build_app_context};
use crate::views::survey::SurveyTestHandles;
use crate::views::{FlashBanner, HomeView, ResultsView, SurveyView, use_flash_provider};

pub const TEST_INSTANCE: InstanceId = InstanceId::new(7);
pub const TEST_SURVEY: SurveyId = SurveyId::new(3);

#[derive(Clone)]
struct TestApp {
    instance_id: Option<InstanceId>,
    responses: Arc<ResponseLoopService>,
}

impl UiApp for TestApp {
    fn instance_id(&self) -> Option<InstanceId> {
        self.instance_id
    }

    fn responses(&self) -> Arc<ResponseLoopService> {
        Arc::clone(&self.responses)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Survey,
    Results,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    survey_handles: SurveyTestHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    use_context_provider(|| props.survey_handles.clone());
    use_flash_provider();
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    let instance_id = TEST_INSTANCE.value();
    let page = match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Survey => rsx! { SurveyView { instance_id } },
        ViewKind::Results => rsx! { ResultsView { survey_id: TEST_SURVEY.value(), instance_id } },
    };
    rsx! {
        FlashBanner {}
        {page}
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: InMemorySurveyApi,
    pub survey_handles: SurveyTestHandles,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive until spawned tasks and resources against the in-memory api have resolved.
    pub async fn settle(&mut self) {
        for _ in 0..5 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// A text question followed by a single-choice question.
pub fn sample_survey(state: InstanceState) -> InstanceSurvey {
    InstanceSurvey {
        instance: SurveyInstance {
            id: TEST_INSTANCE,
            title: "Team retro".into(),
            description: "How did the sprint go?".into(),
            state,
            creation_date: None,
            closure_date: None,
        },
        questions: vec![
            Question::text(QuestionId::new(1), "What went well?"),
            Question::new(
                QuestionId::new(2),
                "Ship it again?",
                QuestionKind::Single,
                vec![
                    QuestionOption::new(OptionId::new(10), "Yes"),
                    QuestionOption::new(OptionId::new(11), "No"),
                ],
            )
            .expect("valid question"),
        ],
        user_status: UserStatus::default(),
    }
}

pub fn setup_view_harness(view: ViewKind, api: InMemorySurveyApi) -> ViewHarness {
    let responses = Arc::new(ResponseLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(api.clone()),
    ));
    let app = Arc::new(TestApp {
        instance_id: Some(TEST_INSTANCE),
        responses,
    });
    let survey_handles = SurveyTestHandles::default();

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            survey_handles: survey_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        api,
        survey_handles,
    }
}
