use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::Link;

use survey_core::model::{InstanceId, SurveyId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{StatsVm, map_instance_stats};

#[component]
pub fn ResultsView(survey_id: u64, instance_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let responses = ctx.responses();

    let resource = use_resource(move || {
        let responses = Arc::clone(&responses);
        async move {
            let stats = responses
                .stats(SurveyId::new(survey_id), InstanceId::new(instance_id))
                .await
                .map_err(|err| ViewError::from_response(&err))?;
            Ok::<_, ViewError>(map_instance_stats(&stats))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page results-page",
            h2 { "Results" }
            p { class: "results__instance", "Survey run #{instance_id}" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(stats) => rsx! {
                    StatsDetails { stats }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "results__error", "{err.message()}" }
                },
            }

            Link { to: Route::Home {}, class: "btn btn-secondary", "Back to surveys" }
        }
    }
}

#[component]
fn StatsDetails(stats: StatsVm) -> Element {
    rsx! {
        dl { class: "summary",
            dt { "Participants" }
            dd { "{stats.participants}" }

            dt { "Completed" }
            dd { "{stats.completed}" }

            dt { "Completion rate" }
            dd { "{stats.completion_label}" }

            dt { "Questions" }
            dd { "{stats.questions}" }
        }
    }
}
