use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{InstanceRowVm, map_open_instances};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let responses = ctx.responses();
    let pinned = ctx.instance_id().map(|id| id.value());

    let resource = use_resource(move || {
        let responses = Arc::clone(&responses);
        async move {
            let open = responses
                .open_instances()
                .await
                .map_err(|err| ViewError::from_response(&err))?;
            Ok::<_, ViewError>(map_open_instances(&open))
        }
    });
    let state = view_state_from_resource(&resource);
    let mut retry = resource;

    rsx! {
        div { class: "page home-page",
            h2 { "Open surveys" }
            p { "Your answers are saved as you go, so you can stop and come back later." }
            if let Some(instance_id) = pinned {
                p { class: "home-pinned",
                    Link {
                        to: Route::Survey { instance_id },
                        class: "btn btn-primary",
                        id: "home-start",
                        "Continue survey #{instance_id}"
                    }
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "home-error",
                        p { "{err.message()}" }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| retry.restart(),
                            "Retry"
                        }
                    }
                },
                ViewState::Ready(rows) => {
                    if rows.is_empty() {
                        rsx! {
                            p { class: "instance-list__empty", "No surveys are open right now." }
                        }
                    } else {
                        rsx! {
                            ul { class: "instance-list",
                                for row in rows {
                                    InstanceRow { key: "{row.instance_id}", row }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn InstanceRow(row: InstanceRowVm) -> Element {
    rsx! {
        li { class: "instance-list__item",
            h3 { "{row.title}" }
            if !row.description.is_empty() {
                p { class: "instance-list__description", "{row.description}" }
            }
            p { class: "instance-list__meta",
                "{row.questions_label}"
                if let Some(closes) = row.closes_label.clone() {
                    " · {closes}"
                }
            }
            div { class: "instance-list__actions",
                if row.answerable {
                    Link {
                        to: Route::Survey { instance_id: row.instance_id },
                        class: "btn btn-primary",
                        "Answer"
                    }
                }
                Link {
                    to: Route::Results { survey_id: row.survey_id, instance_id: row.instance_id },
                    class: "btn btn-secondary",
                    "Results"
                }
            }
        }
    }
}
