use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::navigator;
use tracing::{debug, error, info};

use services::{ResponseLoopService, ResumeOutcome};
use survey_core::model::{InstanceId, ParticipationId};

use super::components::{NoticeBanner, ProgressBar, QuestionCard, QuestionSelector};
use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{Flash, ViewError, ViewState, use_flash, view_state_from_resource};
use crate::vm::{
    Notice, QuestionVm, ResponseIntent, ResponseVm, StepMarkerVm, StepMove, open_survey,
};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// Everything the form renders, read out of the vm in one borrow.
#[derive(Clone, Debug, PartialEq)]
struct FormSnapshot {
    title: String,
    description: String,
    step_label: String,
    progress_percent: u32,
    progress_label: String,
    question: Option<QuestionVm>,
    markers: Vec<StepMarkerVm>,
    is_first: bool,
    is_last: bool,
    status: Option<String>,
    submitting: bool,
    completed: bool,
    resumed: bool,
    notice: Option<Notice>,
}

impl FormSnapshot {
    fn from_vm(vm: &ResponseVm) -> Self {
        Self {
            title: vm.title().to_owned(),
            description: vm.description().to_owned(),
            step_label: vm.step_label(),
            progress_percent: vm.progress_percent(),
            progress_label: vm.progress_label(),
            question: vm.question(),
            markers: vm.markers(),
            is_first: vm.is_first_step(),
            is_last: vm.is_last_step(),
            status: nav_status(vm),
            submitting: vm.is_submitting(),
            completed: vm.is_completed(),
            resumed: matches!(vm.resumed(), ResumeOutcome::Restored { answers, .. } if answers > 0),
            notice: vm.notice().cloned(),
        }
    }
}

fn nav_status(vm: &ResponseVm) -> Option<String> {
    if vm.is_saving() {
        Some("Saving...".to_owned())
    } else if vm.has_unsaved_changes() {
        Some("Unsaved changes".to_owned())
    } else {
        vm.saved_label()
    }
}

/// Send the pending partial save and any follow-ups queued while it was in flight.
async fn save_pending(mut vm: Signal<Option<ResponseVm>>, responses: &ResponseLoopService) {
    let mut pending = vm.with_mut(|vm| vm.as_mut().and_then(ResponseVm::begin_save));
    while let Some(save) = pending {
        let result = responses.send_save(&save).await;
        let now = responses.clock().now();
        pending = vm.with_mut(|vm| {
            vm.as_mut()
                .and_then(|vm| vm.finish_save(&save, result, now))
        });
    }
}

async fn submit_answers(
    mut vm: Signal<Option<ResponseVm>>,
    responses: &ResponseLoopService,
) -> Option<ParticipationId> {
    let (instance_id, request) = vm.with_mut(|vm| {
        let vm = vm.as_mut()?;
        let request = vm.begin_submit()?;
        Some((vm.instance_id(), request))
    })?;
    let result = responses.send_submit(instance_id, &request).await;
    if let Err(err) = &result {
        error!(instance = %instance_id, error = %err, "submit failed");
    }
    vm.with_mut(|vm| vm.as_mut().and_then(|vm| vm.finish_submit(result)))
}

#[component]
pub fn SurveyView(instance_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let responses = ctx.responses();
    let instance_id = InstanceId::new(instance_id);

    let vm = use_signal(|| None::<ResponseVm>);
    let flash = use_flash();
    let nav = navigator();

    let responses_for_resource = Arc::clone(&responses);
    let resource = use_resource(move || {
        let responses = Arc::clone(&responses_for_resource);
        let mut vm = vm;

        async move {
            let opened = open_survey(&responses, instance_id).await?;
            vm.set(Some(opened));
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let dispatch_intent = {
        let responses = Arc::clone(&responses);
        use_callback(move |intent: ResponseIntent| {
            let mut vm = vm;
            debug!(?intent, "survey intent");

            let handled = vm.with_mut(|vm| vm.as_mut().map(|vm| vm.apply_local(&intent)));
            match handled {
                None | Some(true) => return,
                Some(false) => {}
            }

            let responses = Arc::clone(&responses);
            spawn(async move {
                let step = match intent {
                    ResponseIntent::Next => StepMove::Next,
                    ResponseIntent::Previous => StepMove::Previous,
                    ResponseIntent::JumpTo(index) => StepMove::To(index),
                    ResponseIntent::Submit => {
                        if let Some(id) = submit_answers(vm, &responses).await {
                            info!(instance = %instance_id, participation = %id, "survey submitted");
                            if let Some(flash) = flash {
                                flash.show(Flash::success("Thank you! Your answers were submitted."));
                            }
                            nav.push(Route::Home {});
                        }
                        return;
                    }
                    _ => {
                        save_pending(vm, &responses).await;
                        return;
                    }
                };
                save_pending(vm, &responses).await;
                vm.with_mut(|vm| {
                    if let Some(vm) = vm.as_mut() {
                        vm.navigate(step);
                    }
                });
            });
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<SurveyTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    let snapshot = vm.read().as_ref().map(FormSnapshot::from_vm);
    let mut retry = resource;

    rsx! {
        div { class: "page survey-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "survey-load-error",
                        p { "{err.message()}" }
                        if !err.is_final() {
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| retry.restart(),
                                "Retry"
                            }
                        }
                    }
                },
                ViewState::Ready(()) => match snapshot {
                    Some(form) => rsx! {
                        SurveyForm { form, on_intent: dispatch_intent }
                    },
                    None => rsx! {
                        p { "{ViewError::Unknown.message()}" }
                    },
                },
            }
        }
    }
}

#[component]
fn SurveyForm(form: FormSnapshot, on_intent: EventHandler<ResponseIntent>) -> Element {
    rsx! {
        header { class: "survey-header",
            h2 { class: "survey-header__title", "{form.title}" }
            if !form.description.is_empty() {
                p { class: "survey-header__description", "{form.description}" }
            }
        }
        if form.completed {
            p { class: "survey-readonly", "You already completed this survey. Your answers are shown read-only." }
        } else if form.resumed {
            p { class: "survey-resumed", "Welcome back. Your earlier answers were restored." }
        }
        if let Some(notice) = form.notice.clone() {
            NoticeBanner {
                notice,
                on_dismiss: move |()| on_intent.call(ResponseIntent::ClearNotice),
            }
        }
        ProgressBar { percent: form.progress_percent, label: form.progress_label.clone() }
        QuestionSelector {
            markers: form.markers.clone(),
            on_select: move |index| on_intent.call(ResponseIntent::JumpTo(index)),
        }
        p { class: "survey-step", id: "survey-step", "{form.step_label}" }
        if let Some(question) = form.question.clone() {
            QuestionCard { question, on_intent }
        }
        footer { class: "survey-nav",
            button {
                class: "btn btn-secondary",
                id: "survey-previous",
                r#type: "button",
                disabled: form.is_first,
                onclick: move |_| on_intent.call(ResponseIntent::Previous),
                "Previous"
            }
            span { class: "survey-nav__status", id: "survey-status",
                if let Some(status) = form.status.clone() {
                    "{status}"
                }
            }
            if !form.is_last {
                button {
                    class: "btn btn-primary",
                    id: "survey-next",
                    r#type: "button",
                    onclick: move |_| on_intent.call(ResponseIntent::Next),
                    "Next"
                }
            } else if !form.completed {
                button {
                    class: "btn btn-primary",
                    id: "survey-submit",
                    r#type: "button",
                    disabled: form.submitting,
                    onclick: move |_| on_intent.call(ResponseIntent::Submit),
                    if form.submitting { "Submitting..." } else { "Submit" }
                }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SurveyTestHandles {
    dispatch: Rc<RefCell<Option<Callback<ResponseIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<ResponseVm>>>>>,
}

#[cfg(test)]
impl SurveyTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<ResponseIntent>,
        vm: Signal<Option<ResponseVm>>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<ResponseIntent> {
        (*self.dispatch.borrow()).expect("survey dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<ResponseVm>> {
        (*self.vm.borrow()).expect("survey vm registered")
    }
}
