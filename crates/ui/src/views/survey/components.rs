use dioxus::prelude::*;

use survey_core::model::QuestionKind;

use crate::vm::{Notice, QuestionVm, ResponseIntent, StepMarkerVm};

#[component]
pub(super) fn ProgressBar(percent: u32, label: String) -> Element {
    rsx! {
        div { class: "survey-progress",
            div {
                class: "survey-progress__track",
                role: "progressbar",
                aria_valuemin: "0",
                aria_valuemax: "100",
                aria_valuenow: "{percent}",
                div { class: "survey-progress__fill", style: "width: {percent}%;" }
            }
            span { class: "survey-progress__label", "{percent}% · {label}" }
        }
    }
}

/// Numbered step buttons; answered questions carry a marker class.
#[component]
pub(super) fn QuestionSelector(
    markers: Vec<StepMarkerVm>,
    on_select: EventHandler<usize>,
) -> Element {
    rsx! {
        nav { class: "survey-selector", aria_label: "Questions",
            {markers.iter().map(|marker| {
                let index = marker.index;
                let mut class = String::from("survey-selector__step");
                if marker.answered {
                    class.push_str(" survey-selector__step--answered");
                }
                if marker.current {
                    class.push_str(" survey-selector__step--current");
                }
                rsx! {
                    button {
                        key: "{index}",
                        class: "{class}",
                        r#type: "button",
                        aria_current: if marker.current { "step" } else { "false" },
                        onclick: move |_| on_select.call(index),
                        "{marker.number}"
                    }
                }
            })}
        }
    }
}

#[component]
pub(super) fn QuestionCard(question: QuestionVm, on_intent: EventHandler<ResponseIntent>) -> Element {
    let question_id = question.id;
    let read_only = question.read_only;
    let hint = match question.kind {
        QuestionKind::Text => "Type your answer",
        QuestionKind::Single => "Choose one",
        QuestionKind::Multiple => "Choose all that apply",
    };

    rsx! {
        section { class: "question-card", id: "question-{question_id}",
            h3 { class: "question-card__title",
                span { class: "question-card__number", "{question.number}. " }
                "{question.content}"
            }
            p { class: "question-card__hint", "{hint}" }
            match question.kind {
                QuestionKind::Text => rsx! {
                    textarea {
                        class: "question-card__text",
                        id: "question-text",
                        rows: 4,
                        disabled: read_only,
                        value: "{question.text}",
                        oninput: move |evt: FormEvent| {
                            on_intent.call(ResponseIntent::SetText {
                                question: question_id,
                                content: evt.value(),
                            });
                        },
                    }
                },
                QuestionKind::Single | QuestionKind::Multiple => {
                    let multiple = question.kind == QuestionKind::Multiple;
                    rsx! {
                        ul { class: "question-card__options",
                            {question.options.iter().map(|option| {
                                let option_id = option.id;
                                rsx! {
                                    li { key: "{option_id}",
                                        label { class: "question-card__option",
                                            input {
                                                r#type: if multiple { "checkbox" } else { "radio" },
                                                name: "question-{question_id}",
                                                checked: option.selected,
                                                disabled: read_only,
                                                onchange: move |_| {
                                                    let intent = if multiple {
                                                        ResponseIntent::Toggle { question: question_id, option: option_id }
                                                    } else {
                                                        ResponseIntent::Select { question: question_id, option: option_id }
                                                    };
                                                    on_intent.call(intent);
                                                },
                                            }
                                            span { "{option.label}" }
                                        }
                                    }
                                }
                            })}
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub(super) fn NoticeBanner(notice: Notice, on_dismiss: EventHandler<()>) -> Element {
    let class = if notice.is_transient() {
        "survey-notice survey-notice--transient"
    } else {
        "survey-notice survey-notice--error"
    };
    rsx! {
        div { class: "{class}", role: "alert",
            p { "{notice.text()}" }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| on_dismiss.call(()),
                "Dismiss"
            }
        }
    }
}
