use assessment_core::model::QuestionId;
use dioxus::prelude::*;

use crate::vm::{FlowPanelVm, SCALE};

#[component]
pub fn FlowPanel(
    panel: FlowPanelVm,
    busy: bool,
    error: Option<String>,
    on_answer: EventHandler<(QuestionId, i64)>,
    on_submit: EventHandler<()>,
) -> Element {
    if panel.completed {
        return rsx! {
            section { class: "flow flow--complete",
                h2 { "Thank you" }
                p { "Your answers have been submitted." }
            }
        };
    }

    let submit_label = if panel.is_last_chunk { "Finish" } else { "Next" };

    rsx! {
        section { class: "flow", aria_busy: "{busy}",
            header { class: "flow__header",
                h2 { "{panel.progress_label}" }
                span { class: "flow__answered", "{panel.answered_label}" }
            }
            ol { class: "flow__questions",
                for row in panel.questions.iter().cloned() {
                    li { key: "{row.id}", class: "question",
                        p { class: "question__prompt", "{row.prompt}" }
                        div { class: "question__scale", role: "radiogroup",
                            for value in SCALE {
                                ScaleButton {
                                    question: row.id.clone(),
                                    value,
                                    selected: row.selected == Some(value),
                                    on_answer,
                                }
                            }
                        }
                    }
                }
            }
            if let Some(message) = error {
                p { class: "flow__error", role: "alert", "{message}" }
            }
            button {
                id: "flow-submit",
                class: "btn btn-primary",
                disabled: busy || !panel.can_submit,
                onclick: move |_| on_submit.call(()),
                "{submit_label}"
            }
        }
    }
}

#[component]
fn ScaleButton(
    question: QuestionId,
    value: i64,
    selected: bool,
    on_answer: EventHandler<(QuestionId, i64)>,
) -> Element {
    let class = if selected {
        "scale-option scale-option--selected"
    } else {
        "scale-option"
    };
    rsx! {
        button {
            class,
            role: "radio",
            aria_checked: "{selected}",
            onclick: move |_| on_answer.call((question.clone(), value)),
            "{value}"
        }
    }
}
