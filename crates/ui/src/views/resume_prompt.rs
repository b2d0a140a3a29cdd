use assessment_core::model::AssessmentVersion;
use dioxus::prelude::*;

#[component]
pub fn LoadingPlaceholder() -> Element {
    rsx! {
        div { class: "loading", role: "status",
            p { "Checking for a saved assessment..." }
        }
    }
}

/// Offers the saved session. Nothing happens until the user picks a button.
#[component]
pub fn ResumePromptCard(
    version: AssessmentVersion,
    chunk_label: String,
    saved_answers: usize,
    on_continue: EventHandler<()>,
    on_start_fresh: EventHandler<()>,
) -> Element {
    let version_label = match version {
        AssessmentVersion::Quick => "quick",
        AssessmentVersion::Deep => "in-depth",
    };
    let saved_note = match saved_answers {
        0 => None,
        1 => Some("1 answer on this part is saved.".to_string()),
        n => Some(format!("{n} answers on this part are saved.")),
    };

    rsx! {
        section { class: "resume-prompt",
            h2 { "Pick up where you left off?" }
            p { "You have an unfinished {version_label} assessment. {chunk_label}." }
            if let Some(note) = saved_note {
                p { class: "resume-prompt__drafts", "{note}" }
            }
            div { class: "resume-prompt__actions",
                button {
                    id: "resume-continue",
                    class: "btn btn-primary",
                    onclick: move |_| on_continue.call(()),
                    "Continue"
                }
                button {
                    id: "resume-start-fresh",
                    class: "btn btn-secondary",
                    onclick: move |_| on_start_fresh.call(()),
                    "Start fresh"
                }
            }
        }
    }
}
