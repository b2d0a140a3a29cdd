use std::sync::Arc;

use assessment_core::model::QuestionId;
use dioxus::prelude::*;
use services::{ResolveOutcome, ResumeController};

use crate::context::AppContext;
use crate::views::{
    FlowIntent, FlowPanel, LoadingPlaceholder, ResumePromptCard, ViewError, ViewState,
    use_flow_slots, view_state_from_resource,
};
use crate::vm::{ResumeScreen, start_flow};

/// The assessment page: resume check, resume prompt, then the question flow.
///
/// One `ResumeController` lives as long as this component. It is torn down on
/// drop so a late resume result never touches an unmounted page.
#[component]
pub fn AssessmentView() -> Element {
    let ctx = use_context::<AppContext>();
    let controller =
        use_hook(|| Arc::new(ResumeController::mount_from_address(ctx.resume_deps())));
    let mut resume_state = use_signal(|| controller.state());
    let slots = use_flow_slots();

    {
        let controller = Arc::clone(&controller);
        use_drop(move || controller.teardown());
    }

    let resolver = Arc::clone(&controller);
    use_future(move || {
        let controller = Arc::clone(&resolver);
        async move {
            if let ResolveOutcome::Applied(next) = controller.resolve().await {
                resume_state.set(next);
            }
        }
    });

    let starter = Arc::clone(&controller);
    let flow_resource = use_resource(move || {
        let controller = Arc::clone(&starter);
        let api = ctx.assessment_api();
        let drafts = ctx.drafts();
        let address = ctx.address();

        async move {
            // Re-run whenever the resume decision changes.
            if ResumeScreen::from_state(&resume_state.read()) != ResumeScreen::Flow {
                return Ok(false);
            }
            let Some(entry) = controller.flow_entry() else {
                return Ok(false);
            };
            let started = start_flow(entry, api, drafts, address).await?;
            slots.install(started);
            Ok::<_, ViewError>(true)
        }
    });

    let on_continue = {
        let controller = Arc::clone(&controller);
        use_callback(move |()| match controller.confirm_continue() {
            Ok(next) => resume_state.set(next),
            Err(err) => tracing::warn!(error = %err, "continue ignored"),
        })
    };

    let on_start_fresh = {
        let controller = Arc::clone(&controller);
        use_callback(move |()| {
            let controller = Arc::clone(&controller);
            spawn(async move {
                match controller.start_fresh().await {
                    Ok(next) => resume_state.set(next),
                    Err(err) => tracing::warn!(error = %err, "start fresh ignored"),
                }
            });
        })
    };

    let on_answer = use_callback(move |(id, value): (QuestionId, i64)| {
        slots.dispatch(FlowIntent::Answer(id, value));
    });
    let on_submit = use_callback(move |()| slots.dispatch(FlowIntent::Submit));

    let panel = slots.panel();
    let busy = slots.is_busy();
    let error_message = slots.error().map(ViewError::message);
    let screen = ResumeScreen::from_state(&resume_state.read());
    let body = match screen {
        ResumeScreen::Loading => rsx! {
            LoadingPlaceholder {}
        },
        ResumeScreen::Prompt {
            version,
            chunk_label,
            saved_answers,
        } => rsx! {
            ResumePromptCard {
                version,
                chunk_label,
                saved_answers,
                on_continue,
                on_start_fresh,
            }
        },
        ResumeScreen::Flow => match (view_state_from_resource(flow_resource), panel) {
            (ViewState::Error(err), _) => rsx! {
                p { class: "flow__error", role: "alert", "{err.message()}" }
            },
            (_, Some(panel)) => rsx! {
                FlowPanel { panel, busy, error: error_message, on_answer, on_submit }
            },
            _ => rsx! {
                LoadingPlaceholder {}
            },
        },
    };

    rsx! {
        div { class: "page assessment", {body} }
    }
}
