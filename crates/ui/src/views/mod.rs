mod assessment;
mod flow_panel;
mod flow_slots;
mod resume_prompt;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use assessment::AssessmentView;
pub use flow_panel::FlowPanel;
pub use flow_slots::{FlowIntent, FlowSlots, use_flow_slots};
pub use resume_prompt::{LoadingPlaceholder, ResumePromptCard};
pub use state::{ViewError, ViewState, view_state_from_resource};
