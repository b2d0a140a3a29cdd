mod flow_vm;
mod resume_vm;

pub use flow_vm::{FlowOutcome, FlowPanelVm, FlowVm, QuestionRowVm, SCALE, start_flow};
pub use resume_vm::{ResumeScreen, chunk_label};
