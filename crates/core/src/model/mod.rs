mod descriptor;
mod draft;
mod ids;
mod resume;
mod version;

pub use descriptor::{DescriptorError, DescriptorWire, Question, SessionDescriptor};
pub use draft::{AnswerValue, DraftAnswers, DraftSnapshot};
pub use ids::{EmptyTokenError, QuestionId, SessionId, SessionToken};
pub use resume::{EntryMode, FlowEntry, ResumePrompt, ResumeState};
pub use version::AssessmentVersion;
