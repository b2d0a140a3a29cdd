#![forbid(unsafe_code)]

pub mod address;
pub mod config;
pub mod drafts;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod resume;

pub use assessment_core::Clock;

pub use address::{AddressBar, MemoryAddressBar};
pub use config::{AssessmentApiConfig, ResumeConfig};
pub use drafts::DraftStore;
pub use error::{FlowError, GatewayError, TransitionError};
pub use flow::{AssessmentFlow, FlowProgress};
pub use gateway::{AssessmentApi, AssessmentClient, ChunkOutcome, ChunkSubmission, ResumeGateway};
pub use resume::{ResolveOutcome, ResumeController, ResumeDeps};
