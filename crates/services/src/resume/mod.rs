mod controller;

// Public API of the resume subsystem.
pub use crate::error::TransitionError;
pub use controller::{ResolveOutcome, ResumeController, ResumeDeps};
