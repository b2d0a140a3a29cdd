//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use assessment_core::model::{DescriptorError, QuestionId};

/// Errors emitted by the assessment service client.
///
/// The resume state machine treats every variant the same way as a missing
/// session; the kinds exist so logs can tell them apart.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("assessment service is not configured")]
    Disabled,
    #[error("assessment service returned status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("resume check timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid session descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),
    #[error("malformed service response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    /// Short label used as a structured logging field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::HttpStatus(_) => "http_status",
            Self::Timeout(_) => "timeout",
            Self::InvalidDescriptor(_) => "invalid_descriptor",
            Self::Decode(_) => "decode",
            Self::Transport(_) => "transport",
        }
    }
}

/// Rejected resume state machine transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("no resumable session is being offered (state: {state})")]
    NotPrompting { state: &'static str },
    #[error("resume controller has been torn down")]
    TornDown,
}

/// Errors emitted by `AssessmentFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error("{missing} question(s) in this chunk are unanswered")]
    Incomplete { missing: usize },
    #[error("question {0} is not part of the current chunk")]
    UnknownQuestion(QuestionId),
    #[error("assessment already completed")]
    Completed,
    #[error(transparent)]
    Api(#[from] GatewayError),
}
