use crate::model::{AssessmentVersion, DraftAnswers, SessionDescriptor, SessionToken};

/// A resumable session offered to the user, plus any matching local drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePrompt {
    pub descriptor: SessionDescriptor,
    pub drafts: Option<DraftAnswers>,
}

/// What the assessment page should show.
///
/// Exactly one variant is active for a page view. `Resuming` and `Fresh` are
/// terminal: once reached, the page hands over to the question flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeState {
    /// A resume check is in flight.
    Checking,
    /// A valid session was found; waiting for Continue or Start fresh.
    Prompt(ResumePrompt),
    /// The user chose to continue.
    Resuming(ResumePrompt),
    /// No resume in effect; start with an empty answer set.
    Fresh,
}

impl ResumeState {
    #[must_use]
    pub fn prompt(&self) -> Option<&ResumePrompt> {
        match self {
            Self::Prompt(prompt) | Self::Resuming(prompt) => Some(prompt),
            Self::Checking | Self::Fresh => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Prompt(_) => "prompt",
            Self::Resuming(_) => "resuming",
            Self::Fresh => "fresh",
        }
    }
}

/// Page classification used by the view layer and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    Fresh,
    ResumeCheck,
    Resuming,
    Upgrading,
}

/// Where the question flow starts once the resume decision is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEntry {
    /// Start a new session, optionally escalating a quick session to deep.
    New {
        version: AssessmentVersion,
        upgrade_from: Option<SessionToken>,
    },
    Resumed(ResumePrompt),
}

impl FlowEntry {
    #[must_use]
    pub fn version(&self) -> AssessmentVersion {
        match self {
            Self::New { version, .. } => *version,
            Self::Resumed(prompt) => prompt.descriptor.version(),
        }
    }
}
