use assessment_core::model::{AssessmentVersion, ResumeState};

/// What the assessment page shows for a given resume state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResumeScreen {
    Loading,
    Prompt {
        version: AssessmentVersion,
        chunk_label: String,
        saved_answers: usize,
    },
    Flow,
}

impl ResumeScreen {
    #[must_use]
    pub fn from_state(state: &ResumeState) -> Self {
        match state {
            ResumeState::Checking => Self::Loading,
            ResumeState::Prompt(prompt) => Self::Prompt {
                version: prompt.descriptor.version(),
                chunk_label: chunk_label(
                    prompt.descriptor.current_chunk(),
                    prompt.descriptor.total_chunks(),
                ),
                saved_answers: prompt.drafts.as_ref().map_or(0, |drafts| drafts.len()),
            },
            ResumeState::Resuming(_) | ResumeState::Fresh => Self::Flow,
        }
    }
}

#[must_use]
pub fn chunk_label(current: u32, total: u32) -> String {
    format!("Part {current} of {total}")
}
