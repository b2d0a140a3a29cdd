use std::fmt;
use std::sync::Arc;

use assessment_core::model::{
    AnswerValue, AssessmentVersion, DraftAnswers, FlowEntry, Question, QuestionId,
    SessionDescriptor, SessionId,
};

use crate::address::{AddressBar, adopt_token, strip_token};
use crate::drafts::DraftStore;
use crate::error::FlowError;
use crate::gateway::{AssessmentApi, ChunkOutcome, ChunkSubmission};

/// Aggregated view of assessment progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowProgress {
    pub current_chunk: u32,
    pub total_chunks: u32,
    pub answered: usize,
    pub total_questions: usize,
    pub is_complete: bool,
}

/// Drives the user through the chunks of one assessment session.
///
/// Answers for the current chunk are mirrored to the draft store on every
/// change, always as the complete set. A successful submission clears them.
pub struct AssessmentFlow {
    api: Arc<dyn AssessmentApi>,
    drafts: DraftStore,
    address: Arc<dyn AddressBar>,
    descriptor: SessionDescriptor,
    answers: DraftAnswers,
    completed: Option<SessionId>,
}

impl AssessmentFlow {
    /// Start from the resume decision.
    ///
    /// A resumed entry adopts the server descriptor and any matching drafts.
    /// A new entry asks the service for a session and writes the minted token
    /// into the URL, consuming `upgrade_from`.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` if a new session cannot be started.
    pub async fn begin(
        entry: FlowEntry,
        api: Arc<dyn AssessmentApi>,
        drafts: DraftStore,
        address: Arc<dyn AddressBar>,
    ) -> Result<Self, FlowError> {
        tracing::debug!(
            version = %entry.version(),
            resumed = matches!(entry, FlowEntry::Resumed(_)),
            "beginning assessment flow"
        );
        let (descriptor, answers) = match entry {
            FlowEntry::Resumed(prompt) => {
                let answers = prompt.drafts.unwrap_or_default();
                (prompt.descriptor, answers)
            }
            FlowEntry::New {
                version,
                upgrade_from,
            } => {
                let descriptor = api.start_session(version, upgrade_from.as_ref()).await?;
                adopt_token(address.as_ref(), descriptor.token());
                tracing::info!(
                    %version,
                    upgrade = upgrade_from.is_some(),
                    total_chunks = descriptor.total_chunks(),
                    "assessment session started"
                );
                (descriptor, DraftAnswers::new())
            }
        };

        Ok(Self {
            api,
            drafts,
            address,
            descriptor,
            answers,
            completed: None,
        })
    }

    #[must_use]
    pub fn descriptor(&self) -> &SessionDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn version(&self) -> AssessmentVersion {
        self.descriptor.version()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        self.descriptor.questions()
    }

    #[must_use]
    pub fn answers(&self) -> &DraftAnswers {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.answers.get(id)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }

    #[must_use]
    pub fn completed_session(&self) -> Option<&SessionId> {
        self.completed.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> FlowProgress {
        FlowProgress {
            current_chunk: self.descriptor.current_chunk(),
            total_chunks: self.descriptor.total_chunks(),
            answered: self.answers.len(),
            total_questions: self.descriptor.questions().len(),
            is_complete: self.is_complete(),
        }
    }

    /// Record an answer and persist the chunk's full answer set as a draft.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Completed` after the last chunk was submitted and
    /// `FlowError::UnknownQuestion` for questions outside the current chunk.
    pub async fn record_answer(
        &mut self,
        id: QuestionId,
        value: AnswerValue,
    ) -> Result<(), FlowError> {
        if self.is_complete() {
            return Err(FlowError::Completed);
        }
        if !self.descriptor.has_question(&id) {
            return Err(FlowError::UnknownQuestion(id));
        }
        self.answers.insert(id, value);
        self.drafts
            .set(
                self.descriptor.version(),
                Some(self.descriptor.token()),
                self.descriptor.current_chunk(),
                &self.answers,
            )
            .await;
        Ok(())
    }

    /// Hand the current chunk to the service and move on.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Incomplete` if any question is unanswered,
    /// `FlowError::Completed` after completion, and `FlowError::Api` when the
    /// service rejects the submission. Drafts are kept on failure.
    pub async fn submit_chunk(&mut self) -> Result<FlowProgress, FlowError> {
        if self.is_complete() {
            return Err(FlowError::Completed);
        }
        let missing = self
            .descriptor
            .questions()
            .iter()
            .filter(|question| !self.answers.contains(&question.id))
            .count();
        if missing > 0 {
            return Err(FlowError::Incomplete { missing });
        }

        let submission = ChunkSubmission {
            token: self.descriptor.token().clone(),
            version: self.descriptor.version(),
            chunk: self.descriptor.current_chunk(),
            answers: self.answers.clone(),
        };
        let outcome = self.api.submit_chunk(&submission).await?;
        self.drafts.clear(submission.version).await;

        match outcome {
            ChunkOutcome::Next { session } => {
                if session.token() != self.descriptor.token() {
                    adopt_token(self.address.as_ref(), session.token());
                }
                tracing::debug!(
                    from = submission.chunk,
                    to = session.current_chunk(),
                    "advanced to next chunk"
                );
                self.descriptor = session;
                self.answers = DraftAnswers::new();
            }
            ChunkOutcome::Complete { session_id } => {
                strip_token(self.address.as_ref());
                tracing::info!(session = %session_id, "assessment completed");
                self.completed = Some(session_id);
            }
        }
        Ok(self.progress())
    }
}

impl fmt::Debug for AssessmentFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentFlow")
            .field("session_id", self.descriptor.session_id())
            .field("version", &self.descriptor.version())
            .field("current_chunk", &self.descriptor.current_chunk())
            .field("total_chunks", &self.descriptor.total_chunks())
            .field("answered", &self.answers.len())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}
