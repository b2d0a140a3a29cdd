use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AssessmentVersion, QuestionId, SessionId, SessionToken};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DescriptorError {
    #[error("chunk numbers start at 1 (got current={current}, total={total})")]
    ZeroChunk { current: u32, total: u32 },

    #[error("current chunk {current} is past the last chunk {total}")]
    ChunkOutOfRange { current: u32, total: u32 },
}

/// A question as served by the external question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: QuestionId::new(id),
            prompt: prompt.into(),
            dimension: None,
        }
    }
}

/// Server-confirmed view of a session's progress.
///
/// Holds the questions of the chunk the user is on. The service mints it;
/// clients only receive it from a resume, start, or chunk submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorWire", into = "DescriptorWire")]
pub struct SessionDescriptor {
    session_id: SessionId,
    token: SessionToken,
    version: AssessmentVersion,
    questions: Vec<Question>,
    current_chunk: u32,
    total_chunks: u32,
}

impl SessionDescriptor {
    /// Build a descriptor, enforcing `1 <= current_chunk <= total_chunks`.
    ///
    /// # Errors
    ///
    /// Returns `DescriptorError` when the chunk counters are out of range.
    pub fn new(
        session_id: SessionId,
        token: SessionToken,
        version: AssessmentVersion,
        questions: Vec<Question>,
        current_chunk: u32,
        total_chunks: u32,
    ) -> Result<Self, DescriptorError> {
        if current_chunk == 0 || total_chunks == 0 {
            return Err(DescriptorError::ZeroChunk {
                current: current_chunk,
                total: total_chunks,
            });
        }
        if current_chunk > total_chunks {
            return Err(DescriptorError::ChunkOutOfRange {
                current: current_chunk,
                total: total_chunks,
            });
        }
        Ok(Self {
            session_id,
            token,
            version,
            questions,
            current_chunk,
            total_chunks,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    #[must_use]
    pub fn version(&self) -> AssessmentVersion {
        self.version
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_chunk(&self) -> u32 {
        self.current_chunk
    }

    #[must_use]
    pub fn total_chunks(&self) -> u32 {
        self.total_chunks
    }

    #[must_use]
    pub fn is_last_chunk(&self) -> bool {
        self.current_chunk == self.total_chunks
    }

    #[must_use]
    pub fn has_question(&self, id: &QuestionId) -> bool {
        self.questions.iter().any(|q| &q.id == id)
    }
}

/// JSON shape used by the assessment service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorWire {
    pub session_id: SessionId,
    pub token: SessionToken,
    pub version: AssessmentVersion,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub current_chunk: u32,
    pub total_chunks: u32,
}

impl TryFrom<DescriptorWire> for SessionDescriptor {
    type Error = DescriptorError;

    fn try_from(wire: DescriptorWire) -> Result<Self, Self::Error> {
        Self::new(
            wire.session_id,
            wire.token,
            wire.version,
            wire.questions,
            wire.current_chunk,
            wire.total_chunks,
        )
    }
}

impl From<SessionDescriptor> for DescriptorWire {
    fn from(descriptor: SessionDescriptor) -> Self {
        Self {
            session_id: descriptor.session_id,
            token: descriptor.token,
            version: descriptor.version,
            questions: descriptor.questions,
            current_chunk: descriptor.current_chunk,
            total_chunks: descriptor.total_chunks,
        }
    }
}
