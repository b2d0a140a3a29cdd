use std::sync::Arc;

use assessment_core::model::{AnswerValue, FlowEntry, QuestionId};
use services::{AddressBar, AssessmentApi, AssessmentFlow, DraftStore, FlowError};

use crate::views::ViewError;
use crate::vm::chunk_label;

/// Agreement scale offered for every statement.
pub const SCALE: [i64; 5] = [1, 2, 3, 4, 5];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowOutcome {
    Continue,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRowVm {
    pub id: QuestionId,
    pub prompt: String,
    pub selected: Option<i64>,
}

/// Render-ready snapshot of the running flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowPanelVm {
    pub progress_label: String,
    pub answered_label: String,
    pub questions: Vec<QuestionRowVm>,
    pub can_submit: bool,
    pub is_last_chunk: bool,
    pub completed: bool,
}

pub struct FlowVm {
    flow: AssessmentFlow,
}

impl FlowVm {
    #[must_use]
    pub fn new(flow: AssessmentFlow) -> Self {
        Self { flow }
    }

    #[must_use]
    pub fn panel(&self) -> FlowPanelVm {
        let progress = self.flow.progress();
        let questions = self
            .flow
            .questions()
            .iter()
            .map(|question| QuestionRowVm {
                id: question.id.clone(),
                prompt: question.prompt.clone(),
                selected: match self.flow.answer(&question.id) {
                    Some(AnswerValue::Scale(value)) => Some(*value),
                    _ => None,
                },
            })
            .collect();
        FlowPanelVm {
            progress_label: chunk_label(progress.current_chunk, progress.total_chunks),
            answered_label: format!(
                "{} / {} answered",
                progress.answered, progress.total_questions
            ),
            questions,
            can_submit: !progress.is_complete && progress.answered == progress.total_questions,
            is_last_chunk: self.flow.descriptor().is_last_chunk(),
            completed: progress.is_complete,
        }
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` if the question is not on this chunk.
    pub async fn answer(&mut self, id: QuestionId, value: i64) -> Result<(), ViewError> {
        self.flow
            .record_answer(id, AnswerValue::Scale(value))
            .await
            .map_err(view_error)
    }

    /// # Errors
    ///
    /// Returns `ViewError::Incomplete` while questions are open and
    /// `ViewError::Unavailable` when the service rejects the chunk.
    pub async fn submit(&mut self) -> Result<FlowOutcome, ViewError> {
        let progress = self.flow.submit_chunk().await.map_err(view_error)?;
        if progress.is_complete {
            Ok(FlowOutcome::Completed)
        } else {
            Ok(FlowOutcome::Continue)
        }
    }
}

/// # Errors
///
/// Returns `ViewError::Unavailable` when no session can be started.
pub async fn start_flow(
    entry: FlowEntry,
    api: Arc<dyn AssessmentApi>,
    drafts: DraftStore,
    address: Arc<dyn AddressBar>,
) -> Result<FlowVm, ViewError> {
    let flow = AssessmentFlow::begin(entry, api, drafts, address)
        .await
        .map_err(view_error)?;
    Ok(FlowVm::new(flow))
}

fn view_error(err: FlowError) -> ViewError {
    match err {
        FlowError::Incomplete { missing } => ViewError::Incomplete(missing),
        FlowError::Api(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "assessment service request failed");
            ViewError::Unavailable
        }
        other => {
            tracing::warn!(error = %other, "assessment flow rejected input");
            ViewError::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessment_core::model::{
        AssessmentVersion, Question, SessionDescriptor, SessionId, SessionToken,
    };
    use services::{ChunkOutcome, ChunkSubmission, GatewayError, MemoryAddressBar};
    use storage::repository::InMemoryRepository;

    struct OneChunkApi;

    #[async_trait::async_trait]
    impl AssessmentApi for OneChunkApi {
        async fn start_session(
            &self,
            version: AssessmentVersion,
            _upgrade_from: Option<&SessionToken>,
        ) -> Result<SessionDescriptor, GatewayError> {
            Ok(SessionDescriptor::new(
                SessionId::new("s1"),
                SessionToken::parse("t1").unwrap(),
                version,
                vec![
                    Question::new("q1", "I give clear direction"),
                    Question::new("q2", "I ask for feedback"),
                ],
                1,
                1,
            )
            .unwrap())
        }

        async fn submit_chunk(
            &self,
            _submission: &ChunkSubmission,
        ) -> Result<ChunkOutcome, GatewayError> {
            Ok(ChunkOutcome::Complete {
                session_id: SessionId::new("s1"),
            })
        }
    }

    async fn new_vm() -> FlowVm {
        start_flow(
            FlowEntry::New {
                version: AssessmentVersion::Quick,
                upgrade_from: None,
            },
            Arc::new(OneChunkApi),
            DraftStore::new(Arc::new(InMemoryRepository::new())),
            Arc::new(MemoryAddressBar::parse("app://assessment/").unwrap()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn panel_reflects_answers() {
        let mut vm = new_vm().await;
        let panel = vm.panel();
        assert_eq!(panel.progress_label, "Part 1 of 1");
        assert_eq!(panel.answered_label, "0 / 2 answered");
        assert!(!panel.can_submit);
        assert!(panel.is_last_chunk);

        vm.answer(QuestionId::new("q2"), 4).await.unwrap();
        let panel = vm.panel();
        assert_eq!(panel.questions[0].selected, None);
        assert_eq!(panel.questions[1].selected, Some(4));
    }

    #[tokio::test]
    async fn submit_maps_incomplete_then_completes() {
        let mut vm = new_vm().await;
        vm.answer(QuestionId::new("q1"), 2).await.unwrap();
        assert_eq!(vm.submit().await, Err(ViewError::Incomplete(1)));

        vm.answer(QuestionId::new("q2"), 5).await.unwrap();
        assert_eq!(vm.submit().await, Ok(FlowOutcome::Completed));
        assert!(vm.panel().completed);
        assert!(!vm.panel().can_submit);
    }

    #[tokio::test]
    async fn unknown_question_is_rejected() {
        let mut vm = new_vm().await;
        assert_eq!(
            vm.answer(QuestionId::new("elsewhere"), 3).await,
            Err(ViewError::Unknown)
        );
    }
}
