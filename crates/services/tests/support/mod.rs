#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assessment_core::model::{
    AssessmentVersion, Question, SessionDescriptor, SessionId, SessionToken,
};
use assessment_core::time::fixed_clock;
use services::{
    AssessmentApi, ChunkOutcome, ChunkSubmission, DraftStore, GatewayError, MemoryAddressBar,
    ResumeConfig, ResumeDeps, ResumeGateway,
};
use storage::repository::{DraftRepository, InMemoryRepository, StorageError};
use tokio::sync::Notify;

pub fn descriptor(
    token: &str,
    version: AssessmentVersion,
    current_chunk: u32,
    total_chunks: u32,
) -> SessionDescriptor {
    let questions = (1..=3)
        .map(|n| {
            Question::new(
                format!("c{current_chunk}q{n}"),
                format!("Statement {n} of chunk {current_chunk}"),
            )
        })
        .collect();
    SessionDescriptor::new(
        SessionId::new("s1"),
        SessionToken::parse(token).unwrap(),
        version,
        questions,
        current_chunk,
        total_chunks,
    )
    .unwrap()
}

/// One scripted reply; `hold` keeps the call pending until `release`.
pub struct Reply {
    pub result: Result<Option<SessionDescriptor>, GatewayError>,
    pub hold: bool,
}

impl Reply {
    pub fn found(descriptor: SessionDescriptor) -> Self {
        Self {
            result: Ok(Some(descriptor)),
            hold: false,
        }
    }

    pub fn missing() -> Self {
        Self {
            result: Ok(None),
            hold: false,
        }
    }

    pub fn error(err: GatewayError) -> Self {
        Self {
            result: Err(err),
            hold: false,
        }
    }

    pub fn held(mut self) -> Self {
        self.hold = true;
        self
    }
}

/// Resume gateway answering from a queue of scripted replies.
#[derive(Default)]
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    pub entered: Notify,
    pub release: Notify,
    hang_when_empty: bool,
}

impl ScriptedGateway {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// A gateway whose every call stays pending forever.
    pub fn hanging() -> Self {
        Self {
            hang_when_empty: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ResumeGateway for ScriptedGateway {
    async fn resume(
        &self,
        _token: &SessionToken,
    ) -> Result<Option<SessionDescriptor>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().unwrap().pop_front();
        self.entered.notify_one();
        let Some(reply) = reply else {
            if self.hang_when_empty {
                std::future::pending::<()>().await;
            }
            return Ok(None);
        };
        if reply.hold {
            self.release.notified().await;
        }
        reply.result
    }
}

/// Assessment service fake that serves chunks of a fixed-size session.
pub struct FakeAssessmentApi {
    pub token: String,
    pub total_chunks: u32,
    pub submissions: Mutex<Vec<ChunkSubmission>>,
    pub started: Mutex<Vec<(AssessmentVersion, Option<String>)>>,
}

impl FakeAssessmentApi {
    pub fn new(token: &str, total_chunks: u32) -> Self {
        Self {
            token: token.to_owned(),
            total_chunks,
            submissions: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl AssessmentApi for FakeAssessmentApi {
    async fn start_session(
        &self,
        version: AssessmentVersion,
        upgrade_from: Option<&SessionToken>,
    ) -> Result<SessionDescriptor, GatewayError> {
        self.started
            .lock()
            .unwrap()
            .push((version, upgrade_from.map(|t| t.as_str().to_owned())));
        Ok(descriptor(&self.token, version, 1, self.total_chunks))
    }

    async fn submit_chunk(
        &self,
        submission: &ChunkSubmission,
    ) -> Result<ChunkOutcome, GatewayError> {
        self.submissions.lock().unwrap().push(submission.clone());
        if submission.chunk >= self.total_chunks {
            return Ok(ChunkOutcome::Complete {
                session_id: SessionId::new("s1"),
            });
        }
        Ok(ChunkOutcome::Next {
            session: descriptor(
                submission.token.as_str(),
                submission.version,
                submission.chunk + 1,
                self.total_chunks,
            ),
        })
    }
}

/// Device storage that is always unavailable.
pub struct UnavailableRepo;

#[async_trait::async_trait]
impl DraftRepository for UnavailableRepo {
    async fn get_entry(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("private browsing".into()))
    }
    async fn put_entry(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("private browsing".into()))
    }
    async fn remove_entry(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("private browsing".into()))
    }
    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
        Err(StorageError::Unavailable("private browsing".into()))
    }
}

/// In-memory repository whose prefix scans wait for `release`.
#[derive(Default)]
pub struct GatedRepo {
    pub inner: InMemoryRepository,
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait::async_trait]
impl DraftRepository for GatedRepo {
    async fn get_entry(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_entry(key).await
    }
    async fn put_entry(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.put_entry(key, value).await
    }
    async fn remove_entry(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_entry(key).await
    }
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.keys_with_prefix(prefix).await
    }
}

/// Everything a resume scenario needs, with handles to inspect afterwards.
pub struct Harness {
    pub repo: InMemoryRepository,
    pub drafts: DraftStore,
    pub address: MemoryAddressBar,
    pub gateway: Arc<ScriptedGateway>,
}

impl Harness {
    pub fn new(url: &str, gateway: ScriptedGateway) -> Self {
        let repo = InMemoryRepository::new();
        let drafts = DraftStore::new(Arc::new(repo.clone())).with_clock(fixed_clock());
        Self {
            repo,
            drafts,
            address: MemoryAddressBar::parse(url).unwrap(),
            gateway: Arc::new(gateway),
        }
    }

    pub fn deps(&self) -> ResumeDeps {
        ResumeDeps {
            gateway: self.gateway.clone(),
            drafts: self.drafts.clone(),
            address: Arc::new(self.address.clone()),
            config: ResumeConfig::default(),
        }
    }

    pub async fn draft_keys(&self) -> Vec<String> {
        self.repo.keys_with_prefix(self.drafts.namespace()).await.unwrap()
    }
}
