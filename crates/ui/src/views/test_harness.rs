use std::sync::Arc;

use assessment_core::model::{
    AssessmentVersion, FlowEntry, Question, QuestionId, SessionDescriptor, SessionId,
    SessionToken,
};
use assessment_core::time::fixed_clock;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use services::{
    AddressBar, AssessmentApi, ChunkOutcome, ChunkSubmission, DraftStore, GatewayError,
    MemoryAddressBar, ResumeConfig, ResumeDeps, ResumeGateway,
};
use storage::repository::{DraftRepository, InMemoryRepository, StorageError};

use crate::context::{UiApp, build_app_context};
use crate::views::{
    AssessmentView, FlowIntent, FlowPanel, LoadingPlaceholder, ViewError, use_flow_slots,
};
use crate::vm::start_flow;

pub fn descriptor(
    token: &str,
    version: AssessmentVersion,
    current_chunk: u32,
    total_chunks: u32,
) -> SessionDescriptor {
    let questions = (1..=2)
        .map(|n| Question::new(format!("c{current_chunk}q{n}"), format!("Statement {n}")))
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

/// Resume gateway with one fixed answer.
pub enum TestGateway {
    Found(SessionDescriptor),
    Missing,
    Pending,
}

#[async_trait::async_trait]
impl ResumeGateway for TestGateway {
    async fn resume(
        &self,
        _token: &SessionToken,
    ) -> Result<Option<SessionDescriptor>, GatewayError> {
        match self {
            Self::Found(descriptor) => Ok(Some(descriptor.clone())),
            Self::Missing => Ok(None),
            Self::Pending => std::future::pending().await,
        }
    }
}

/// Starts two-chunk sessions with token `new1`.
pub struct TestApi;

#[async_trait::async_trait]
impl AssessmentApi for TestApi {
    async fn start_session(
        &self,
        version: AssessmentVersion,
        _upgrade_from: Option<&SessionToken>,
    ) -> Result<SessionDescriptor, GatewayError> {
        Ok(descriptor("new1", version, 1, 2))
    }

    async fn submit_chunk(
        &self,
        submission: &ChunkSubmission,
    ) -> Result<ChunkOutcome, GatewayError> {
        Ok(ChunkOutcome::Next {
            session: descriptor(submission.token.as_str(), submission.version, 2, 2),
        })
    }
}

struct TestApp {
    deps: ResumeDeps,
}

impl UiApp for TestApp {
    fn resume_deps(&self) -> ResumeDeps {
        self.deps.clone()
    }

    fn assessment_api(&self) -> Arc<dyn AssessmentApi> {
        Arc::new(TestApi)
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewHarnessRoot(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { AssessmentView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub address: MemoryAddressBar,
    pub repo: InMemoryRepository,
    pub drafts: DraftStore,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(url: &str, gateway: TestGateway) -> ViewHarness {
    let repo = InMemoryRepository::new();
    let drafts = DraftStore::new(Arc::new(repo.clone())).with_clock(fixed_clock());
    let address = MemoryAddressBar::parse(url).unwrap();
    let deps = ResumeDeps {
        gateway: Arc::new(gateway),
        drafts: drafts.clone(),
        address: Arc::new(address.clone()),
        config: ResumeConfig::default(),
    };

    let dom = VirtualDom::new_with_props(
        ViewHarnessRoot,
        ViewHarnessProps {
            app: Arc::new(TestApp { deps }),
        },
    );

    ViewHarness {
        dom,
        address,
        repo,
        drafts,
    }
}

/// In-memory drafts that yield once before every write, like a real device store.
#[derive(Clone, Default)]
pub struct YieldingRepo {
    pub inner: InMemoryRepository,
}

#[async_trait::async_trait]
impl DraftRepository for YieldingRepo {
    async fn get_entry(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_entry(key).await
    }
    async fn put_entry(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::task::yield_now().await;
        self.inner.put_entry(key, value).await
    }
    async fn remove_entry(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_entry(key).await
    }
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.inner.keys_with_prefix(prefix).await
    }
}

#[derive(Props, Clone)]
struct QuickAnswersProps {
    drafts: DraftStore,
}

impl PartialEq for QuickAnswersProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Starts a quick flow and answers both statements without waiting in between.
#[component]
fn QuickAnswersRoot(props: QuickAnswersProps) -> Element {
    let slots = use_flow_slots();
    let drafts = props.drafts.clone();
    use_future(move || {
        let drafts = drafts.clone();
        async move {
            let entry = FlowEntry::New {
                version: AssessmentVersion::Quick,
                upgrade_from: None,
            };
            let address: Arc<dyn AddressBar> =
                Arc::new(MemoryAddressBar::parse("app://assessment/").unwrap());
            let vm = start_flow(entry, Arc::new(TestApi), drafts, address)
                .await
                .unwrap();
            slots.install(vm);
            slots.dispatch(FlowIntent::Answer(QuestionId::new("c1q1"), 2));
            slots.dispatch(FlowIntent::Answer(QuestionId::new("c1q2"), 5));
        }
    });

    let Some(panel) = slots.panel() else {
        return rsx! { LoadingPlaceholder {} };
    };
    rsx! {
        FlowPanel {
            panel,
            busy: slots.is_busy(),
            error: slots.error().map(ViewError::message),
            on_answer: move |_| {},
            on_submit: move |_| {},
        }
    }
}

pub fn setup_quick_answers(drafts: DraftStore) -> VirtualDom {
    VirtualDom::new_with_props(QuickAnswersRoot, QuickAnswersProps { drafts })
}
