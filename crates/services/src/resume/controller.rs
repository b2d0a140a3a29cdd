use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use assessment_core::SessionIdentity;
use assessment_core::model::{
    AssessmentVersion, DraftAnswers, EntryMode, FlowEntry, ResumePrompt, ResumeState,
    SessionDescriptor, SessionToken,
};

use crate::address::{AddressBar, strip_token};
use crate::config::ResumeConfig;
use crate::drafts::DraftStore;
use crate::error::{GatewayError, TransitionError};
use crate::gateway::ResumeGateway;

/// Collaborators injected into a resume controller.
#[derive(Clone)]
pub struct ResumeDeps {
    pub gateway: Arc<dyn ResumeGateway>,
    pub drafts: DraftStore,
    pub address: Arc<dyn AddressBar>,
    pub config: ResumeConfig,
}

/// Result of a [`ResumeController::resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The check finished and moved the machine to this state.
    Applied(ResumeState),
    /// No check was needed; this is the current state.
    Unchanged(ResumeState),
    /// The result arrived after teardown or was superseded by a newer check.
    Discarded,
}

/// Why a token did not lead to a resume prompt.
#[derive(Debug)]
enum ResumeMiss {
    NotFound,
    VersionMismatch {
        requested: AssessmentVersion,
        found: AssessmentVersion,
    },
    Failed(GatewayError),
}

impl ResumeMiss {
    fn reason(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::VersionMismatch { .. } => "version_mismatch",
            Self::Failed(err) => err.kind(),
        }
    }
}

/// Decides, for one page view, whether the assessment resumes or starts fresh.
///
/// Built with [`ResumeController::mount`]; the initial state comes from the URL
/// alone. The only asynchronous step is [`ResumeController::resolve`]. Each
/// call takes a generation ticket, and its result is applied only while that
/// ticket is still the newest one and the controller is mounted.
///
/// Once a check commits to the fresh fallback it owns the outcome: tickets are
/// handed out and fallbacks claimed under the state lock, so no newer check
/// can start while the URL and drafts are being cleaned up.
pub struct ResumeController {
    deps: ResumeDeps,
    identity: SessionIdentity,
    state: Mutex<ResumeState>,
    generation: AtomicU64,
    settling: AtomicBool,
    torn_down: AtomicBool,
}

impl ResumeController {
    #[must_use]
    pub fn mount(deps: ResumeDeps, identity: SessionIdentity) -> Self {
        let initial = match identity.entry_mode() {
            EntryMode::ResumeCheck => ResumeState::Checking,
            EntryMode::Fresh | EntryMode::Upgrading | EntryMode::Resuming => ResumeState::Fresh,
        };
        tracing::debug!(
            version = %identity.version,
            mode = ?identity.entry_mode(),
            state = initial.label(),
            "resume controller mounted"
        );
        Self {
            deps,
            identity,
            state: Mutex::new(initial),
            generation: AtomicU64::new(0),
            settling: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Mount from whatever URL the address bar currently shows.
    #[must_use]
    pub fn mount_from_address(deps: ResumeDeps) -> Self {
        let identity = SessionIdentity::from_url(&deps.address.current());
        Self::mount(deps, identity)
    }

    #[must_use]
    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    #[must_use]
    pub fn state(&self) -> ResumeState {
        self.lock_state().clone()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    /// Page classification combining the URL with the current state.
    #[must_use]
    pub fn entry_mode(&self) -> EntryMode {
        if self.identity.upgrade_from.is_some() {
            return EntryMode::Upgrading;
        }
        match &*self.lock_state() {
            ResumeState::Checking | ResumeState::Prompt(_) => EntryMode::ResumeCheck,
            ResumeState::Resuming(_) => EntryMode::Resuming,
            ResumeState::Fresh => EntryMode::Fresh,
        }
    }

    /// Where the question flow should start, once the decision is final.
    #[must_use]
    pub fn flow_entry(&self) -> Option<FlowEntry> {
        match &*self.lock_state() {
            ResumeState::Resuming(prompt) => Some(FlowEntry::Resumed(prompt.clone())),
            ResumeState::Fresh => Some(FlowEntry::New {
                version: self.identity.version,
                upgrade_from: self.identity.upgrade_from.clone(),
            }),
            ResumeState::Checking | ResumeState::Prompt(_) => None,
        }
    }

    /// Run the resume check if one is pending.
    ///
    /// Any miss (unknown token, version mismatch, transport failure, timeout)
    /// strips the token from the URL, clears drafts, and lands on `Fresh`.
    /// A call made while another check is already falling back returns
    /// `Unchanged(Checking)` and leaves the outcome to that check.
    pub async fn resolve(&self) -> ResolveOutcome {
        if self.is_torn_down() {
            return ResolveOutcome::Discarded;
        }
        let ticket = {
            let guard = self.lock_state();
            let settling = self.settling.load(Ordering::Acquire);
            if settling || !matches!(&*guard, ResumeState::Checking) {
                return ResolveOutcome::Unchanged(guard.clone());
            }
            self.generation.fetch_add(1, Ordering::AcqRel) + 1
        };

        let next = match self.identity.resume_token() {
            Some(token) => {
                let token = token.clone();
                match self.lookup(&token).await {
                    Ok(descriptor) => {
                        if !self.is_current(ticket) {
                            return self.discard(ticket);
                        }
                        self.prompt_for(descriptor).await
                    }
                    Err(miss) => {
                        if !self.claim_fallback(ticket) {
                            return self.discard(ticket);
                        }
                        self.fall_back_to_fresh(&miss).await
                    }
                }
            }
            None => ResumeState::Fresh,
        };

        if !self.is_current(ticket) {
            return self.discard(ticket);
        }
        *self.lock_state() = next.clone();
        ResolveOutcome::Applied(next)
    }

    /// Continue the offered session. Only valid while prompting.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` when nothing is being offered or the
    /// controller was torn down.
    pub fn confirm_continue(&self) -> Result<ResumeState, TransitionError> {
        self.ensure_mounted()?;
        let mut guard = self.lock_state();
        let ResumeState::Prompt(prompt) = &*guard else {
            return Err(TransitionError::NotPrompting {
                state: guard.label(),
            });
        };
        let next = ResumeState::Resuming(prompt.clone());
        *guard = next.clone();
        drop(guard);
        tracing::info!(
            chunk = self.current_chunk_hint(),
            "user continued saved assessment"
        );
        Ok(next)
    }

    /// Discard the offered session and start over.
    ///
    /// Clears every draft in the namespace, then removes the token from the
    /// URL in place, then moves to `Fresh`.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` when nothing is being offered or the
    /// controller was torn down.
    pub async fn start_fresh(&self) -> Result<ResumeState, TransitionError> {
        self.ensure_mounted()?;
        {
            let guard = self.lock_state();
            if !matches!(&*guard, ResumeState::Prompt(_)) {
                return Err(TransitionError::NotPrompting {
                    state: guard.label(),
                });
            }
        }

        let removed = self.deps.drafts.clear_all().await;
        strip_token(self.deps.address.as_ref());

        self.ensure_mounted()?;
        let mut guard = self.lock_state();
        if !matches!(&*guard, ResumeState::Prompt(_)) {
            return Err(TransitionError::NotPrompting {
                state: guard.label(),
            });
        }
        *guard = ResumeState::Fresh;
        drop(guard);
        tracing::info!(removed_drafts = removed, "user started assessment fresh");
        Ok(ResumeState::Fresh)
    }

    /// Detach from the page. In-flight checks are discarded when they land.
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
        tracing::debug!("resume controller torn down");
    }

    async fn lookup(&self, token: &SessionToken) -> Result<SessionDescriptor, ResumeMiss> {
        let timeout = self.deps.config.timeout;
        let result = tokio::time::timeout(timeout, self.deps.gateway.resume(token)).await;
        let descriptor = match result {
            Err(_elapsed) => return Err(ResumeMiss::Failed(GatewayError::Timeout(timeout))),
            Ok(Err(err)) => return Err(ResumeMiss::Failed(err)),
            Ok(Ok(None)) => return Err(ResumeMiss::NotFound),
            Ok(Ok(Some(descriptor))) => descriptor,
        };
        if descriptor.version() != self.identity.version {
            return Err(ResumeMiss::VersionMismatch {
                requested: self.identity.version,
                found: descriptor.version(),
            });
        }
        Ok(descriptor)
    }

    async fn prompt_for(&self, descriptor: SessionDescriptor) -> ResumeState {
        let drafts = self.matching_drafts(&descriptor).await;
        tracing::info!(
            outcome = "prompt",
            version = %descriptor.version(),
            chunk = descriptor.current_chunk(),
            total_chunks = descriptor.total_chunks(),
            drafts = drafts.as_ref().map_or(0, DraftAnswers::len),
            "resumable assessment found"
        );
        ResumeState::Prompt(ResumePrompt { descriptor, drafts })
    }

    /// Drafts saved for exactly this session and chunk, limited to its questions.
    async fn matching_drafts(&self, descriptor: &SessionDescriptor) -> Option<DraftAnswers> {
        let snapshot = self.deps.drafts.get(descriptor.version()).await?;
        if !snapshot.matches(descriptor.token(), descriptor.current_chunk()) {
            tracing::debug!(
                draft_chunk = snapshot.chunk,
                chunk = descriptor.current_chunk(),
                "ignoring stale draft"
            );
            return None;
        }
        let mut answers = snapshot.answers;
        answers.retain(|id| descriptor.has_question(id));
        (!answers.is_empty()).then_some(answers)
    }

    async fn fall_back_to_fresh(&self, miss: &ResumeMiss) -> ResumeState {
        match miss {
            ResumeMiss::Failed(err) => tracing::warn!(
                outcome = "fresh",
                reason = miss.reason(),
                error = %err,
                "resume check failed"
            ),
            ResumeMiss::VersionMismatch { requested, found } => tracing::info!(
                outcome = "fresh",
                reason = miss.reason(),
                %requested,
                %found,
                "resume token belongs to another version"
            ),
            ResumeMiss::NotFound => tracing::info!(
                outcome = "fresh",
                reason = miss.reason(),
                "resume token not recognized"
            ),
        }
        strip_token(self.deps.address.as_ref());
        self.deps.drafts.clear_all().await;
        ResumeState::Fresh
    }

    fn discard(&self, ticket: u64) -> ResolveOutcome {
        tracing::debug!(ticket, torn_down = self.is_torn_down(), "resume result discarded");
        ResolveOutcome::Discarded
    }

    fn is_current(&self, ticket: u64) -> bool {
        !self.is_torn_down() && self.generation.load(Ordering::Acquire) == ticket
    }

    /// Reserve the fallback for `ticket`. Fails if a newer check already started.
    fn claim_fallback(&self, ticket: u64) -> bool {
        let _guard = self.lock_state();
        if !self.is_current(ticket) {
            return false;
        }
        self.settling.store(true, Ordering::Release);
        true
    }

    fn ensure_mounted(&self) -> Result<(), TransitionError> {
        if self.is_torn_down() {
            Err(TransitionError::TornDown)
        } else {
            Ok(())
        }
    }

    fn current_chunk_hint(&self) -> u32 {
        self.lock_state()
            .prompt()
            .map_or(0, |prompt| prompt.descriptor.current_chunk())
    }

    fn lock_state(&self) -> MutexGuard<'_, ResumeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ResumeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeController")
            .field("identity", &self.identity)
            .field("state", &self.lock_state().label())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .field("settling", &self.settling.load(Ordering::Relaxed))
            .field("torn_down", &self.is_torn_down())
            .finish_non_exhaustive()
    }
}
