use std::sync::Arc;

use services::{AddressBar, AssessmentApi, DraftStore, ResumeDeps};

pub trait UiApp: Send + Sync {
    fn resume_deps(&self) -> ResumeDeps;
    fn assessment_api(&self) -> Arc<dyn AssessmentApi>;
}

#[derive(Clone)]
pub struct AppContext {
    resume: ResumeDeps,
    api: Arc<dyn AssessmentApi>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            resume: app.resume_deps(),
            api: app.assessment_api(),
        }
    }

    /// Collaborators for a fresh `ResumeController`; one per page view.
    #[must_use]
    pub fn resume_deps(&self) -> ResumeDeps {
        self.resume.clone()
    }

    #[must_use]
    pub fn assessment_api(&self) -> Arc<dyn AssessmentApi> {
        Arc::clone(&self.api)
    }

    #[must_use]
    pub fn address(&self) -> Arc<dyn AddressBar> {
        Arc::clone(&self.resume.address)
    }

    #[must_use]
    pub fn drafts(&self) -> DraftStore {
        self.resume.drafts.clone()
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
