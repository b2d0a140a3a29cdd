//! Best-effort local persistence of in-progress answers.
//!
//! Every failure here is logged and swallowed: a broken device store behaves
//! like an empty one, and never decides whether a session resumes.

use std::sync::Arc;

use assessment_core::Clock;
use assessment_core::model::{AssessmentVersion, DraftAnswers, DraftSnapshot, SessionToken};
use storage::repository::{DEFAULT_NAMESPACE, DraftRepository};

#[derive(Clone)]
pub struct DraftStore {
    repo: Arc<dyn DraftRepository>,
    namespace: String,
    clock: Clock,
}

impl DraftStore {
    #[must_use]
    pub fn new(repo: Arc<dyn DraftRepository>) -> Self {
        Self {
            repo,
            namespace: DEFAULT_NAMESPACE.to_owned(),
            clock: Clock::system(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, version: AssessmentVersion) -> String {
        format!("{}{}:draft", self.namespace, version)
    }

    /// Read the saved snapshot for `version`, if any.
    pub async fn get(&self, version: AssessmentVersion) -> Option<DraftSnapshot> {
        let key = self.key(version);
        let raw = match self.repo.get_entry(&key).await {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(%key, error = %err, "draft read failed; treating as empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(%key, error = %err, "undecodable draft ignored");
                None
            }
        }
    }

    /// Save the complete answer set for `chunk`, replacing what was there.
    pub async fn set(
        &self,
        version: AssessmentVersion,
        token: Option<&SessionToken>,
        chunk: u32,
        answers: &DraftAnswers,
    ) {
        let snapshot = DraftSnapshot {
            token: token.cloned(),
            chunk,
            answers: answers.clone(),
            saved_at: self.clock.now(),
        };
        self.put(version, &snapshot).await;
    }

    /// Write a prepared snapshot as-is.
    pub async fn put(&self, version: AssessmentVersion, snapshot: &DraftSnapshot) {
        let key = self.key(version);
        let raw = match serde_json::to_string(snapshot) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%key, error = %err, "draft encode failed");
                return;
            }
        };
        if let Err(err) = self.repo.put_entry(&key, &raw).await {
            tracing::warn!(%key, error = %err, "draft write failed");
        }
    }

    pub async fn clear(&self, version: AssessmentVersion) {
        let key = self.key(version);
        if let Err(err) = self.repo.remove_entry(&key).await {
            tracing::warn!(%key, error = %err, "draft clear failed");
        }
    }

    /// Remove every key under the namespace, whatever version wrote it.
    ///
    /// Returns how many keys were removed.
    pub async fn clear_all(&self) -> usize {
        let keys = match self.repo.keys_with_prefix(&self.namespace).await {
            Ok(keys) => keys,
            Err(err) => {
                tracing::warn!(namespace = %self.namespace, error = %err, "draft sweep failed");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            match self.repo.remove_entry(&key).await {
                Ok(()) => removed += 1,
                Err(err) => tracing::warn!(%key, error = %err, "draft sweep skipped key"),
            }
        }
        tracing::debug!(namespace = %self.namespace, removed, "draft namespace cleared");
        removed
    }
}
