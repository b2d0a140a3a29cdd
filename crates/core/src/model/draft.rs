use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{QuestionId, SessionToken};

/// A single in-progress answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Position on an agreement scale.
    Scale(i64),
    Text(String),
}

/// Answers the user has entered for the chunk they are on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftAnswers(BTreeMap<QuestionId, AnswerValue>);

impl DraftAnswers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: QuestionId, value: AnswerValue) -> Option<AnswerValue> {
        self.0.insert(id, value)
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.0.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.0.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerValue)> {
        self.0.iter()
    }

    /// Keep only answers whose question satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&QuestionId) -> bool) {
        self.0.retain(|id, _| keep(id));
    }
}

impl FromIterator<(QuestionId, AnswerValue)> for DraftAnswers {
    fn from_iter<T: IntoIterator<Item = (QuestionId, AnswerValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What the draft store keeps for one assessment version.
///
/// `answers` only make sense for `chunk`; a snapshot for another chunk is
/// stale and must not be offered back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionToken>,
    pub chunk: u32,
    pub answers: DraftAnswers,
    pub saved_at: DateTime<Utc>,
}

impl DraftSnapshot {
    /// True when this snapshot was written for `chunk` of the session `token`.
    ///
    /// Snapshots written before the service minted a token carry none and
    /// match any token.
    #[must_use]
    pub fn matches(&self, token: &SessionToken, chunk: u32) -> bool {
        self.chunk == chunk && self.token.as_ref().is_none_or(|t| t == token)
    }
}
