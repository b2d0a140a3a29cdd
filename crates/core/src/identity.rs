//! Derives the session identity of the assessment page from its URL.
//!
//! Resolution is pure: malformed parameters are normalized, never reported.

use url::Url;
use url::form_urlencoded;

use crate::model::{AssessmentVersion, EntryMode, SessionToken};

pub const VERSION_PARAM: &str = "version";
pub const TOKEN_PARAM: &str = "token";
pub const UPGRADE_FROM_PARAM: &str = "upgrade_from";

/// Version, resume token, and upgrade source carried by the page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionIdentity {
    pub version: AssessmentVersion,
    pub token: Option<SessionToken>,
    pub upgrade_from: Option<SessionToken>,
}

impl SessionIdentity {
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
    }

    /// Resolve from a raw query string, with or without the leading `?`.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            form_urlencoded::parse(query.as_bytes()).map(|(k, v)| (k.into_owned(), v.into_owned())),
        )
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> Self {
        let mut version = None;
        let mut token = None;
        let mut upgrade_from = None;

        // First occurrence wins for repeated parameters.
        for (key, value) in pairs {
            match key.as_str() {
                VERSION_PARAM if version.is_none() => version = Some(value),
                TOKEN_PARAM if token.is_none() => token = Some(value),
                UPGRADE_FROM_PARAM if upgrade_from.is_none() => upgrade_from = Some(value),
                _ => {}
            }
        }

        Self {
            version: AssessmentVersion::from_query(version.as_deref()),
            token: token.as_deref().and_then(SessionToken::parse),
            upgrade_from: upgrade_from.as_deref().and_then(SessionToken::parse),
        }
    }

    /// Classify the page from the URL alone.
    ///
    /// An upgrade always starts fresh, even when a resumable token is also
    /// present. `EntryMode::Resuming` is only reached through user
    /// confirmation and never comes out of URL resolution.
    #[must_use]
    pub fn entry_mode(&self) -> EntryMode {
        if self.upgrade_from.is_some() {
            EntryMode::Upgrading
        } else if self.token.is_some() {
            EntryMode::ResumeCheck
        } else {
            EntryMode::Fresh
        }
    }

    /// The token to validate with the resume gateway, if any.
    #[must_use]
    pub fn resume_token(&self) -> Option<&SessionToken> {
        match self.entry_mode() {
            EntryMode::ResumeCheck => self.token.as_ref(),
            EntryMode::Fresh | EntryMode::Resuming | EntryMode::Upgrading => None,
        }
    }
}

/// Copy of `url` without the named query parameters.
///
/// The `?` is dropped when no parameters remain. Path and fragment are kept.
#[must_use]
pub fn without_params(url: &Url, names: &[&str]) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !names.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    rebuild_query(url, kept)
}

/// Copy of `url` with `name` set to `value`, replacing earlier occurrences.
#[must_use]
pub fn with_param(url: &Url, name: &str, value: &str) -> Url {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.push((name.to_owned(), value.to_owned()));
    rebuild_query(url, pairs)
}

fn rebuild_query(url: &Url, pairs: Vec<(String, String)>) -> Url {
    let mut out = url.clone();
    if pairs.is_empty() {
        out.set_query(None);
    } else {
        out.query_pairs_mut().clear().extend_pairs(pairs);
    }
    out
}
