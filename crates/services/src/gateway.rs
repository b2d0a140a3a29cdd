//! Client side of the external assessment service.
//!
//! `ResumeGateway` is the single operation the resume state machine needs.
//! `AssessmentApi` covers what the question flow hands to the service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use assessment_core::model::{
    AssessmentVersion, DescriptorWire, DraftAnswers, SessionDescriptor, SessionId, SessionToken,
};

use crate::config::AssessmentApiConfig;
use crate::error::GatewayError;

/// Validates a session token and reports the server's view of progress.
#[async_trait]
pub trait ResumeGateway: Send + Sync {
    /// Look up the session behind `token`.
    ///
    /// Returns `Ok(None)` when the token is unknown, expired, or belongs to a
    /// completed assessment.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` for transport, status, or decoding failures.
    async fn resume(&self, token: &SessionToken)
    -> Result<Option<SessionDescriptor>, GatewayError>;
}

/// Answers for one chunk, as handed to the scoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSubmission {
    pub token: SessionToken,
    pub version: AssessmentVersion,
    pub chunk: u32,
    pub answers: DraftAnswers,
}

/// What the service does with a submitted chunk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChunkOutcome {
    /// More chunks remain; `session` describes the next one.
    Next { session: SessionDescriptor },
    /// All chunks answered; results are generated server-side.
    Complete {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },
}

#[async_trait]
pub trait AssessmentApi: Send + Sync {
    /// Create a session, optionally as an upgrade of an earlier quick one.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` for transport, status, or decoding failures.
    async fn start_session(
        &self,
        version: AssessmentVersion,
        upgrade_from: Option<&SessionToken>,
    ) -> Result<SessionDescriptor, GatewayError>;

    /// Submit the answers of the current chunk.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` for transport, status, or decoding failures.
    async fn submit_chunk(&self, submission: &ChunkSubmission)
    -> Result<ChunkOutcome, GatewayError>;
}

/// Map a resume response status: `Ok(true)` has a body, `Ok(false)` means no
/// resumable session.
///
/// # Errors
///
/// Returns `GatewayError::HttpStatus` for any other non-success status.
pub fn classify_resume_status(status: StatusCode) -> Result<bool, GatewayError> {
    if status.is_success() {
        return Ok(true);
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => Ok(false),
        other => Err(GatewayError::HttpStatus(other)),
    }
}

/// Decode a descriptor body and enforce its chunk invariants.
///
/// # Errors
///
/// Returns `GatewayError::Decode` for malformed JSON and
/// `GatewayError::InvalidDescriptor` for out-of-range chunk counters.
pub fn decode_descriptor(body: &str) -> Result<SessionDescriptor, GatewayError> {
    let wire: DescriptorWire = serde_json::from_str(body)?;
    Ok(SessionDescriptor::try_from(wire)?)
}

/// HTTP client for the assessment service.
#[derive(Clone)]
pub struct AssessmentClient {
    client: Client,
    config: Option<AssessmentApiConfig>,
}

impl AssessmentClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(AssessmentApiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<AssessmentApiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&AssessmentApiConfig, GatewayError> {
        self.config.as_ref().ok_or(GatewayError::Disabled)
    }

    fn endpoint(config: &AssessmentApiConfig, path: &str) -> String {
        format!("{}/{path}", config.base_url.trim_end_matches('/'))
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, GatewayError> {
        let config = self.config()?;
        let response = self
            .client
            .post(Self::endpoint(config, path))
            .timeout(config.request_timeout)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

#[derive(Debug, Serialize)]
struct ResumeRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest<'a> {
    version: AssessmentVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    upgrade_from: Option<&'a str>,
}

#[async_trait]
impl ResumeGateway for AssessmentClient {
    async fn resume(
        &self,
        token: &SessionToken,
    ) -> Result<Option<SessionDescriptor>, GatewayError> {
        let response = self
            .post_json(
                "assessment/resume",
                &ResumeRequest {
                    token: token.as_str(),
                },
            )
            .await?;

        if !classify_resume_status(response.status())? {
            return Ok(None);
        }

        let body = response.text().await?;
        decode_descriptor(&body).map(Some)
    }
}

#[async_trait]
impl AssessmentApi for AssessmentClient {
    async fn start_session(
        &self,
        version: AssessmentVersion,
        upgrade_from: Option<&SessionToken>,
    ) -> Result<SessionDescriptor, GatewayError> {
        let response = self
            .post_json(
                "assessment/start",
                &StartRequest {
                    version,
                    upgrade_from: upgrade_from.map(SessionToken::as_str),
                },
            )
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status()));
        }
        let body = response.text().await?;
        decode_descriptor(&body)
    }

    async fn submit_chunk(
        &self,
        submission: &ChunkSubmission,
    ) -> Result<ChunkOutcome, GatewayError> {
        let response = self.post_json("assessment/submit", submission).await?;

        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
