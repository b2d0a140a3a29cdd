use std::env;
use std::time::Duration;

/// Upper bound on how long the page waits for a resume check.
pub const DEFAULT_RESUME_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the external assessment service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl AssessmentApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read `ASSESSMENT_API_BASE_URL`. Returns `None` when unset or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("ASSESSMENT_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self::new(base_url.trim()))
    }
}

/// Tuning for the resume state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResumeConfig {
    pub timeout: Duration,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RESUME_TIMEOUT,
        }
    }
}

impl ResumeConfig {
    /// Read `ASSESSMENT_RESUME_TIMEOUT_MS`, falling back to the default for
    /// missing, unparsable, or zero values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_timeout_ms(env::var("ASSESSMENT_RESUME_TIMEOUT_MS").ok().as_deref())
    }

    fn from_timeout_ms(raw: Option<&str>) -> Self {
        let timeout = raw
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_RESUME_TIMEOUT, Duration::from_millis);
        Self { timeout }
    }
}
