use serde::{Deserialize, Serialize};
use std::fmt;

/// Which assessment the user is taking.
///
/// A session keeps its version for its whole lifetime. A deep session can be
/// started from a quick one (an upgrade), but the quick session is never
/// rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentVersion {
    #[default]
    Quick,
    Deep,
}

impl AssessmentVersion {
    /// Normalize the `version` query parameter.
    ///
    /// Only the literal `deep` selects the deep assessment; anything else,
    /// including a missing value, falls back to quick.
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("deep") => Self::Deep,
            _ => Self::Quick,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Deep => "deep",
        }
    }
}

impl fmt::Display for AssessmentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
