//! In-place updates of the page URL.
//!
//! Replacing the address never triggers a navigation or reload; only the
//! visible URL changes, so a later reload sees the new query parameters.

use std::sync::{Arc, Mutex, PoisonError};

use assessment_core::identity::{TOKEN_PARAM, UPGRADE_FROM_PARAM, with_param, without_params};
use assessment_core::model::SessionToken;
use url::Url;

/// Read and replace the current page URL.
pub trait AddressBar: Send + Sync {
    fn current(&self) -> Url;

    /// Replace the URL in place (no navigation, no history entry).
    fn replace(&self, url: Url);
}

/// Remove the resume token from the address bar.
pub fn strip_token(address: &dyn AddressBar) {
    let current = address.current();
    let stripped = without_params(&current, &[TOKEN_PARAM]);
    if stripped != current {
        address.replace(stripped);
    }
}

/// Put `token` in the address bar and drop a consumed `upgrade_from`.
pub fn adopt_token(address: &dyn AddressBar, token: &SessionToken) {
    let current = address.current();
    let updated = with_param(
        &without_params(&current, &[UPGRADE_FROM_PARAM]),
        TOKEN_PARAM,
        token.as_str(),
    );
    if updated != current {
        address.replace(updated);
    }
}

/// Shared in-process address bar.
///
/// Clones share the same URL. `replacements` counts in-place updates so tests
/// can assert that nothing navigated.
#[derive(Clone, Debug)]
pub struct MemoryAddressBar {
    inner: Arc<Mutex<AddressState>>,
}

#[derive(Debug)]
struct AddressState {
    url: Url,
    replacements: usize,
}

impl MemoryAddressBar {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AddressState {
                url,
                replacements: 0,
            })),
        }
    }

    /// # Errors
    ///
    /// Returns `url::ParseError` if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(raw)?))
    }

    #[must_use]
    pub fn replacements(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replacements
    }
}

impl AddressBar for MemoryAddressBar {
    fn current(&self) -> Url {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .url
            .clone()
    }

    fn replace(&self, url: Url) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(url = %url, "address replaced in place");
        guard.url = url;
        guard.replacements += 1;
    }
}
