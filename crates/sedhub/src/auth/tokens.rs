//! Opaque secret types.

use std::fmt;

use serde::Deserialize;

/// A bearer token issued by the identity service.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// An API subscription key sent with every request to a gateway-fronted service.
///
/// Keys are injected through configuration, never compiled in.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionKey(String);

impl SubscriptionKey {
    /// Create a new subscription key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key value for use in request headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is unset.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.is_empty() { "[UNSET]" } else { "[REDACTED]" };
        f.debug_tuple("SubscriptionKey").field(&shown).finish()
    }
}
