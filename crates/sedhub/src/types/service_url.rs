//! Upstream service URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::ConfigError;

/// A validated upstream endpoint URL.
///
/// The URL must be absolute, carry a host and use HTTPS (HTTP is accepted
/// only for localhost, which is what test doubles listen on).
///
/// # Example
///
/// ```
/// use sedhub::ServiceUrl;
///
/// let url = ServiceUrl::new("https://sedintegracoes.educacao.sp.gov.br/credenciais/api/LoginCompletoToken").unwrap();
/// assert_eq!(url.host(), Some("sedintegracoes.educacao.sp.gov.br"));
/// assert!(ServiceUrl::new("http://example.com/token").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    /// Create a new service URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the URL is malformed or insecure.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ConfigError> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| ConfigError::InvalidUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), ConfigError> {
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            });
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(ConfigError::InvalidUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            });
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceUrl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServiceUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServiceUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ServiceUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
