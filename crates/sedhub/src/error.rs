//! Error types for the sedhub library.
//!
//! [`Error`] holds the fatal outcomes of the pipeline. Per-call failures are
//! reported as [`UpstreamError`] and only become fatal when the pipeline step
//! that produced them is required.

use std::fmt;
use thiserror::Error;

/// Status reported when no upstream status applies.
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Status reported for rejected input.
pub const BAD_REQUEST: u16 = 400;

/// The fatal error type for sedhub operations.
///
/// Each variant aborts the pipeline before a composite result is assembled.
#[derive(Debug, Error)]
pub enum Error {
    /// Required request input is missing; no remote call was made.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The identity service rejected the credentials or could not be used.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A required dependent fetch failed.
    #[error("dependency error: {0}")]
    Dependency(#[from] DependencyError),

    /// The aggregator was built from an unusable configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// HTTP-style status code a surrounding service should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => BAD_REQUEST,
            Error::Auth(err) => err.status.unwrap_or(INTERNAL_SERVER_ERROR),
            Error::Dependency(_) | Error::Config(_) => INTERNAL_SERVER_ERROR,
        }
    }

    /// Message meant for the caller, without the variant prefix.
    pub fn client_message(&self) -> String {
        match self {
            Error::Validation(err) => err.to_string(),
            Error::Auth(err) => err.to_string(),
            Error::Dependency(err) => err.to_string(),
            Error::Config(_) => "internal server error".to_string(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A credential field was empty or absent.
    #[error("user and password are required (missing {field})")]
    MissingField { field: &'static str },
}

/// Authentication failure at the identity service.
#[derive(Debug)]
pub struct AuthError {
    /// Upstream status code, when the service answered at all.
    pub status: Option<u16>,
    /// Human-readable reason.
    pub message: String,
}

impl AuthError {
    /// Message used when the service gives no reason of its own.
    pub const GENERIC_MESSAGE: &'static str = "invalid credentials";

    /// The identity service answered with a non-success status.
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        Self {
            status: Some(status),
            message: message.unwrap_or_else(|| Self::GENERIC_MESSAGE.to_string()),
        }
    }

    /// The identity service could not be used (unreachable or malformed reply).
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "authentication failed: {}", self.message)
    }
}

impl std::error::Error for AuthError {}

/// Failure of a required dependent step.
///
/// The message deliberately omits the upstream cause.
#[derive(Debug, Error)]
pub enum DependencyError {
    /// The class list could not be fetched or decoded.
    #[error("could not fetch class data")]
    ClassList,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required subscription key was not provided.
    #[error("missing subscription key '{name}'")]
    MissingKey { name: &'static str },

    /// A configured endpoint is not a usable URL.
    #[error("invalid service URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    /// A configuration file could not be read or parsed.
    #[error("could not load configuration from {path}: {message}")]
    File { path: String, message: String },

    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client: {message}")]
    Client { message: String },
}

/// Outcome of a single failed upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a non-success status.
    #[error("upstream status: {0}")]
    Status(StatusError),

    /// The service answered with success but the body could not be decoded.
    #[error("undecodable response: {message}")]
    Decode { message: String },
}

impl UpstreamError {
    /// Upstream status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status(err) => Some(err.status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode {
                message: err.to_string(),
            }
        } else {
            UpstreamError::Transport(TransportError::from(err))
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

/// A non-success response from an upstream service.
#[derive(Debug)]
pub struct StatusError {
    /// HTTP status code.
    pub status: u16,
    /// Message field from the error body, if present.
    pub message: Option<String>,
    /// Raw response body text.
    pub body: String,
}

impl StatusError {
    /// Build from a status and the raw body, picking up a `Message`/`message` field.
    pub fn from_body(status: u16, body: String) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                ["Message", "message"]
                    .iter()
                    .find_map(|key| value.get(*key)?.as_str().map(str::to_string))
            })
            .filter(|message| !message.trim().is_empty());

        Self {
            status,
            message,
            body,
        }
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for StatusError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reads_capitalised_message() {
        let err = StatusError::from_body(401, r#"{"Message":"Senha incorreta"}"#.to_string());
        assert_eq!(err.message.as_deref(), Some("Senha incorreta"));
        assert_eq!(err.to_string(), "HTTP 401: Senha incorreta");
    }

    #[test]
    fn status_error_tolerates_plain_text() {
        let err = StatusError::from_body(503, "Service Unavailable".to_string());
        assert!(err.message.is_none());
        assert_eq!(err.body, "Service Unavailable");
    }

    #[test]
    fn auth_error_falls_back_to_generic_message() {
        let err = AuthError::rejected(401, None);
        assert_eq!(err.to_string(), "authentication failed: invalid credentials");
    }

    #[test]
    fn status_codes() {
        let validation = Error::from(ValidationError::MissingField { field: "user" });
        assert_eq!(validation.status_code(), 400);

        let rejected = Error::from(AuthError::rejected(403, Some("blocked".into())));
        assert_eq!(rejected.status_code(), 403);

        let unreachable = Error::from(AuthError::unavailable("connection refused"));
        assert_eq!(unreachable.status_code(), 500);

        assert_eq!(Error::from(DependencyError::ClassList).status_code(), 500);
    }

    #[test]
    fn dependency_message_hides_cause() {
        let err = Error::from(DependencyError::ClassList);
        assert_eq!(err.client_message(), "could not fetch class data");
    }
}
