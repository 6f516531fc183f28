//! Login credentials type.

use std::fmt;

use serde::Deserialize;

use crate::error::ValidationError;

/// Login credentials for the identity service.
///
/// Holds the student login (`user`) and the account password. Both are
/// supplied per request and never persisted.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use sedhub::Credentials;
///
/// let creds = Credentials::new("000123456789sp", "secret");
/// assert_eq!(creds.user(), "000123456789sp");
/// assert!(creds.validate().is_ok());
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    user: String,
    #[serde(alias = "senha")]
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Returns the user login.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the identity request.
    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Check that both fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for the first empty field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user.is_empty() {
            return Err(ValidationError::MissingField { field: "user" });
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField { field: "password" });
        }
        Ok(())
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_password_in_debug() {
        let creds = Credentials::new("student", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("student"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn missing_fields_fail_validation() {
        let err = Credentials::new("", "secret").validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field: "user" }));

        let err = Credentials::new("student", "").validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField { field: "password" }
        ));
    }

    #[test]
    fn whitespace_is_passed_upstream_as_is() {
        assert!(Credentials::new(" ", "secret").validate().is_ok());
        assert!(Credentials::new("student", "  ").validate().is_ok());
    }

    #[test]
    fn deserializes_request_body() {
        let creds: Credentials =
            serde_json::from_str(r#"{"user":"student","password":"pw"}"#).unwrap();
        assert!(creds.validate().is_ok());

        let creds: Credentials = serde_json::from_str(r#"{"user":"student","senha":"pw"}"#).unwrap();
        assert_eq!(creds.password(), "pw");

        let creds: Credentials = serde_json::from_str(r#"{"user":"student"}"#).unwrap();
        assert!(creds.validate().is_err());
    }
}
