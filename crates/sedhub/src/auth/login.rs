//! Parsed outcome of the identity step.

use serde_json::Value;

use crate::error::AuthError;
use crate::types::RecordId;

use super::tokens::AccessToken;

/// Upstream field holding the bearer token.
const TOKEN_FIELD: &str = "token";

/// Upstream field holding the student identifier.
const STUDENT_ID_FIELD: &str = "codigoAluno";

/// The identity service's answer to a successful login.
///
/// Only the token and the student identifier are read; the full payload is
/// kept verbatim for the composite result.
#[derive(Clone)]
pub struct AuthResult {
    access_token: AccessToken,
    student_id: RecordId,
    raw: Value,
}

impl AuthResult {
    /// Extract the fields the pipeline needs from a login payload.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] without status if the token or student
    /// identifier is missing or empty.
    pub fn from_payload(raw: Value) -> Result<Self, AuthError> {
        let access_token = raw
            .get(TOKEN_FIELD)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| AuthError::unavailable("identity response carried no token"))?;

        let student_id = raw
            .get(STUDENT_ID_FIELD)
            .and_then(RecordId::from_json)
            .ok_or_else(|| {
                AuthError::unavailable("identity response carried no student identifier")
            })?;

        Ok(Self {
            access_token,
            student_id,
            raw,
        })
    }

    /// Bearer token for the authenticated record endpoints.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Student identifier keyed on by the class-listing endpoint.
    pub fn student_id(&self) -> &RecordId {
        &self.student_id
    }

    /// The login payload exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consume and return the login payload.
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResult")
            .field("student_id", &self.student_id)
            .field("access_token", &self.access_token)
            .field("raw", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_token_and_numeric_student_id() {
        let result = AuthResult::from_payload(json!({
            "token": "abc",
            "codigoAluno": 1234567,
            "nome": "Aluno"
        }))
        .unwrap();

        assert_eq!(result.access_token().as_str(), "abc");
        assert_eq!(result.student_id().as_str(), "1234567");
        assert_eq!(result.raw()["nome"], "Aluno");
    }

    #[test]
    fn missing_token_is_an_auth_error() {
        let err = AuthResult::from_payload(json!({ "codigoAluno": "1" })).unwrap_err();
        assert!(err.status.is_none());
        assert!(err.message.contains("token"));
    }

    #[test]
    fn empty_student_id_is_an_auth_error() {
        let err = AuthResult::from_payload(json!({ "token": "t", "codigoAluno": "" })).unwrap_err();
        assert!(err.message.contains("student"));
    }

    #[test]
    fn debug_hides_payload_and_token() {
        let result = AuthResult::from_payload(json!({
            "token": "secret-token",
            "codigoAluno": "42"
        }))
        .unwrap();
        let debug = format!("{:?}", result);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("42"));
    }
}
