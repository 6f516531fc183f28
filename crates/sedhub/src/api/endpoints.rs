//! Upstream header names and request types.

use serde::Serialize;

/// Gateway subscription key header (`Ocp-Apim-Subscription-Key`).
pub const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";

/// Platform header for the secondary token service.
pub const API_PLATFORM_HEADER: &str = "x-api-platform";

/// Realm header for the secondary token service.
pub const API_REALM_HEADER: &str = "x-api-realm";

/// Request body for the identity endpoint.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub user: &'a str,
    pub senha: &'a str,
}

// Never print the password
impl std::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user", &self.user)
            .field("senha", &"[REDACTED]")
            .finish()
    }
}

/// Query parameters for the class-listing endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClassesQuery<'a> {
    pub codigo_aluno: &'a str,
}

/// Query parameters for the term-periods endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTermPeriodsQuery<'a> {
    pub escola_id: &'a str,
}

/// Request body for the secondary token endpoint. Always empty.
#[derive(Debug, Serialize)]
pub struct SecondaryTokenRequest {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_upstream_names() {
        let query = serde_json::to_value(ListClassesQuery { codigo_aluno: "7" }).unwrap();
        assert_eq!(query["codigoAluno"], "7");

        let query = serde_json::to_value(ListTermPeriodsQuery { escola_id: "9" }).unwrap();
        assert_eq!(query["escolaId"], "9");
    }

    #[test]
    fn login_request_debug_hides_password() {
        let request = LoginRequest {
            user: "student",
            senha: "pw-123",
        };
        assert!(!format!("{:?}", request).contains("pw-123"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"user": "student", "senha": "pw-123"})
        );
    }

    #[test]
    fn secondary_request_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&SecondaryTokenRequest {}).unwrap(), "{}");
    }
}
