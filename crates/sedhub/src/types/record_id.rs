//! Upstream record identifier type.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A non-empty identifier issued by the records platform.
///
/// The platform is inconsistent about whether identifiers such as
/// `codigoAluno` and `escolaId` are JSON strings or numbers, so both are
/// accepted and normalised to their string form.
///
/// # Example
///
/// ```
/// use sedhub::types::RecordId;
/// use serde_json::json;
///
/// assert_eq!(RecordId::from_json(&json!(981)).unwrap().as_str(), "981");
/// assert_eq!(RecordId::from_json(&json!("981")).unwrap().as_str(), "981");
/// assert!(RecordId::from_json(&json!(null)).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create an identifier from a string, rejecting blank values.
    pub fn new(s: impl Into<String>) -> Option<Self> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(Self(s))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Read an identifier from a JSON string or integer.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::new(n.to_string()),
            _ => None,
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_whitespace() {
        assert_eq!(RecordId::new(" 12 ").unwrap().as_str(), "12");
    }

    #[test]
    fn rejects_blank_and_non_scalar_values() {
        assert!(RecordId::new("   ").is_none());
        assert!(RecordId::from_json(&json!(1.5)).is_none());
        assert!(RecordId::from_json(&json!({"id": 1})).is_none());
        assert!(RecordId::from_json(&json!(true)).is_none());
    }
}
