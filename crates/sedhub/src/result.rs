//! Composite result and its parts.
//!
//! Upstream payloads are kept as opaque JSON and serialised back verbatim;
//! only the fields the pipeline reads are ever inspected.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::Error;
use crate::types::RecordId;

/// Upstream field holding a class's school identifier.
const SCHOOL_ID_FIELD: &str = "escolaId";

/// One class record from the class-listing endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry(Value);

impl ClassEntry {
    /// Wrap a raw class record.
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The school this class belongs to, if the record names one.
    pub fn school_id(&self) -> Option<RecordId> {
        self.0.get(SCHOOL_ID_FIELD).and_then(RecordId::from_json)
    }

    /// The record exactly as received.
    pub fn raw(&self) -> &Value {
        &self.0
    }
}

impl Serialize for ClassEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

/// Ordered class records, in upstream order.
pub type ClassList = Vec<ClassEntry>;

/// Split a class-listing payload into entries. `None` if it is not a JSON array.
pub(crate) fn class_list_from_payload(payload: Value) -> Option<ClassList> {
    match payload {
        Value::Array(items) => Some(items.into_iter().map(ClassEntry::new).collect()),
        _ => None,
    }
}

/// Outcome of the secondary registration token step.
///
/// Failures are carried as data and never abort the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SecondaryTokenResult {
    /// The token payload exactly as received.
    Token(Value),
    /// The step failed.
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl SecondaryTokenResult {
    /// Error text for a non-success response or an undecodable body.
    pub const REJECTED: &'static str = "failed to obtain secondary token";

    /// Error text when the service could not be reached.
    pub const UNREACHABLE: &'static str = "could not connect to secondary token service";

    /// The service answered but did not hand out a token.
    pub fn rejected(details: impl Into<String>) -> Self {
        SecondaryTokenResult::Failed {
            error: Self::REJECTED.to_string(),
            details: Some(details.into()),
        }
    }

    /// The service could not be reached.
    pub fn unreachable() -> Self {
        SecondaryTokenResult::Failed {
            error: Self::UNREACHABLE.to_string(),
            details: None,
        }
    }

    /// Whether a token payload was obtained.
    pub fn is_token(&self) -> bool {
        matches!(self, SecondaryTokenResult::Token(_))
    }
}

/// The single aggregated payload returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    /// Login payload from the identity step, verbatim.
    pub auth_result: Value,
    /// Class records, in upstream order.
    pub class_list: ClassList,
    /// Term periods of the first class's school; `null` when skipped or failed.
    pub term_periods_result: Option<Value>,
    /// Secondary token payload or an embedded error object.
    pub secondary_token_result: SecondaryTokenResult,
}

/// Wire shape for a fatal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self {
            error: err.client_message(),
        }
    }
}
