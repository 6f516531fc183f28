//! Upstream record services.
//!
//! [`RecordsApi`] is the seam between the pipeline and the platform: one
//! method per remote call, each returning the raw JSON payload or the
//! [`UpstreamError`] that call produced. [`HttpRecordsApi`] is the network
//! implementation.

mod client;
mod endpoints;
mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::auth::{AccessToken, Credentials};
use crate::error::UpstreamError;
use crate::types::RecordId;

pub use http::HttpRecordsApi;

/// The remote calls the aggregation pipeline is built from.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    /// Exchange credentials for a login payload (token and student identifier).
    async fn login(&self, credentials: &Credentials) -> Result<Value, UpstreamError>;

    /// List the classes a student is enrolled in.
    async fn list_classes(
        &self,
        token: &AccessToken,
        student_id: &RecordId,
    ) -> Result<Value, UpstreamError>;

    /// List the academic term periods of a school.
    async fn list_term_periods(
        &self,
        token: &AccessToken,
        school_id: &RecordId,
    ) -> Result<Value, UpstreamError>;

    /// Request a registration token from the secondary platform.
    async fn request_secondary_token(&self) -> Result<Value, UpstreamError>;
}
