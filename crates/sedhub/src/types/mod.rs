//! Core value types.
//!
//! These types enforce their invariants at construction time.

mod record_id;
mod service_url;

pub use record_id::RecordId;
pub use service_url::ServiceUrl;
