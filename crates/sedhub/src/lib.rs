//! sedhub - Aggregation pipeline for the SED school-records platform
//!
//! This library authenticates a student against the identity service and then
//! fans out to the dependent record endpoints, folding every result into one
//! [`CompositeResult`]. All remote calls flow through an [`Aggregator`].
//!
//! # Example
//!
//! ```no_run
//! use sedhub::{Aggregator, Config, Credentials, SubscriptionKey};
//!
//! # async fn example() -> Result<(), sedhub::Error> {
//! let config = Config {
//!     identity_subscription_key: SubscriptionKey::new("identity-key"),
//!     records_subscription_key: SubscriptionKey::new("records-key"),
//!     ..Config::default()
//! };
//!
//! let aggregator = Aggregator::from_config(config)?;
//! let credentials = Credentials::new("student-ra", "password");
//! let composite = aggregator.aggregate(&credentials).await?;
//!
//! println!("{} classes", composite.class_list.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod result;
pub mod types;

// Re-export primary types at crate root for convenience
pub use api::{HttpRecordsApi, RecordsApi};
pub use auth::{AccessToken, AuthResult, Credentials, SubscriptionKey};
pub use config::Config;
pub use error::Error;
pub use pipeline::{Aggregator, Stage};
pub use result::{ClassEntry, ClassList, CompositeResult, ErrorBody, SecondaryTokenResult};
pub use types::ServiceUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
