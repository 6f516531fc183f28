//! Authentication types.
//!
//! Credentials go in, an [`AuthResult`] comes out of the identity step and
//! carries the bearer token every later authenticated call needs.

mod credentials;
mod login;
mod tokens;

pub use credentials::Credentials;
pub use login::AuthResult;
pub use tokens::{AccessToken, SubscriptionKey};
