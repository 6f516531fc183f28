//! Aggregator configuration.
//!
//! Endpoint URLs default to the public platform endpoints. Subscription keys
//! have no defaults and must be injected at process start.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::auth::SubscriptionKey;
use crate::error::ConfigError;
use crate::types::ServiceUrl;

/// Default identity (login) endpoint.
pub const DEFAULT_IDENTITY_URL: &str =
    "https://sedintegracoes.educacao.sp.gov.br/credenciais/api/LoginCompletoToken";

/// Default class-listing endpoint.
pub const DEFAULT_CLASSES_URL: &str =
    "https://sedintegracoes.educacao.sp.gov.br/apihubintegracoes/api/v2/Turma/ListarTurmasPorAluno";

/// Default term-periods endpoint.
pub const DEFAULT_TERM_PERIODS_URL: &str =
    "https://sedintegracoes.educacao.sp.gov.br/apihubintegracoes/api/v2/Bimestre/ListarBimestres";

/// Default secondary registration token endpoint.
pub const DEFAULT_SECONDARY_TOKEN_URL: &str = "https://edusp-api.ip.tv/registration/edusp/token";

/// Default User-Agent sent upstream.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Configuration for an [`Aggregator`](crate::Aggregator).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity endpoint (Step 1).
    pub identity_url: ServiceUrl,
    /// Class-listing endpoint (Step 2).
    pub classes_url: ServiceUrl,
    /// Term-periods endpoint (Step 3).
    pub term_periods_url: ServiceUrl,
    /// Secondary registration token endpoint (Step 4).
    pub secondary_token_url: ServiceUrl,

    /// Subscription key for the identity endpoint.
    pub identity_subscription_key: SubscriptionKey,
    /// Subscription key shared by the class-listing and term-periods endpoints.
    pub records_subscription_key: SubscriptionKey,

    /// User-Agent header for every upstream request.
    pub user_agent: String,
    /// `x-api-platform` header for the secondary token request.
    pub secondary_platform: String,
    /// `x-api-realm` header for the secondary token request.
    pub secondary_realm: String,

    /// Per-request timeout. `None` keeps the transport default.
    pub timeout_secs: Option<u64>,
    /// Run the secondary token step alongside the class and term fetches.
    pub concurrent_secondary_token: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity_url: default_url(DEFAULT_IDENTITY_URL),
            classes_url: default_url(DEFAULT_CLASSES_URL),
            term_periods_url: default_url(DEFAULT_TERM_PERIODS_URL),
            secondary_token_url: default_url(DEFAULT_SECONDARY_TOKEN_URL),
            identity_subscription_key: SubscriptionKey::default(),
            records_subscription_key: SubscriptionKey::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            secondary_platform: "android".to_string(),
            secondary_realm: "edusp".to_string(),
            timeout_secs: None,
            concurrent_secondary_token: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file_error = |message: String| ConfigError::File {
            path: path.display().to_string(),
            message,
        };

        let json = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| file_error(e.to_string()))
    }

    /// Check that the configuration can drive the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] if a subscription key is unset.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_subscription_key.is_empty() {
            return Err(ConfigError::MissingKey {
                name: "identity_subscription_key",
            });
        }
        if self.records_subscription_key.is_empty() {
            return Err(ConfigError::MissingKey {
                name: "records_subscription_key",
            });
        }
        Ok(())
    }

    /// Per-request timeout as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_url(s: &str) -> ServiceUrl {
    ServiceUrl::new(s).expect("built-in endpoint URL is valid")
}
