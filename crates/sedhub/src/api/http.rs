//! Network-backed implementation of [`RecordsApi`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::auth::{AccessToken, Credentials, SubscriptionKey};
use crate::config::Config;
use crate::error::{ConfigError, UpstreamError};
use crate::types::{RecordId, ServiceUrl};

use super::RecordsApi;
use super::client::{HttpClient, header_value};
use super::endpoints::{
    API_PLATFORM_HEADER, API_REALM_HEADER, ListClassesQuery, ListTermPeriodsQuery, LoginRequest,
    SecondaryTokenRequest,
};

/// Talks to the real platform endpoints named in a [`Config`].
#[derive(Debug, Clone)]
pub struct HttpRecordsApi {
    client: HttpClient,
    identity_url: ServiceUrl,
    classes_url: ServiceUrl,
    term_periods_url: ServiceUrl,
    secondary_token_url: ServiceUrl,
    identity_key: SubscriptionKey,
    records_key: SubscriptionKey,
    platform: String,
    realm: String,
}

impl HttpRecordsApi {
    /// Build the API from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = HttpClient::new(&config.user_agent, config.timeout())?;

        Ok(Self {
            client,
            identity_url: config.identity_url.clone(),
            classes_url: config.classes_url.clone(),
            term_periods_url: config.term_periods_url.clone(),
            secondary_token_url: config.secondary_token_url.clone(),
            identity_key: config.identity_subscription_key.clone(),
            records_key: config.records_subscription_key.clone(),
            platform: config.secondary_platform.clone(),
            realm: config.secondary_realm.clone(),
        })
    }

    fn secondary_headers(&self) -> Result<HeaderMap, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(API_PLATFORM_HEADER),
            header_value(&self.platform)?,
        );
        headers.insert(
            HeaderName::from_static(API_REALM_HEADER),
            header_value(&self.realm)?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl RecordsApi for HttpRecordsApi {
    #[instrument(skip(self, credentials))]
    async fn login(&self, credentials: &Credentials) -> Result<Value, UpstreamError> {
        debug!("Requesting login token");

        let request = LoginRequest {
            user: credentials.user(),
            senha: credentials.password(),
        };
        let headers = HttpClient::key_headers(&self.identity_key)?;

        self.client.post(&self.identity_url, &request, headers).await
    }

    #[instrument(skip(self, token, student_id), fields(%student_id))]
    async fn list_classes(
        &self,
        token: &AccessToken,
        student_id: &RecordId,
    ) -> Result<Value, UpstreamError> {
        debug!("Listing classes");

        let query = ListClassesQuery {
            codigo_aluno: student_id.as_str(),
        };

        self.client
            .get_authed(&self.classes_url, &query, token, &self.records_key)
            .await
    }

    #[instrument(skip(self, token, school_id), fields(%school_id))]
    async fn list_term_periods(
        &self,
        token: &AccessToken,
        school_id: &RecordId,
    ) -> Result<Value, UpstreamError> {
        debug!("Listing term periods");

        let query = ListTermPeriodsQuery {
            escola_id: school_id.as_str(),
        };

        self.client
            .get_authed(&self.term_periods_url, &query, token, &self.records_key)
            .await
    }

    #[instrument(skip(self))]
    async fn request_secondary_token(&self) -> Result<Value, UpstreamError> {
        debug!("Requesting secondary registration token");

        // Unauthenticated: no bearer token is attached to this request.
        let headers = self.secondary_headers()?;

        self.client
            .post(&self.secondary_token_url, &SecondaryTokenRequest {}, headers)
            .await
    }
}
