//! HTTP client shared by every upstream call.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::auth::{AccessToken, SubscriptionKey};
use crate::error::{ConfigError, StatusError, TransportError, UpstreamError};
use crate::types::ServiceUrl;

use super::endpoints::SUBSCRIPTION_KEY_HEADER;

/// HTTP client for upstream JSON requests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a new client with a fixed User-Agent and optional timeout.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| ConfigError::Client {
            message: e.to_string(),
        })?;

        Ok(Self { client })
    }

    /// Make an authenticated GET request.
    #[instrument(skip(self, url, token, key), fields(url = %url))]
    pub async fn get_authed<Q>(
        &self,
        url: &ServiceUrl,
        params: &Q,
        token: &AccessToken,
        key: &SubscriptionKey,
    ) -> Result<Value, UpstreamError>
    where
        Q: Serialize + std::fmt::Debug,
    {
        debug!("authenticated GET");
        trace!(?params, "query parameters");

        let mut headers = Self::key_headers(key)?;
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", token.as_str()))?,
        );

        let response = self
            .client
            .get(url.as_url().clone())
            .query(params)
            .headers(headers)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make a JSON POST request with extra headers.
    #[instrument(skip(self, url, body, headers), fields(url = %url))]
    pub async fn post<B>(
        &self,
        url: &ServiceUrl,
        body: &B,
        headers: HeaderMap,
    ) -> Result<Value, UpstreamError>
    where
        B: Serialize,
    {
        debug!("POST");

        let response = self
            .client
            .post(url.as_url().clone())
            .json(body)
            .headers(headers)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Headers carrying a gateway subscription key.
    pub fn key_headers(key: &SubscriptionKey) -> Result<HeaderMap, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(SUBSCRIPTION_KEY_HEADER),
            header_value(key.as_str())?,
        );
        Ok(headers)
    }

    /// Handle a response, decoding the JSON body or capturing the error body.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, UpstreamError> {
        let status = response.status();
        trace!(status = %status, "upstream response");

        let body = response.text().await.map_err(TransportError::from)?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| UpstreamError::Decode {
                message: e.to_string(),
            })
        } else {
            Err(UpstreamError::Status(StatusError::from_body(
                status.as_u16(),
                body,
            )))
        }
    }
}

/// Build a header value, rejecting characters HTTP cannot carry.
pub fn header_value(value: &str) -> Result<HeaderValue, UpstreamError> {
    HeaderValue::from_str(value).map_err(|_| {
        UpstreamError::Transport(TransportError::Http {
            message: "header value contains invalid characters".to_string(),
        })
    })
}
