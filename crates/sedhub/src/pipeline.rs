//! The aggregation pipeline.
//!
//! Four steps run in a fixed order: authenticate, fetch the class list,
//! fetch the term periods of the first class's school, and fetch the
//! secondary registration token. The first two are required and abort the
//! pipeline on failure; the last two are best-effort and fold their failures
//! into the [`CompositeResult`] as data.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::api::{HttpRecordsApi, RecordsApi};
use crate::auth::{AuthResult, Credentials};
use crate::config::Config;
use crate::error::{AuthError, DependencyError, Error, UpstreamError};
use crate::result::{
    ClassEntry, ClassList, CompositeResult, SecondaryTokenResult, class_list_from_payload,
};

/// Pipeline progress for a single request.
///
/// Stages only move forward. `Failed` is reachable from `Authenticating`
/// and `FetchingClasses` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Authenticating,
    FetchingClasses,
    FetchingTermPeriods,
    FetchingSecondaryToken,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Authenticating => "authenticating",
            Stage::FetchingClasses => "fetching_classes",
            Stage::FetchingTermPeriods => "fetching_term_periods",
            Stage::FetchingSecondaryToken => "fetching_secondary_token",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "pipeline stage");
}

fn fail(err: Error) -> Error {
    warn!(stage = %Stage::Failed, status = err.status_code(), error = %err, "pipeline aborted");
    err
}

/// Runs the aggregation pipeline against a [`RecordsApi`].
///
/// Aggregators are cheap to clone and hold no per-request state: every call
/// to [`aggregate`](Self::aggregate) performs a full, independent sequence of
/// remote calls.
pub struct Aggregator<A = HttpRecordsApi> {
    api: Arc<A>,
    concurrent_secondary_token: bool,
}

impl<A> Clone for Aggregator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            concurrent_secondary_token: self.concurrent_secondary_token,
        }
    }
}

impl<A> fmt::Debug for Aggregator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("concurrent_secondary_token", &self.concurrent_secondary_token)
            .finish_non_exhaustive()
    }
}

impl Aggregator<HttpRecordsApi> {
    /// Build an aggregator that talks to the endpoints named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a subscription key is missing or the
    /// HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let api = HttpRecordsApi::new(&config)?;
        Ok(Self::new(api).with_concurrent_secondary_token(config.concurrent_secondary_token))
    }
}

impl<A: RecordsApi> Aggregator<A> {
    /// Create an aggregator over any [`RecordsApi`].
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            concurrent_secondary_token: false,
        }
    }

    /// Let the secondary token step overlap with the class and term fetches.
    ///
    /// The result and error semantics are identical either way.
    pub fn with_concurrent_secondary_token(mut self, enabled: bool) -> Self {
        self.concurrent_secondary_token = enabled;
        self
    }

    /// Returns the underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for missing credentials (no remote call
    /// is made), [`Error::Auth`] if the identity step fails, and
    /// [`Error::Dependency`] if the class list cannot be fetched. Failures of
    /// the term-periods and secondary-token steps never surface here.
    #[instrument(skip(self, credentials))]
    pub async fn aggregate(&self, credentials: &Credentials) -> Result<CompositeResult> {
        enter(Stage::Init);
        info!("Starting aggregation");

        let auth = self.authenticate(credentials).await.map_err(fail)?;

        let (class_list, term_periods_result, secondary_token_result) =
            if self.concurrent_secondary_token {
                let (records, secondary) = futures_util::future::join(
                    self.fetch_records(&auth),
                    self.fetch_secondary_token(),
                )
                .await;
                let (class_list, term_periods) = records.map_err(fail)?;
                (class_list, term_periods, secondary)
            } else {
                let (class_list, term_periods) = self.fetch_records(&auth).await.map_err(fail)?;
                (class_list, term_periods, self.fetch_secondary_token().await)
            };

        enter(Stage::Done);
        info!(
            classes = class_list.len(),
            term_periods = term_periods_result.is_some(),
            secondary_token = secondary_token_result.is_token(),
            "Aggregation complete"
        );

        Ok(CompositeResult {
            auth_result: auth.into_raw(),
            class_list,
            term_periods_result,
            secondary_token_result,
        })
    }

    /// Steps 2 and 3: the class list and the term periods that depend on it.
    async fn fetch_records(&self, auth: &AuthResult) -> Result<(ClassList, Option<Value>)> {
        let class_list = self.fetch_classes(auth).await?;
        let term_periods = self.fetch_term_periods(auth, &class_list).await;
        Ok((class_list, term_periods))
    }

    /// Step 1: exchange credentials for a token and student identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] before any remote call if a credential
    /// field is empty, or [`Error::Auth`] if the identity service rejects
    /// the login, cannot be reached or answers without the expected fields.
    #[instrument(skip(self, credentials))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResult> {
        credentials.validate()?;

        enter(Stage::Authenticating);
        info!("Logging in");

        let auth = match self.api.login(credentials).await {
            Ok(payload) => AuthResult::from_payload(payload)?,
            Err(UpstreamError::Status(err)) => {
                warn!(status = err.status, "Identity service rejected login");
                return Err(AuthError::rejected(err.status, err.message).into());
            }
            Err(UpstreamError::Transport(err)) => {
                return Err(
                    AuthError::unavailable(format!("could not reach identity service: {err}"))
                        .into(),
                );
            }
            Err(UpstreamError::Decode { message }) => {
                return Err(
                    AuthError::unavailable(format!("invalid identity response: {message}")).into(),
                );
            }
        };

        info!(student_id = %auth.student_id(), "Login succeeded");
        Ok(auth)
    }

    /// Step 2: fetch the student's classes, in upstream order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dependency`] on any failure. The upstream cause is
    /// logged, not returned.
    #[instrument(skip(self, auth), fields(student_id = %auth.student_id()))]
    pub async fn fetch_classes(&self, auth: &AuthResult) -> Result<ClassList> {
        enter(Stage::FetchingClasses);

        let payload = self
            .api
            .list_classes(auth.access_token(), auth.student_id())
            .await
            .map_err(|err| {
                warn!(error = %err, "Class list fetch failed");
                DependencyError::ClassList
            })?;

        let class_list = class_list_from_payload(payload).ok_or_else(|| {
            warn!("Class list response is not an array");
            DependencyError::ClassList
        })?;

        info!(count = class_list.len(), "Classes fetched");
        Ok(class_list)
    }

    /// Step 3: fetch term periods for the first class's school.
    ///
    /// Returns `None` without a remote call when there are no classes or the
    /// first class names no school, and `None` when the call fails.
    #[instrument(skip(self, auth, classes))]
    pub async fn fetch_term_periods(
        &self,
        auth: &AuthResult,
        classes: &[ClassEntry],
    ) -> Option<Value> {
        let Some(first) = classes.first() else {
            debug!("No classes, skipping term periods");
            return None;
        };

        let Some(school_id) = first.school_id() else {
            warn!("First class has no school identifier, skipping term periods");
            return None;
        };

        enter(Stage::FetchingTermPeriods);
        debug!(%school_id, "Fetching term periods");

        match self
            .api
            .list_term_periods(auth.access_token(), &school_id)
            .await
        {
            Ok(payload) => {
                debug!("Term periods fetched");
                Some(payload)
            }
            Err(err) => {
                warn!(error = %err, "Could not fetch term periods");
                None
            }
        }
    }

    /// Step 4: request the secondary registration token.
    ///
    /// Never fails; errors are returned as [`SecondaryTokenResult::Failed`].
    #[instrument(skip(self))]
    pub async fn fetch_secondary_token(&self) -> SecondaryTokenResult {
        enter(Stage::FetchingSecondaryToken);

        match self.api.request_secondary_token().await {
            Ok(payload) => {
                debug!("Secondary token obtained");
                SecondaryTokenResult::Token(payload)
            }
            Err(UpstreamError::Status(err)) => {
                warn!(status = err.status, body = %err.body, "Secondary token rejected");
                SecondaryTokenResult::rejected(err.body)
            }
            Err(UpstreamError::Decode { message }) => {
                warn!(error = %message, "Secondary token response undecodable");
                SecondaryTokenResult::unreachable()
            }
            Err(UpstreamError::Transport(err)) => {
                warn!(error = %err, "Secondary token service unreachable");
                SecondaryTokenResult::unreachable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::error::{StatusError, TransportError};
    use crate::types::RecordId;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Canned upstream behaviour.
    #[derive(Clone)]
    enum Reply {
        Json(Value),
        Status(u16, &'static str),
        Garbled,
        Unreachable,
    }

    impl Reply {
        fn into_result(self) -> std::result::Result<Value, UpstreamError> {
            match self {
                Reply::Json(value) => Ok(value),
                Reply::Status(status, body) => Err(UpstreamError::Status(StatusError::from_body(
                    status,
                    body.to_string(),
                ))),
                Reply::Garbled => Err(UpstreamError::Decode {
                    message: "expected value at line 1 column 1".to_string(),
                }),
                Reply::Unreachable => Err(UpstreamError::Transport(TransportError::Connection {
                    message: "connection refused".to_string(),
                })),
            }
        }
    }

    struct FakeApi {
        login: Reply,
        classes: Reply,
        term_periods: Reply,
        secondary: Reply,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn healthy() -> Self {
            Self {
                login: Reply::Json(json!({"token": "tok-1", "codigoAluno": 555, "nome": "Ana"})),
                classes: Reply::Json(json!([
                    {"escolaId": 10, "nome": "1A"},
                    {"escolaId": 20, "nome": "2B"}
                ])),
                term_periods: Reply::Json(json!([{"bimestre": 1}])),
                secondary: Reply::Json(json!({"auth_token": "edu-1"})),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, prefix: &str) -> usize {
            self.calls().iter().filter(|c| c.starts_with(prefix)).count()
        }
    }

    #[async_trait]
    impl RecordsApi for FakeApi {
        async fn login(
            &self,
            credentials: &Credentials,
        ) -> std::result::Result<Value, UpstreamError> {
            self.record(format!("login:{}", credentials.user()));
            self.login.clone().into_result()
        }

        async fn list_classes(
            &self,
            token: &AccessToken,
            student_id: &RecordId,
        ) -> std::result::Result<Value, UpstreamError> {
            self.record(format!("classes:{}:{}", token.as_str(), student_id));
            self.classes.clone().into_result()
        }

        async fn list_term_periods(
            &self,
            token: &AccessToken,
            school_id: &RecordId,
        ) -> std::result::Result<Value, UpstreamError> {
            self.record(format!("terms:{}:{}", token.as_str(), school_id));
            self.term_periods.clone().into_result()
        }

        async fn request_secondary_token(&self) -> std::result::Result<Value, UpstreamError> {
            self.record("secondary".to_string());
            self.secondary.clone().into_result()
        }
    }

    fn creds() -> Credentials {
        Credentials::new("ana", "pw")
    }

    #[tokio::test]
    async fn missing_password_makes_no_calls() {
        let aggregator = Aggregator::new(FakeApi::healthy());

        let err = aggregator
            .aggregate(&Credentials::new("ana", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.status_code(), 400);
        assert!(aggregator.api().calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_login_stops_pipeline() {
        let api = FakeApi {
            login: Reply::Status(401, r#"{"Message":"Usuário ou senha inválidos"}"#),
            ..FakeApi::healthy()
        };
        let aggregator = Aggregator::new(api);

        let err = aggregator.aggregate(&creds()).await.unwrap_err();

        assert_eq!(err.status_code(), 401);
        assert_eq!(
            err.client_message(),
            "authentication failed: Usuário ou senha inválidos"
        );
        assert_eq!(aggregator.api().calls(), vec!["login:ana".to_string()]);
    }

    #[tokio::test]
    async fn unreachable_identity_service_is_fatal() {
        let api = FakeApi {
            login: Reply::Unreachable,
            ..FakeApi::healthy()
        };
        let aggregator = Aggregator::new(api);

        let err = aggregator.aggregate(&creds()).await.unwrap_err();

        assert!(matches!(err, Error::Auth(AuthError { status: None, .. })));
        assert_eq!(err.status_code(), 500);
        assert_eq!(aggregator.api().calls().len(), 1);
    }

    #[tokio::test]
    async fn class_list_failure_is_a_dependency_error() {
        let api = FakeApi {
            classes: Reply::Status(502, "bad gateway"),
            ..FakeApi::healthy()
        };
        let aggregator = Aggregator::new(api);

        let err = aggregator.aggregate(&creds()).await.unwrap_err();

        assert!(matches!(err, Error::Dependency(DependencyError::ClassList)));
        assert_eq!(err.client_message(), "could not fetch class data");
        assert_eq!(aggregator.api().count("terms"), 0);
        assert_eq!(aggregator.api().count("secondary"), 0);
    }

    #[tokio::test]
    async fn non_array_class_list_is_a_dependency_error() {
        let api = FakeApi {
            classes: Reply::Json(json!({"message": "unexpected"})),
            ..FakeApi::healthy()
        };

        let err = Aggregator::new(api).aggregate(&creds()).await.unwrap_err();
        assert!(matches!(err, Error::Dependency(_)));
    }

    #[tokio::test]
    async fn empty_class_list_skips_term_periods() {
        let api = FakeApi {
            classes: Reply::Json(json!([])),
            ..FakeApi::healthy()
        };
        let aggregator = Aggregator::new(api);

        let composite = aggregator.aggregate(&creds()).await.unwrap();

        assert!(composite.class_list.is_empty());
        assert!(composite.term_periods_result.is_none());
        assert_eq!(aggregator.api().count("terms"), 0);
        assert!(composite.secondary_token_result.is_token());
    }

    #[tokio::test]
    async fn first_class_without_school_skips_term_periods() {
        let api = FakeApi {
            classes: Reply::Json(json!([{"nome": "1A"}, {"escolaId": 7}])),
            ..FakeApi::healthy()
        };
        let aggregator = Aggregator::new(api);

        let composite = aggregator.aggregate(&creds()).await.unwrap();

        assert_eq!(composite.class_list.len(), 2);
        assert!(composite.term_periods_result.is_none());
        assert_eq!(aggregator.api().count("terms"), 0);
    }

    #[tokio::test]
    async fn failing_term_periods_is_soft() {
        let api = FakeApi {
            term_periods: Reply::Status(500, "boom"),
            ..FakeApi::healthy()
        };

        let composite = Aggregator::new(api).aggregate(&creds()).await.unwrap();

        assert!(composite.term_periods_result.is_none());
        assert_eq!(composite.class_list.len(), 2);
    }

    #[tokio::test]
    async fn unreachable_term_periods_is_soft() {
        let api = FakeApi {
            term_periods: Reply::Unreachable,
            ..FakeApi::healthy()
        };
        let aggregator = Aggregator::new(api);

        let composite = aggregator.aggregate(&creds()).await.unwrap();

        assert!(composite.term_periods_result.is_none());
        assert_eq!(composite.class_list.len(), 2);
        assert_eq!(aggregator.api().count("terms"), 1);
        assert!(composite.secondary_token_result.is_token());
    }

    #[tokio::test]
    async fn secondary_token_failures_are_embedded() {
        let api = FakeApi {
            secondary: Reply::Status(403, "realm not allowed"),
            ..FakeApi::healthy()
        };
        let composite = Aggregator::new(api).aggregate(&creds()).await.unwrap();
        assert_eq!(
            composite.secondary_token_result,
            SecondaryTokenResult::rejected("realm not allowed")
        );

        let api = FakeApi {
            secondary: Reply::Unreachable,
            ..FakeApi::healthy()
        };
        let composite = Aggregator::new(api).aggregate(&creds()).await.unwrap();
        assert_eq!(
            composite.secondary_token_result,
            SecondaryTokenResult::unreachable()
        );

        let api = FakeApi {
            secondary: Reply::Garbled,
            ..FakeApi::healthy()
        };
        let composite = Aggregator::new(api).aggregate(&creds()).await.unwrap();
        assert_eq!(
            composite.secondary_token_result,
            SecondaryTokenResult::unreachable()
        );
    }

    #[tokio::test]
    async fn full_success_uses_first_school_and_session_token() {
        let aggregator = Aggregator::new(FakeApi::healthy());

        let composite = aggregator.aggregate(&creds()).await.unwrap();

        assert_eq!(
            aggregator.api().calls(),
            vec![
                "login:ana".to_string(),
                "classes:tok-1:555".to_string(),
                "terms:tok-1:10".to_string(),
                "secondary".to_string(),
            ]
        );
        assert_eq!(composite.auth_result["nome"], "Ana");
        assert_eq!(composite.class_list[0].raw()["nome"], "1A");
        assert_eq!(composite.class_list[1].raw()["nome"], "2B");
        assert_eq!(composite.term_periods_result, Some(json!([{"bimestre": 1}])));
        assert_eq!(
            composite.secondary_token_result,
            SecondaryTokenResult::Token(json!({"auth_token": "edu-1"}))
        );
    }

    #[tokio::test]
    async fn repeated_calls_are_independent() {
        let aggregator = Aggregator::new(FakeApi::healthy());

        aggregator.aggregate(&creds()).await.unwrap();
        aggregator.aggregate(&creds()).await.unwrap();

        assert_eq!(aggregator.api().count("login"), 2);
        assert_eq!(aggregator.api().count("classes"), 2);
        assert_eq!(aggregator.api().count("secondary"), 2);
    }

    #[tokio::test]
    async fn concurrent_mode_keeps_semantics() {
        let aggregator =
            Aggregator::new(FakeApi::healthy()).with_concurrent_secondary_token(true);
        let composite = aggregator.aggregate(&creds()).await.unwrap();
        assert!(composite.term_periods_result.is_some());
        assert!(composite.secondary_token_result.is_token());

        let api = FakeApi {
            classes: Reply::Unreachable,
            ..FakeApi::healthy()
        };
        let aggregator = Aggregator::new(api).with_concurrent_secondary_token(true);
        let err = aggregator.aggregate(&creds()).await.unwrap_err();
        assert!(matches!(err, Error::Dependency(_)));
        assert_eq!(aggregator.api().count("terms"), 0);
    }

    #[test]
    fn from_config_requires_keys() {
        let err = Aggregator::from_config(Config::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::FetchingTermPeriods.to_string(), "fetching_term_periods");
        assert_eq!(Stage::Failed.to_string(), "failed");
    }
}
