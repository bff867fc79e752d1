//! Request dispatcher for the console backend.
//!
//! The client facade stays small:
//! - session headers are derived in `auth`.
//! - request encoding and the raw network attempt live in `transport`.
//! - retry budget and backoff live in `retry`.

mod auth;
mod retry;
mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::classify::{classify, AttemptFailure};
use super::ReadApi;
use crate::cancel::{run_cancellable, CancelHandle};
use crate::context::{AppContext, LogNavigator, Navigator};
use crate::error::ApiError;
use crate::hooks::NotificationHooks;
use crate::types::{ApiResponse, BlobResponse, Method, Params, UploadFile};
pub use auth::{CSRF_REQUEST_HEADER, ORG_ID_HEADER};
pub use retry::RetryPolicy;
use transport::{RawResponse, RequestBody};
pub use transport::{CSRF_RESPONSE_HEADER, UPLOAD_PARAMS_FIELD};

/// Settled result of a dispatch that did not fail.
#[derive(Debug)]
enum Outcome {
    Response(RawResponse),
    Cancelled,
}

/// Failed binary download, handed back instead of being reported.
///
/// Callers decide whether the failure is worth surfacing by calling
/// [`BlobFailure::report_error`].
#[derive(Debug)]
pub struct BlobFailure {
    pub error: ApiError,
    hooks: NotificationHooks,
}

impl BlobFailure {
    /// Send the failure body to the hooks.
    ///
    /// Only failures that carried a response body are reported; a download
    /// that never got a response stays silent.
    pub fn report_error(&self) {
        if let ApiError::Status { body, .. } = &self.error {
            if !body.is_empty() {
                self.hooks.report_failure(body);
            }
        }
    }
}

impl std::fmt::Display for BlobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blob download failed: {}", self.error)
    }
}

impl std::error::Error for BlobFailure {}

/// Client for the console's `/api/` endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    context: Arc<AppContext>,
    retry_policy: RetryPolicy,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Build a client with the default retry policy.
    pub fn new(context: Arc<AppContext>, timeout: Duration) -> Self {
        Self::new_with_retry_policy(context, timeout, RetryPolicy::default())
    }

    pub fn new_with_retry_policy(
        context: Arc<AppContext>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            http: transport::build_http_client(timeout),
            context,
            retry_policy,
            navigator: Arc::new(LogNavigator),
        }
    }

    /// Replace the handler used for session-expiry redirects.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    pub async fn get(
        &self,
        path: &str,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::Get, path, params, cancel).await
    }

    pub async fn post(
        &self,
        path: &str,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::Post, path, params, cancel).await
    }

    pub async fn delete(
        &self,
        path: &str,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<ApiResponse, ApiError> {
        self.request(Method::Delete, path, params, cancel).await
    }

    /// Issue one logical call with any method.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<ApiResponse, ApiError> {
        let body = RequestBody::for_method(method, params);
        self.settle(self.dispatch(method, path, body, cancel).await)
    }

    /// Multipart POST: each file under its key, `params` as JSON in `_params_`.
    pub async fn upload(
        &self,
        path: &str,
        files: &BTreeMap<String, UploadFile>,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<ApiResponse, ApiError> {
        let body = RequestBody::Multipart { files, params };
        self.settle(self.dispatch(Method::Post, path, body, cancel).await)
    }

    /// GET a binary body. Failures are returned unreported.
    pub async fn get_blob(
        &self,
        path: &str,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<BlobResponse, BlobFailure> {
        let body = RequestBody::Query(params);
        match self.dispatch(Method::Get, path, body, cancel).await {
            Ok(Outcome::Cancelled) => Ok(BlobResponse::cancelled()),
            Ok(Outcome::Response(raw)) => Ok(BlobResponse {
                status: raw.status,
                content_type: raw.content_type(),
                data: raw.body,
                cancelled: false,
            }),
            Err(error) => {
                tracing::debug!(path, %error, "blob download failed");
                Err(BlobFailure {
                    error,
                    hooks: self.context.hooks.clone(),
                })
            }
        }
    }

    fn settle(&self, outcome: Result<Outcome, ApiError>) -> Result<ApiResponse, ApiError> {
        match outcome {
            Ok(Outcome::Cancelled) => Ok(ApiResponse::cancelled()),
            Ok(Outcome::Response(raw)) => Ok(ApiResponse {
                status: raw.status,
                data: raw.decoded_body(),
                cancelled: false,
                csrf_token: raw.csrf_token().map(str::to_string),
            }),
            Err(err) => Err(self.report_failure(err)),
        }
    }

    /// Route a terminal failure: redirect on 401 when configured, else hooks.
    fn report_failure(&self, err: ApiError) -> ApiError {
        if err.status_code() == Some(401) {
            if let Some(redirect_to) = self.context.session_redirect_url() {
                tracing::warn!(%redirect_to, "session expired; redirecting to login");
                self.navigator.assign(&redirect_to);
                return ApiError::SessionExpired { redirect_to };
            }
        }
        tracing::warn!(error = %err, "API call failed");
        self.context.hooks.report_failure(&err.user_message());
        err
    }

    /// Run attempts until success, cancellation, or an unretryable failure.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: RequestBody<'_>,
        cancel: Option<&CancelHandle>,
    ) -> Result<Outcome, ApiError> {
        let url = self.context.links.api_url(path)?;
        let mut retry: u32 = 0;
        loop {
            // Headers are rebuilt per attempt so retries carry the newest token.
            let headers = auth::session_headers(&self.context.auth);
            tracing::debug!(%method, %url, retry, "dispatching API call");
            let attempt = transport::send_once(&self.http, method, &url, body, &headers);
            let Ok(result) = run_cancellable(cancel, attempt).await else {
                return Ok(Outcome::Cancelled);
            };

            let err = match result {
                Ok(raw) => {
                    self.context.auth.rotate_csrf_token(raw.csrf_token());
                    if raw.is_success() {
                        return Ok(Outcome::Response(raw));
                    }
                    raw.into_error()
                }
                Err(err) => err,
            };

            let kind = classify(&AttemptFailure::from_error(&err), method);
            retry = retry.saturating_add(1);
            if !self.retry_policy.should_retry(kind, retry) {
                if kind.is_retryable() {
                    tracing::debug!(%method, path, "retry budget exhausted");
                }
                return Err(err);
            }

            let delay = self.retry_policy.retry_delay_for(retry);
            tracing::info!(
                %method,
                path,
                retry,
                delay_ms = delay.as_millis() as u64,
                "retrying API call"
            );
            if run_cancellable(cancel, sleep(delay)).await.is_err() {
                return Ok(Outcome::Cancelled);
            }
        }
    }
}

#[async_trait]
impl ReadApi for ApiClient {
    async fn get(
        &self,
        path: &str,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<ApiResponse, ApiError> {
        ApiClient::get(self, path, params, cancel).await
    }
}
