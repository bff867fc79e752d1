//! HTTP dispatch for the console's `/api/` endpoints.
//!
//! The API layer is split into cohesive modules:
//! - `classify`: failure taxonomy and the retry deny-list
//! - `client`: retrying dispatcher with session headers and cancellation
//! - `poll`: periodic re-fetch loop built on the dispatcher

use crate::cancel::CancelHandle;
use crate::error::ApiError;
use crate::types::{ApiResponse, Params};
use async_trait::async_trait;

mod classify;
mod client;
mod poll;

pub use classify::{
    classify, AttemptFailure, CertificateFault, FailureKind, TransportFault,
};
pub use client::{
    ApiClient, BlobFailure, RetryPolicy, CSRF_REQUEST_HEADER, CSRF_RESPONSE_HEADER,
    ORG_ID_HEADER, UPLOAD_PARAMS_FIELD,
};
pub use poll::poll;

/// Read-only slice of the dispatcher used by polling.
///
/// This trait lets tests script responses without network calls while the
/// production path uses [`ApiClient`].
#[async_trait]
pub trait ReadApi: Send + Sync {
    async fn get(
        &self,
        path: &str,
        params: &Params,
        cancel: Option<&CancelHandle>,
    ) -> Result<ApiResponse, ApiError>;
}
