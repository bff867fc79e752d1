//! Periodic re-fetch of one endpoint until a condition holds.

use std::time::Duration;

use tokio::time::sleep;

use super::ReadApi;
use crate::cancel::CancelHandle;
use crate::error::ApiError;
use crate::types::{ApiResponse, Params};

/// GET `path` now and then every `interval` until `done` accepts a response.
///
/// Each cycle runs under a fresh child of `handle`, so a late settlement of
/// an earlier cycle can never be mistaken for the current one. Failures are
/// already reported by the dispatcher and do not end the loop; an expired
/// session does, since every further cycle would fail the same way.
/// Cancelling `handle` returns a cancelled response.
pub async fn poll<A, F>(
    api: &A,
    path: &str,
    params: &Params,
    interval: Duration,
    handle: &CancelHandle,
    mut done: F,
) -> Result<ApiResponse, ApiError>
where
    A: ReadApi + ?Sized,
    F: FnMut(&ApiResponse) -> bool,
{
    let mut cycle = 0u64;
    loop {
        if handle.is_cancelled() {
            return Ok(ApiResponse::cancelled());
        }
        cycle += 1;
        let cycle_handle = handle.child();
        match api.get(path, params, Some(&cycle_handle)).await {
            Ok(response) if response.cancelled => return Ok(response),
            Ok(response) if done(&response) => return Ok(response),
            Ok(_) => tracing::debug!(path, cycle, "poll condition not met"),
            Err(err @ ApiError::SessionExpired { .. }) => return Err(err),
            Err(err) => tracing::debug!(path, cycle, error = %err, "poll cycle failed"),
        }
        cycle_handle.cancel();

        if handle.run(sleep(interval)).await.is_err() {
            return Ok(ApiResponse::cancelled());
        }
    }
}
