//! Async operations behind the store's actions.
//!
//! ARCHITECTURE
//! ============
//! Service modules own remote calls and background tasks so the store can
//! stay a thin dispatch layer over state mutations.

pub mod refresh;
pub mod session;
pub mod users;

use std::future::Future;
use std::time::Duration;

use crate::remote::RemoteError;

/// Bound a remote call by `limit`; expiry is reported as `RemoteError::Timeout`.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    op: &'static str,
    fut: impl Future<Output = Result<T, RemoteError>>,
) -> Result<T, RemoteError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout { op, secs: limit.as_secs() }),
    }
}
