//! Background auth-token refresh.
//!
//! DESIGN
//! ======
//! One task per active session forces the provider to reissue its id token
//! on a fixed interval. Failures are logged and retried with exponential
//! backoff capped at the interval; the task never reports to session state.
//!
//! The task is owned through `RefreshTask`; dropping or cancelling the handle
//! aborts it, so a signed-out session cannot leave a refresh loop behind.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::with_timeout;
use crate::remote::AuthProvider;

/// Refresh cadence and retry backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshSchedule {
    /// Delay between successful refreshes.
    pub interval: Duration,
    /// First retry delay after a failure; doubles per consecutive failure.
    pub retry_base: Duration,
}

impl RefreshSchedule {
    /// Delay before the next attempt given the number of consecutive failures.
    #[must_use]
    pub fn next_delay(&self, failures: u32) -> Duration {
        if failures == 0 {
            return self.interval;
        }
        let factor = 1_u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
        self.retry_base.saturating_mul(factor).min(self.interval)
    }
}

/// Handle to a running refresh loop.
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Spawn the loop on the current tokio runtime.
    #[must_use]
    pub fn spawn(auth: Arc<dyn AuthProvider>, schedule: RefreshSchedule, call_timeout: Duration) -> Self {
        debug!(interval_secs = schedule.interval.as_secs(), "token refresh scheduled");
        let handle = tokio::spawn(async move {
            let mut failures: u32 = 0;
            loop {
                tokio::time::sleep(schedule.next_delay(failures)).await;
                match with_timeout(call_timeout, "force_refresh_token", auth.force_refresh_token()).await {
                    Ok(()) => {
                        failures = 0;
                        debug!("auth token refreshed");
                    }
                    Err(err) => {
                        failures = failures.saturating_add(1);
                        warn!(error = %err, failures, "auth token refresh failed");
                    }
                }
            }
        });
        Self { handle }
    }

    /// Stop the loop.
    pub fn cancel(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
