//! Session lifecycle: login, restoration, logout, persisted user id.
//!
//! ARCHITECTURE
//! ============
//! `SessionService` is the single writer of `AuthState`. Each operation
//! commits `Start`, awaits the remote provider, then commits exactly one
//! terminal transition, so no settled operation leaves the phase `Pending`.
//! The one exception is a sign-in superseded by logout, whose terminal
//! transition is the logout's own `Logout`.
//!
//! CONCURRENCY
//! ===========
//! Sign-in attempts (`login`, `restore_session`) share one single-flight
//! guard and `logout` has its own; a call that finds its guard taken returns
//! `SessionError::InFlight` without touching state. A sign-in attempt is
//! also refused while a logout runs.
//!
//! Logout bumps a session epoch before its first await. A sign-in attempt
//! already in flight compares the epoch after each remote call and, if a
//! logout started meanwhile, returns `SessionError::Superseded` without
//! committing or scheduling anything. So once logout settles no refresh
//! task survives it.
//!
//! The refresh task lives in one slot: scheduling replaces (and aborts) the
//! previous task, logout empties it.
//!
//! ERROR HANDLING
//! ==============
//! Every remote call is bounded by the configured timeout. Failures become
//! `AuthMutation::Failed` with a `FailureKind`; the typed error is also
//! returned so the store can log it. Logout never fails on remote errors:
//! local state is cleared regardless.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::refresh::{RefreshSchedule, RefreshTask};
use super::users::ensure_user_record;
use super::with_timeout;
use crate::config::ClientConfig;
use crate::remote::{AuthProvider, Principal, RecordStore, RemoteError, WriteOutcome};
use crate::state::auth::{AuthMutation, AuthState};
use crate::storage::{LocalStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0} already in flight")]
    InFlight(&'static str),
    #[error("{0} superseded by sign-out")]
    Superseded(&'static str),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Tunables for the session service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// Local storage key holding the last known user id.
    pub user_id_key: String,
    pub refresh: RefreshSchedule,
    /// Upper bound for each remote call.
    pub call_timeout: Duration,
}

impl From<&ClientConfig> for SessionSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            user_id_key: config.user_id_key.clone(),
            refresh: RefreshSchedule {
                interval: config.token_refresh_interval,
                retry_base: config.token_refresh_retry_base,
            },
            call_timeout: config.timeouts.remote_call,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

/// Clears its flag on drop.
struct Flight<'a>(&'a AtomicBool);

impl<'a> Flight<'a> {
    fn acquire(flag: &'a AtomicBool, op: &'static str) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| SessionError::InFlight(op))
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionService {
    auth: Arc<dyn AuthProvider>,
    records: Arc<dyn RecordStore>,
    storage: Arc<dyn LocalStorage>,
    settings: SessionSettings,
    state: watch::Sender<AuthState>,
    refresh: Mutex<Option<RefreshTask>>,
    signing_in: AtomicBool,
    signing_out: AtomicBool,
    epoch: AtomicU64,
}

impl SessionService {
    /// Create the service with the user id recovered from local storage.
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        records: Arc<dyn RecordStore>,
        storage: Arc<dyn LocalStorage>,
        settings: SessionSettings,
    ) -> Self {
        let user_id = match storage.get(&settings.user_id_key) {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "persisted user id unreadable; starting without it");
                None
            }
        };
        let (state, _) = watch::channel(AuthState::with_user_id(user_id));
        Self {
            auth,
            records,
            storage,
            settings,
            state,
            refresh: Mutex::new(None),
            signing_in: AtomicBool::new(false),
            signing_out: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current auth state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Interactive sign-in.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if another sign-in or a logout is running,
    /// `Superseded` if a logout started while the provider call was pending,
    /// or the remote error that moved the session to `Failed`.
    pub async fn login(&self) -> Result<Principal, SessionError> {
        let (_flight, epoch) = self.begin_sign_in()?;
        self.commit(AuthMutation::Start);

        let result = with_timeout(self.settings.call_timeout, "sign_in", self.auth.sign_in()).await;
        self.ensure_current(epoch, "sign-in")?;
        let principal = match result {
            Ok(principal) => principal,
            Err(err) => {
                warn!(error = %err, "login failed");
                self.commit(AuthMutation::Failed((&err).into()));
                return Err(err.into());
            }
        };

        if let Err(err) = self.set_persisted_id(&principal.id) {
            warn!(error = %err, uid = %principal.id, "failed to persist user id");
        }
        self.commit(AuthMutation::Success(principal.clone()));
        self.commit(AuthMutation::Complete);
        self.schedule_refresh();
        info!(uid = %principal.id, "login succeeded");

        self.ensure_user(&principal).await;
        Ok(principal)
    }

    /// Recover an existing provider session without prompting.
    ///
    /// Resolves to `Ok(None)` when nobody is signed in; the phase still ends
    /// as `Succeeded`.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if a sign-in or logout is running, `Superseded` if
    /// a logout started while the provider call was pending, or the remote
    /// error that moved the session to `Failed`.
    pub async fn restore_session(&self) -> Result<Option<Principal>, SessionError> {
        let (_flight, epoch) = self.begin_sign_in()?;
        self.commit(AuthMutation::Start);

        let result = with_timeout(self.settings.call_timeout, "current_user", self.auth.current_user()).await;
        self.ensure_current(epoch, "restore")?;
        let current = match result {
            Ok(current) => current,
            Err(err) => {
                warn!(error = %err, "session restore failed");
                self.commit(AuthMutation::Failed((&err).into()));
                return Err(err.into());
            }
        };

        if let Some(principal) = &current {
            if let Err(err) = self.set_persisted_id(&principal.id) {
                warn!(error = %err, uid = %principal.id, "failed to persist user id");
            }
            self.commit(AuthMutation::Success(principal.clone()));
            info!(uid = %principal.id, "session restored");
        } else {
            debug!("no session to restore");
        }
        self.schedule_refresh();
        self.commit(AuthMutation::Complete);
        Ok(current)
    }

    /// End the session. Local state is cleared even if the remote sign-out
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if another logout is running.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _flight = Flight::acquire(&self.signing_out, "sign-out")?;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.commit(AuthMutation::Start);
        self.cancel_refresh();

        if let Err(err) = with_timeout(self.settings.call_timeout, "sign_out", self.auth.sign_out()).await {
            warn!(error = %err, "remote sign-out failed; clearing local session anyway");
        }
        if let Err(err) = self.clear_persisted_id() {
            warn!(error = %err, "failed to clear persisted user id");
        }
        self.commit(AuthMutation::Logout);

        info!("logged out");
        Ok(())
    }

    /// Persist `id` locally and record it in state.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails. State is updated either way.
    pub fn set_persisted_id(&self, id: &str) -> Result<(), SessionError> {
        let stored = self.storage.set(&self.settings.user_id_key, id);
        self.commit(AuthMutation::UpdateUid(id.to_owned()));
        stored.map_err(Into::into)
    }

    /// Remove the persisted id locally and from state.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage removal fails. State is updated either way.
    pub fn clear_persisted_id(&self) -> Result<(), SessionError> {
        let removed = self.storage.remove(&self.settings.user_id_key);
        self.commit(AuthMutation::RemoveUid);
        removed.map_err(Into::into)
    }

    /// Whether a refresh loop is currently attached to the session.
    #[must_use]
    pub fn refresh_scheduled(&self) -> bool {
        self.refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Take the sign-in guard and note the epoch it started in. The epoch is
    /// read before the logout check so a logout that slips in between is
    /// still seen by `ensure_current`.
    fn begin_sign_in(&self) -> Result<(Flight<'_>, u64), SessionError> {
        let flight = Flight::acquire(&self.signing_in, "sign-in")?;
        let epoch = self.epoch.load(Ordering::SeqCst);
        if self.signing_out.load(Ordering::SeqCst) {
            return Err(SessionError::InFlight("sign-out"));
        }
        Ok((flight, epoch))
    }

    fn ensure_current(&self, epoch: u64, op: &'static str) -> Result<(), SessionError> {
        if self.epoch.load(Ordering::SeqCst) == epoch {
            Ok(())
        } else {
            debug!(op, "discarding result; logout started meanwhile");
            Err(SessionError::Superseded(op))
        }
    }

    async fn ensure_user(&self, principal: &Principal) {
        let result = with_timeout(
            self.settings.call_timeout,
            "conditional_write",
            ensure_user_record(self.records.as_ref(), principal),
        )
        .await;
        match result {
            Ok(WriteOutcome::Created) => info!(uid = %principal.id, "user record created"),
            Ok(WriteOutcome::AlreadyExists) => debug!(uid = %principal.id, "user record already exists"),
            Err(err) => warn!(error = %err, uid = %principal.id, "user record bootstrap failed"),
        }
    }

    fn schedule_refresh(&self) {
        let task = RefreshTask::spawn(Arc::clone(&self.auth), self.settings.refresh, self.settings.call_timeout);
        let previous = self
            .refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        drop(previous);
    }

    fn cancel_refresh(&self) {
        let task = self.refresh.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            task.cancel();
            debug!("token refresh cancelled");
        }
    }

    fn commit(&self, mutation: AuthMutation) {
        debug!(?mutation, "auth transition");
        self.state.send_modify(|state| state.apply(mutation));
    }
}
