//! Root state container and action dispatch.
//!
//! ARCHITECTURE
//! ============
//! `Store` owns the session service and the notification queue. Views read
//! snapshots or subscribe to watch channels, and change state only by
//! dispatching an `Action`. Dispatch is the error boundary: remote and
//! storage failures are logged here and already reflected in `AuthState`,
//! so nothing propagates to the caller.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config;
use crate::services::session::{SessionError, SessionService};
use crate::state::auth::AuthState;
use crate::state::notifications::{NotificationKind, NotificationState};

/// Every state change a view may request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Login,
    RestoreSession,
    Logout,
    ShowNotification { message: String, kind: NotificationKind },
    RemoveNotification,
}

pub struct Store {
    session: SessionService,
    notifications: watch::Sender<NotificationState>,
}

impl Store {
    #[must_use]
    pub fn new(session: SessionService) -> Self {
        let (notifications, _) = watch::channel(NotificationState::default());
        Self { session, notifications }
    }

    /// Run `action` to completion.
    pub async fn dispatch(&self, action: Action) {
        debug!(?action, "dispatch");
        match action {
            Action::Login => log_failure("login", self.session.login().await.map(drop)),
            Action::RestoreSession => log_failure("restore_session", self.session.restore_session().await.map(drop)),
            Action::Logout => log_failure("logout", self.session.logout().await),
            Action::ShowNotification { message, kind } => {
                self.notify(message, kind);
            }
            Action::RemoveNotification => {
                self.notifications.send_if_modified(|queue| queue.dismiss().is_some());
            }
        }
    }

    /// Queue a notification and return its id. Same effect as dispatching
    /// `Action::ShowNotification`.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> Uuid {
        let message = message.into();
        let mut id = Uuid::nil();
        self.notifications.send_modify(|queue| id = queue.enqueue(message, kind));
        id
    }

    /// Current auth snapshot.
    #[must_use]
    pub fn auth(&self) -> AuthState {
        self.session.state()
    }

    #[must_use]
    pub fn subscribe_auth(&self) -> watch::Receiver<AuthState> {
        self.session.subscribe()
    }

    /// Current notification queue snapshot.
    #[must_use]
    pub fn notifications(&self) -> NotificationState {
        self.notifications.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_notifications(&self) -> watch::Receiver<NotificationState> {
        self.notifications.subscribe()
    }

    /// Display label for a charity type; see [`config::charity_type`].
    #[must_use]
    pub fn charity_type(&self, kind: &str) -> Option<&'static str> {
        config::charity_type(kind)
    }

    #[must_use]
    pub fn session(&self) -> &SessionService {
        &self.session
    }
}

fn log_failure(op: &'static str, result: Result<(), SessionError>) {
    match result {
        Ok(()) => {}
        Err(SessionError::InFlight(what)) => debug!(op, what, "action skipped; already in flight"),
        Err(SessionError::Superseded(what)) => debug!(op, what, "action result dropped after sign-out"),
        Err(err) => warn!(op, error = %err, "action failed"),
    }
}
