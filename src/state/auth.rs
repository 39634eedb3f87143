//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Drives UI gating: views read `phase` to decide between spinners, login
//! prompts, and user-aware rendering. The session service is the only writer.
//!
//! INVARIANTS
//! ==========
//! `user` is `Some` only while `phase == Succeeded`. `user_id` is tracked
//! separately because it outlives the in-memory session through local storage.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::remote::{Principal, RemoteError};

/// Top-level auth status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthPhase {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Why the last auth attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials rejected or sign-in cancelled.
    Auth,
    /// Connectivity problem or timeout.
    Network,
}

impl From<&RemoteError> for FailureKind {
    fn from(err: &RemoteError) -> Self {
        if err.is_network() { Self::Network } else { Self::Auth }
    }
}

/// State transitions accepted by [`AuthState::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMutation {
    /// An auth operation started.
    Start,
    /// A principal was obtained.
    Success(Principal),
    /// The auth operation finished without error.
    Complete,
    /// The auth operation failed.
    Failed(FailureKind),
    /// The session was torn down.
    Logout,
    /// The known user id changed.
    UpdateUid(String),
    /// The known user id was forgotten.
    RemoveUid,
}

/// Authentication state tracking the current user and auth phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub user: Option<Principal>,
    pub user_id: Option<String>,
    pub failure: Option<FailureKind>,
}

impl AuthState {
    /// Initial state with a user id recovered from local storage.
    #[must_use]
    pub fn with_user_id(user_id: Option<String>) -> Self {
        Self { user_id, ..Self::default() }
    }

    /// Apply one transition.
    pub fn apply(&mut self, mutation: AuthMutation) {
        match mutation {
            AuthMutation::Start => {
                self.phase = AuthPhase::Pending;
                self.user = None;
                self.failure = None;
            }
            AuthMutation::Success(user) => {
                self.phase = AuthPhase::Succeeded;
                self.user = Some(user);
                self.failure = None;
            }
            AuthMutation::Complete => {
                self.phase = AuthPhase::Succeeded;
            }
            AuthMutation::Failed(kind) => {
                self.phase = AuthPhase::Failed;
                self.user = None;
                self.failure = Some(kind);
            }
            AuthMutation::Logout => {
                self.phase = AuthPhase::Idle;
                self.user = None;
                self.user_id = None;
                self.failure = None;
            }
            AuthMutation::UpdateUid(id) => self.user_id = Some(id),
            AuthMutation::RemoveUid => self.user_id = None,
        }
    }

    /// An auth operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == AuthPhase::Pending
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// No auth work pending and nobody signed in; views should offer login.
    #[must_use]
    pub fn needs_login(&self) -> bool {
        !self.is_loading() && self.user.is_none()
    }
}
