//! Remote auth + record-store boundary.
//!
//! DESIGN
//! ======
//! The hosted backend is an opaque collaborator. Everything the client needs
//! from it fits in two traits: `AuthProvider` for identity and token
//! lifecycle, `RecordStore` for the write-if-absent record primitive.
//! `firebase` supplies the REST implementation; tests use the fakes in
//! `test_helpers`.

pub mod firebase;

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote auth/data calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The provider rejected the credentials or the user cancelled.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// Transient connectivity or server-side failure.
    #[error("network failed: {0}")]
    NetworkFailed(String),

    /// The call did not finish within the configured timeout.
    #[error("{op} timed out after {secs}s")]
    Timeout { op: &'static str, secs: u64 },

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A record key contains characters the store does not accept.
    #[error("invalid record key: {0}")]
    InvalidKey(String),
}

impl RemoteError {
    /// Whether this failure is connectivity-related rather than a rejection.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkFailed(_) | Self::Timeout { .. })
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// Authenticated identity returned by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Provider-assigned user id.
    pub id: String,
    /// Email address, if the provider exposes one.
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

/// Result of a conditional write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The key was absent and the default value was written.
    Created,
    /// A value already existed; nothing was written.
    AlreadyExists,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Identity operations exposed by the hosted auth service.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Interactive sign-in.
    async fn sign_in(&self) -> Result<Principal, RemoteError>;

    /// End the provider-side session.
    async fn sign_out(&self) -> Result<(), RemoteError>;

    /// Return the already-authenticated principal, if any, without prompting.
    async fn current_user(&self) -> Result<Option<Principal>, RemoteError>;

    /// Force the provider to reissue its id token before natural expiry.
    async fn force_refresh_token(&self) -> Result<(), RemoteError>;
}

/// Key-value record store with an atomic write-if-absent primitive.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Write `default` at `key` only if no value exists there.
    ///
    /// Concurrent first writers are arbitrated by the store; exactly one of
    /// them observes `Created`.
    async fn conditional_write(&self, key: &str, default: serde_json::Value) -> Result<WriteOutcome, RemoteError>;
}

// =============================================================================
// TEST HELPERS
// =============================================================================
