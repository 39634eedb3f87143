//! User record bootstrap.
//!
//! The first successful login writes a default profile under `users/<uid>`.
//! The write is conditional, so an existing record (edited profile, or a
//! concurrent first login from another device) is never overwritten.

#[cfg(test)]
#[path = "users_test.rs"]
mod users_test;

use serde::Serialize;

use crate::remote::{Principal, RecordStore, RemoteError, WriteOutcome};

pub const USERS_PATH: &str = "users";

const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Default record written for a new user. The uid is the key, not a field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<&Principal> for UserRecord {
    fn from(p: &Principal) -> Self {
        Self { email: p.email.clone(), name: p.display_name.clone(), picture: p.avatar_url.clone() }
    }
}

/// Record key for `uid`.
///
/// # Errors
///
/// Returns `RemoteError::InvalidKey` if `uid` is empty or contains a
/// character the record store reserves.
pub fn record_key(uid: &str) -> Result<String, RemoteError> {
    if uid.is_empty() || uid.contains(FORBIDDEN_KEY_CHARS) {
        return Err(RemoteError::InvalidKey(uid.to_owned()));
    }
    Ok(format!("{USERS_PATH}/{uid}"))
}

/// Create the user's record if none exists yet.
///
/// # Errors
///
/// Returns an error if the key is invalid or the remote write fails.
pub async fn ensure_user_record(records: &dyn RecordStore, principal: &Principal) -> Result<WriteOutcome, RemoteError> {
    let key = record_key(&principal.id)?;
    let body =
        serde_json::to_value(UserRecord::from(principal)).map_err(|e| RemoteError::Decode(e.to_string()))?;
    records.conditional_write(&key, body).await
}
