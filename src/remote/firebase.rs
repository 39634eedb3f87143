//! Firebase-style REST adapter for auth and the realtime database.
//!
//! ARCHITECTURE
//! ============
//! Sign-in uses the identity toolkit's email/password endpoint, profile data
//! comes from `accounts:lookup`, token refresh goes through the secure-token
//! endpoint. Records are written with the realtime-database ETag protocol:
//! read with `X-Firebase-ETag: true`, then `PUT` with `if-match`. A `412`
//! means another writer got there first.
//!
//! The provider caches its refresh credential in local storage under its own
//! key so a later process can restore the session without prompting.
//!
//! ERROR HANDLING
//! ==============
//! 400/401/403 map to `AuthFailed`; transport errors and every other status
//! map to `NetworkFailed`. Token material is never logged.

#[cfg(test)]
#[path = "firebase_test.rs"]
mod firebase_test;

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{AuthProvider, Principal, RecordStore, RemoteError, WriteOutcome};
use crate::config::{FirebaseConfig, Timeouts};
use crate::storage::{LocalStorage, load_json, save_json};

/// Local storage key for the provider's cached refresh credential.
pub const CREDENTIAL_KEY: &str = "firebase:credential";

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

impl From<LookupUser> for Principal {
    fn from(u: LookupUser) -> Self {
        Self { id: u.local_id, email: u.email, display_name: u.display_name, avatar_url: u.photo_url }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CachedCredential {
    uid: String,
    refresh_token: String,
}

#[derive(Clone)]
struct TokenSet {
    uid: String,
    id_token: String,
    refresh_token: String,
}

// =============================================================================
// ENDPOINTS
// =============================================================================

fn sign_in_endpoint(auth_url: &str) -> String {
    format!("{auth_url}/accounts:signInWithPassword")
}

fn lookup_endpoint(auth_url: &str) -> String {
    format!("{auth_url}/accounts:lookup")
}

fn token_endpoint(token_url: &str) -> String {
    format!("{token_url}/token")
}

fn record_endpoint(database_url: &str, key: &str) -> String {
    format!("{database_url}/{}.json", key.trim_matches('/'))
}

/// Pull a human-readable reason out of an error body.
///
/// Identity endpoints nest it as `{"error": {"message": ...}}`; the database
/// uses `{"error": "..."}`.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        let err = v.get("error")?;
        err.get("message")
            .and_then(serde_json::Value::as_str)
            .or_else(|| err.as_str())
            .map(str::to_owned)
    });
    from_json.unwrap_or_else(|| body.trim().to_owned())
}

fn classify_status(status: u16, body: &str) -> RemoteError {
    let message = error_message(body);
    match status {
        400 | 401 | 403 => RemoteError::AuthFailed(message),
        _ => RemoteError::NetworkFailed(format!("status {status}: {message}")),
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, RemoteError> {
    serde_json::from_str(text).map_err(|e| RemoteError::Decode(e.to_string()))
}

async fn read_ok(resp: reqwest::Response) -> Result<String, RemoteError> {
    let status = resp.status().as_u16();
    let text = resp
        .text()
        .await
        .map_err(|e| RemoteError::NetworkFailed(e.to_string()))?;
    if (200..300).contains(&status) { Ok(text) } else { Err(classify_status(status, &text)) }
}

// =============================================================================
// BACKEND
// =============================================================================

/// REST client for the hosted auth + realtime-database backend.
pub struct FirebaseBackend {
    http: reqwest::Client,
    config: FirebaseConfig,
    storage: Arc<dyn LocalStorage>,
    tokens: Mutex<Option<TokenSet>>,
}

impl FirebaseBackend {
    /// Build the backend and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: FirebaseConfig, timeouts: Timeouts, storage: Arc<dyn LocalStorage>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.remote_call)
            .connect_timeout(timeouts.connect)
            .build()?;
        Ok(Self { http, config, storage, tokens: Mutex::new(None) })
    }

    fn tokens(&self) -> Option<TokenSet> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn remember(&self, tokens: TokenSet) {
        let cached = CachedCredential { uid: tokens.uid.clone(), refresh_token: tokens.refresh_token.clone() };
        if let Err(err) = save_json(self.storage.as_ref(), CREDENTIAL_KEY, &cached) {
            warn!(error = %err, "failed to cache auth credential");
        }
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    fn forget(&self) {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Err(err) = self.storage.remove(CREDENTIAL_KEY) {
            warn!(error = %err, "failed to drop cached auth credential");
        }
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        req.send()
            .await
            .map_err(|e| RemoteError::NetworkFailed(e.to_string()))
    }

    async fn post_identity<T: DeserializeOwned>(&self, url: &str, body: &serde_json::Value) -> Result<T, RemoteError> {
        let req = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body);
        let text = read_ok(self.execute(req).await?).await?;
        decode(&text)
    }

    async fn lookup(&self, id_token: &str) -> Result<Principal, RemoteError> {
        let body = serde_json::json!({ "idToken": id_token });
        let resp: LookupResponse = self.post_identity(&lookup_endpoint(&self.config.auth_url), &body).await?;
        resp.users
            .into_iter()
            .next()
            .map(Principal::from)
            .ok_or_else(|| RemoteError::AuthFailed("USER_NOT_FOUND".into()))
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenSet, RemoteError> {
        let req = self
            .http
            .post(token_endpoint(&self.config.token_url))
            .query(&[("key", self.config.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)]);
        let text = read_ok(self.execute(req).await?).await?;
        let resp: TokenResponse = decode(&text)?;
        let tokens = TokenSet { uid: resp.user_id, id_token: resp.id_token, refresh_token: resp.refresh_token };
        self.remember(tokens.clone());
        Ok(tokens)
    }
}

#[async_trait::async_trait]
impl AuthProvider for FirebaseBackend {
    async fn sign_in(&self) -> Result<Principal, RemoteError> {
        let creds = self
            .config
            .credentials
            .as_ref()
            .ok_or_else(|| RemoteError::AuthFailed("no sign-in credentials configured".into()))?;
        let body = serde_json::json!({
            "email": creds.email,
            "password": creds.password,
            "returnSecureToken": true,
        });
        let resp: SignInResponse = self.post_identity(&sign_in_endpoint(&self.config.auth_url), &body).await?;
        let tokens = TokenSet { uid: resp.local_id.clone(), id_token: resp.id_token, refresh_token: resp.refresh_token };
        self.remember(tokens.clone());

        match self.lookup(&tokens.id_token).await {
            Ok(principal) => Ok(principal),
            Err(err) => {
                warn!(error = %err, "profile lookup failed; using sign-in response");
                Ok(Principal { id: resp.local_id, email: resp.email, display_name: resp.display_name, avatar_url: None })
            }
        }
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.forget();
        debug!("provider session dropped");
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<Principal>, RemoteError> {
        let refresh_token = match self.tokens() {
            Some(tokens) => tokens.refresh_token,
            None => match load_json::<CachedCredential>(self.storage.as_ref(), CREDENTIAL_KEY) {
                Some(cached) => cached.refresh_token,
                None => return Ok(None),
            },
        };

        let tokens = match self.exchange_refresh_token(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(RemoteError::AuthFailed(reason)) => {
                info!(%reason, "cached credential rejected; discarding");
                self.forget();
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        self.lookup(&tokens.id_token).await.map(Some)
    }

    async fn force_refresh_token(&self) -> Result<(), RemoteError> {
        let tokens = self
            .tokens()
            .ok_or_else(|| RemoteError::AuthFailed("no signed-in user".into()))?;
        self.exchange_refresh_token(&tokens.refresh_token).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for FirebaseBackend {
    async fn conditional_write(&self, key: &str, default: serde_json::Value) -> Result<WriteOutcome, RemoteError> {
        let tokens = self
            .tokens()
            .ok_or_else(|| RemoteError::AuthFailed("no signed-in user".into()))?;
        let url = record_endpoint(&self.config.database_url, key);
        let auth = [("auth", tokens.id_token.as_str())];

        let resp = self
            .execute(self.http.get(&url).query(&auth).header("X-Firebase-ETag", "true"))
            .await?;
        let etag = resp
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let current: serde_json::Value = decode(&read_ok(resp).await?)?;
        if !current.is_null() {
            return Ok(WriteOutcome::AlreadyExists);
        }
        let etag = etag.ok_or_else(|| RemoteError::Decode("missing ETag header".into()))?;

        let resp = self
            .execute(self.http.put(&url).query(&auth).header(reqwest::header::IF_MATCH, etag).json(&default))
            .await?;
        if resp.status() == StatusCode::PRECONDITION_FAILED {
            debug!(%key, "conditional write lost the race");
            return Ok(WriteOutcome::AlreadyExists);
        }
        read_ok(resp).await?;
        Ok(WriteOutcome::Created)
    }
}
