//! Client configuration parsed from environment variables.
//!
//! `.env` files are loaded by the binary before these constructors run, so
//! everything here reads plain process env.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
pub const DEFAULT_USER_ID_KEY: &str = "volunteer_hub_uid";
pub const DEFAULT_STORAGE_PATH: &str = ".volunteer-hub/storage.json";
pub const DEFAULT_TOKEN_REFRESH_INTERVAL_SECS: u64 = 10 * 60;
pub const DEFAULT_TOKEN_REFRESH_RETRY_BASE_SECS: u64 = 5;
pub const DEFAULT_REMOTE_CALL_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REMOTE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Charity categories shown on project cards, keyed by lowercase type.
pub const CHARITY_TYPES: &[(&str, &str)] = &[
    ("animals", "Animals"),
    ("arts", "Arts & Culture"),
    ("community", "Community Development"),
    ("education", "Education"),
    ("environment", "Environment"),
    ("health", "Health"),
    ("human-services", "Human Services"),
    ("international", "International"),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Email/password pair used for non-interactive sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Endpoints and keys for the hosted auth + realtime-database backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub database_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub credentials: Option<Credentials>,
}

impl FirebaseConfig {
    /// Build from environment variables.
    ///
    /// Required:
    /// - `FIREBASE_API_KEY`
    /// - `FIREBASE_DATABASE_URL`
    ///
    /// Optional:
    /// - `FIREBASE_AUTH_URL`, `FIREBASE_TOKEN_URL`: endpoint overrides
    /// - `VOLUNTEER_HUB_EMAIL` + `VOLUNTEER_HUB_PASSWORD`: sign-in credentials
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the database URL
    /// is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required("FIREBASE_API_KEY")?;
        let database_url = trim_url(required("FIREBASE_DATABASE_URL")?);
        if !database_url.starts_with("http://") && !database_url.starts_with("https://") {
            return Err(ConfigError::Invalid { var: "FIREBASE_DATABASE_URL", value: database_url });
        }
        let auth_url = trim_url(std::env::var("FIREBASE_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_owned()));
        let token_url = trim_url(std::env::var("FIREBASE_TOKEN_URL").unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_owned()));
        let credentials = match (std::env::var("VOLUNTEER_HUB_EMAIL"), std::env::var("VOLUNTEER_HUB_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() => Some(Credentials { email, password }),
            _ => None,
        };
        Ok(Self { api_key, database_url, auth_url, token_url, credentials })
    }
}

/// Timing knobs shared by the session service and the HTTP adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Upper bound for any single remote call.
    pub remote_call: Duration,
    /// TCP connect timeout for the HTTP client.
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            remote_call: Duration::from_secs(DEFAULT_REMOTE_CALL_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_REMOTE_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Session and storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_id_key: String,
    pub storage_path: PathBuf,
    pub token_refresh_interval: Duration,
    pub token_refresh_retry_base: Duration,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_id_key: DEFAULT_USER_ID_KEY.to_owned(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            token_refresh_interval: Duration::from_secs(DEFAULT_TOKEN_REFRESH_INTERVAL_SECS),
            token_refresh_retry_base: Duration::from_secs(DEFAULT_TOKEN_REFRESH_RETRY_BASE_SECS),
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// - `USER_ID_KEY`
    /// - `STORAGE_PATH`
    /// - `TOKEN_REFRESH_INTERVAL_SECS` (default 600)
    /// - `TOKEN_REFRESH_RETRY_BASE_SECS` (default 5)
    /// - `REMOTE_CALL_TIMEOUT_SECS` (default 15)
    /// - `REMOTE_CONNECT_TIMEOUT_SECS` (default 10)
    ///
    /// # Errors
    ///
    /// Returns an error if a duration is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let user_id_key = std::env::var("USER_ID_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID_KEY.to_owned());
        let storage_path = std::env::var("STORAGE_PATH")
            .ok()
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);

        Ok(Self {
            user_id_key,
            storage_path,
            token_refresh_interval: secs_nonzero("TOKEN_REFRESH_INTERVAL_SECS", DEFAULT_TOKEN_REFRESH_INTERVAL_SECS)?,
            token_refresh_retry_base: secs_nonzero(
                "TOKEN_REFRESH_RETRY_BASE_SECS",
                DEFAULT_TOKEN_REFRESH_RETRY_BASE_SECS,
            )?,
            timeouts: Timeouts {
                remote_call: secs_nonzero("REMOTE_CALL_TIMEOUT_SECS", DEFAULT_REMOTE_CALL_TIMEOUT_SECS)?,
                connect: secs_nonzero("REMOTE_CONNECT_TIMEOUT_SECS", DEFAULT_REMOTE_CONNECT_TIMEOUT_SECS)?,
            },
        })
    }
}

/// Display label for a charity type, matched case-insensitively.
#[must_use]
pub fn charity_type(kind: &str) -> Option<&'static str> {
    let key = kind.trim().to_lowercase();
    CHARITY_TYPES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn secs_nonzero(var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env_parse(var, default) {
        0 => Err(ConfigError::Invalid { var, value: "0".to_owned() }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}
