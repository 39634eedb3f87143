use std::sync::Mutex;

use super::*;

/// Env vars are process-global; tests in this file take this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "FIREBASE_API_KEY",
    "FIREBASE_DATABASE_URL",
    "FIREBASE_AUTH_URL",
    "FIREBASE_TOKEN_URL",
    "VOLUNTEER_HUB_EMAIL",
    "VOLUNTEER_HUB_PASSWORD",
    "USER_ID_KEY",
    "STORAGE_PATH",
    "TOKEN_REFRESH_INTERVAL_SECS",
    "TOKEN_REFRESH_RETRY_BASE_SECS",
    "REMOTE_CALL_TIMEOUT_SECS",
    "REMOTE_CONNECT_TIMEOUT_SECS",
];

/// # Safety
/// Callers hold `ENV_LOCK`, so no other test in this module touches env.
unsafe fn clear_env() {
    for var in VARS {
        unsafe { std::env::remove_var(var) };
    }
}

// =============================================================================
// FirebaseConfig::from_env
// =============================================================================

#[test]
fn firebase_from_env_requires_api_key() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("FIREBASE_DATABASE_URL", "https://db.example.test");
    }
    let err = FirebaseConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing("FIREBASE_API_KEY")));
    unsafe { clear_env() };
}

#[test]
fn firebase_from_env_requires_database_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("FIREBASE_API_KEY", "key");
    }
    let err = FirebaseConfig::from_env().unwrap_err();
    assert_eq!(err.to_string(), "missing required env var FIREBASE_DATABASE_URL");
    unsafe { clear_env() };
}

#[test]
fn firebase_from_env_defaults_and_trims() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("FIREBASE_API_KEY", "key");
        std::env::set_var("FIREBASE_DATABASE_URL", "https://db.example.test/");
    }
    let cfg = FirebaseConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "key");
    assert_eq!(cfg.database_url, "https://db.example.test");
    assert_eq!(cfg.auth_url, DEFAULT_AUTH_URL);
    assert_eq!(cfg.token_url, DEFAULT_TOKEN_URL);
    assert!(cfg.credentials.is_none());
    unsafe { clear_env() };
}

#[test]
fn firebase_from_env_rejects_non_http_database_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("FIREBASE_API_KEY", "key");
        std::env::set_var("FIREBASE_DATABASE_URL", "db.example.test");
    }
    let err = FirebaseConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "FIREBASE_DATABASE_URL", .. }));
    unsafe { clear_env() };
}

#[test]
fn firebase_from_env_reads_credentials_and_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("FIREBASE_API_KEY", "key");
        std::env::set_var("FIREBASE_DATABASE_URL", "http://127.0.0.1:9000");
        std::env::set_var("FIREBASE_AUTH_URL", "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1/");
        std::env::set_var("VOLUNTEER_HUB_EMAIL", "ada@example.org");
        std::env::set_var("VOLUNTEER_HUB_PASSWORD", "hunter2");
    }
    let cfg = FirebaseConfig::from_env().unwrap();
    assert_eq!(cfg.auth_url, "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1");
    let creds = cfg.credentials.unwrap();
    assert_eq!(creds.email, "ada@example.org");
    assert_eq!(creds.password, "hunter2");
    unsafe { clear_env() };
}

#[test]
fn credentials_debug_redacts_password() {
    let creds = Credentials { email: "ada@example.org".into(), password: "hunter2".into() };
    let debug = format!("{creds:?}");
    assert!(debug.contains("ada@example.org"));
    assert!(!debug.contains("hunter2"));
}

// =============================================================================
// ClientConfig::from_env
// =============================================================================

#[test]
fn client_from_env_defaults_match_constants() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_env() };
    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.token_refresh_interval, Duration::from_secs(600));
    assert_eq!(cfg.user_id_key, DEFAULT_USER_ID_KEY);
}

#[test]
fn client_from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("USER_ID_KEY", "uid");
        std::env::set_var("STORAGE_PATH", "/tmp/vh.json");
        std::env::set_var("TOKEN_REFRESH_INTERVAL_SECS", "60");
        std::env::set_var("REMOTE_CALL_TIMEOUT_SECS", "3");
    }
    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.user_id_key, "uid");
    assert_eq!(cfg.storage_path, PathBuf::from("/tmp/vh.json"));
    assert_eq!(cfg.token_refresh_interval, Duration::from_secs(60));
    assert_eq!(cfg.timeouts.remote_call, Duration::from_secs(3));
    assert_eq!(cfg.timeouts.connect, Duration::from_secs(DEFAULT_REMOTE_CONNECT_TIMEOUT_SECS));
    unsafe { clear_env() };
}

#[test]
fn client_from_env_invalid_number_falls_back_to_default() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("TOKEN_REFRESH_RETRY_BASE_SECS", "soon");
    }
    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.token_refresh_retry_base, Duration::from_secs(DEFAULT_TOKEN_REFRESH_RETRY_BASE_SECS));
    unsafe { clear_env() };
}

#[test]
fn client_from_env_rejects_zero_interval() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("TOKEN_REFRESH_INTERVAL_SECS", "0");
    }
    let err = ClientConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("TOKEN_REFRESH_INTERVAL_SECS"));
    unsafe { clear_env() };
}

// =============================================================================
// charity_type
// =============================================================================

#[test]
fn charity_type_is_case_insensitive() {
    assert_eq!(charity_type("Animals"), Some("Animals"));
    assert_eq!(charity_type("EDUCATION"), Some("Education"));
    assert_eq!(charity_type(" health "), Some("Health"));
}

#[test]
fn charity_type_unknown_is_none() {
    assert_eq!(charity_type("space"), None);
    assert_eq!(charity_type(""), None);
}
