//! Root wiring: builds the store and navigator from configuration.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError, FirebaseConfig};
use crate::remote::firebase::FirebaseBackend;
use crate::routes::{Location, Navigator, NoScroll, RouteTable};
use crate::services::session::{SessionService, SessionSettings};
use crate::storage::{FileStorage, LocalStorage};
use crate::store::{Action, Store};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application root. Owns the single store and the navigator.
pub struct App {
    store: Store,
    navigator: Navigator,
}

impl App {
    #[must_use]
    pub fn new(store: Store, navigator: Navigator) -> Self {
        Self { store, navigator }
    }

    /// Wire the REST backend, file storage and session service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(firebase: FirebaseConfig, client: &ClientConfig) -> Result<Self, AppError> {
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(client.storage_path.clone()));
        let backend = Arc::new(FirebaseBackend::new(firebase, client.timeouts, Arc::clone(&storage))?);
        let session = SessionService::new(backend.clone(), backend, storage, SessionSettings::from(client));
        let navigator = Navigator::new(RouteTable::default(), Box::new(NoScroll));
        Ok(Self::new(Store::new(session), navigator))
    }

    /// Restore any existing session, then show the view for `path`.
    pub async fn start(&self, path: &str) -> Location {
        self.store.dispatch(Action::RestoreSession).await;
        self.navigator.navigate(path)
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }
}
