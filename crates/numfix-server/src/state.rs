use std::sync::{Arc, Mutex};

use numfix_config::ServerConfig;
use numfix_core::CountryRegistry;
use numfix_store::Store;

use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Store>>,
    pub registry: Arc<CountryRegistry>,
    pub server: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Store, registry: CountryRegistry, server: ServerConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            registry: Arc::new(registry),
            server: Arc::new(server),
        }
    }

    /// Runs blocking SQLite work off the async executor.
    pub async fn with_store<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Store) -> numfix_store::error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let guard = store
                .lock()
                .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))?;
            work(&guard).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {}", err)))?
    }
}
