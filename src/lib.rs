pub mod commands;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod server;
pub mod sheets;
pub mod validation;

use std::sync::Arc;

use config::{AppConfig, EngineConfig};
use db::SharedStore;
use error::AppError;

/// Shared state handed to every HTTP handler.
pub struct AppState {
    pub store: SharedStore,
    pub engine: EngineConfig,
    /// Shared secret for `/api/verify-passphrase`.
    pub passphrase: String,
}

impl AppState {
    pub fn new(config: &AppConfig, store: SharedStore) -> Self {
        Self {
            store,
            engine: config.engine.clone(),
            passphrase: config.passphrase.clone(),
        }
    }
}

/// Load configuration, open the roster store and serve until shutdown.
pub async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;

    // Keep the file writer alive until the server exits.
    let _log_guard = logging::init(&config.logging);
    if let Some(dir) = &config.logging.crash_log_dir {
        logging::install_crash_hook(dir);
    }

    tracing::info!("Starting Standup Spinner v{}", env!("CARGO_PKG_VERSION"));
    if config.passphrase.is_empty() {
        tracing::warn!("PASSPHRASE is not set; only an empty passphrase will verify");
    }
    tracing::info!(
        backend = config.store.backend_name(),
        weight_exponent = config.engine.weight_exponent,
        audience = ?config.engine.default_audience,
        static_dir = %config.static_dir.display(),
        "Configuration loaded"
    );

    let store = db::open_store(&config.store)?;
    let state = Arc::new(AppState::new(&config, store));
    server::serve(state, config.bind_addr, &config.static_dir).await
}
