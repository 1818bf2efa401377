//! Application context shared by the route handlers.
//!
//! [`AppContext`] wraps the DB pool and the row engine in `Arc`s and the
//! reloadable rows configuration in a [`ConfigStore`].

use std::path::PathBuf;
use std::sync::Arc;

use hr_core::config::{Config, RowsConfig};
use hr_core::Result;
use hr_db::{DbPool, SqliteLibrary};
use hr_engine::RowEngine;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::presenter::DtoPresenter;

/// The engine as wired by the server: SQLite for both library and users.
pub type HomeEngine = RowEngine<SqliteLibrary, SqliteLibrary, DtoPresenter>;

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Rows configuration that can be reloaded while the server runs.
///
/// Handlers take a [`snapshot`](Self::snapshot) at the start of a request,
/// so a reload never changes the rules halfway through one.
#[derive(Debug)]
pub struct ConfigStore {
    rows: RwLock<RowsConfig>,
    /// Path to the config file for reloads (None = reload is a no-op).
    config_path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new(config: &Config, config_path: Option<PathBuf>) -> Self {
        Self {
            rows: RwLock::new(config.rows.clone()),
            config_path,
        }
    }

    /// Copy of the current rows configuration.
    pub fn snapshot(&self) -> RowsConfig {
        self.rows.read().clone()
    }

    /// Replace the rows configuration.
    pub fn set(&self, rows: RowsConfig) {
        *self.rows.write() = rows;
    }

    /// Re-read the rows section from the config file.
    ///
    /// Returns `Ok(false)` when the store has no backing file. A file that
    /// fails to read or parse leaves the current configuration in place.
    pub fn reload(&self) -> Result<bool> {
        let Some(ref path) = self.config_path else {
            return Ok(false);
        };

        let config = Config::load(path)?;
        for warning in config.rows.validate() {
            tracing::warn!("Config warning: {warning}");
        }
        self.set(config.rows);

        tracing::info!("Config reloaded from {}", path.display());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// AppContext
// ---------------------------------------------------------------------------

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s and handles.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    pub engine: Arc<HomeEngine>,
    pub config_store: Arc<ConfigStore>,
    /// Cancelled on server shutdown; requests run under child tokens.
    pub shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(db: DbPool, config: &Config, config_path: Option<PathBuf>) -> Self {
        let library = SqliteLibrary::new(db.clone());
        let engine = RowEngine::new(library.clone(), library, DtoPresenter);

        Self {
            db,
            engine: Arc::new(engine),
            config_store: Arc::new(ConfigStore::new(config, config_path)),
            shutdown: CancellationToken::new(),
        }
    }
}
