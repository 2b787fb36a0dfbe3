use std::sync::Arc;

use trattoria_core::catalog::MenuCatalog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, created once for the process lifetime.
    pub pool: trattoria_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Read-only menu catalog; the source of truth for valid item ids.
    pub catalog: Arc<MenuCatalog>,
}
