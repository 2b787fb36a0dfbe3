use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use super::ensure_store_reachable;
use crate::error::AppResult;
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SchemaReport {
    pub tables: &'static [&'static str],
}

/// POST /api/v1/db/init
///
/// Create every table that is missing. Safe to call repeatedly.
pub async fn init_schema(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    ensure_store_reachable(&state).await?;

    let tables = trattoria_db::ensure_schema(&state.pool).await?;

    tracing::info!(tables = tables.len(), "Schema initialized");

    Ok(Json(DataResponse {
        data: SchemaReport { tables },
    }))
}
