//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// `ok`, or `degraded` when the content store does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Dishes in the compiled-in catalog; zero means a broken build.
    pub catalog_items: usize,
}

/// GET /health
///
/// Always 200: public pages keep rendering without the store, so a store
/// outage is reported as `degraded` rather than as a failed check.
async fn report(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = trattoria_db::health_check(&state.pool).await.is_ok();

    Json(HealthReport {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        catalog_items: state.catalog.items().len(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(report))
}
