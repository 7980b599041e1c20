//! Root-level health probe.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// GET /health
///
/// Reports overall service status plus a live database probe. Mounted at
/// the root, outside `/api`, so load balancers can hit it unauthenticated.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_healthy = bmds_db::health_check(&state.pool).await.is_ok();

    Json(json!({
        "status": if db_healthy { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "db_healthy": db_healthy,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
