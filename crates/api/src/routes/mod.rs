//! Route definitions.

pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/job", jobs::router())
}
