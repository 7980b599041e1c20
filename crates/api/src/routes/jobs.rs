//! Route definitions for the `/job` resource.
//!
//! ```text
//! POST   /         -> submit_job
//! GET    /{id}     -> get_job
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(jobs::submit_job))
        .route("/{id}", get(jobs::get_job))
}
