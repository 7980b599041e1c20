use std::sync::Arc;

use bmds_solver::SolverBackend;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: bmds_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Execution backend shared with the dispatcher.
    pub solver: Arc<dyn SolverBackend>,
}
