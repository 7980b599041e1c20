use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bmds_api::config::ServerConfig;
use bmds_api::engine::JobDispatcher;
use bmds_api::router::build_app_router;
use bmds_api::state::AppState;
use bmds_db::repositories::JobRepo;
use bmds_solver::ExecutableSolver;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bmds_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = bmds_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    bmds_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    bmds_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    // Jobs left Running by a previous process go back to the queue.
    let requeued = JobRepo::requeue_interrupted(&pool)
        .await
        .expect("Failed to requeue interrupted jobs");
    if requeued > 0 {
        tracing::warn!(requeued, "Re-queued jobs interrupted by a previous shutdown");
    }

    // --- Solver backend ---
    let solver = Arc::new(
        ExecutableSolver::new(&config.solver_path)
            .with_timeout(Duration::from_secs(config.solver_timeout_secs)),
    );
    tracing::info!(solver_path = %config.solver_path, "Solver backend configured");

    // --- Dispatcher ---
    let cancel = CancellationToken::new();
    let dispatcher = JobDispatcher::new(pool.clone(), solver.clone())
        .with_poll_interval(Duration::from_millis(config.dispatch_interval_ms));
    let dispatcher_cancel = cancel.clone();
    let dispatcher_handle = tokio::spawn(async move {
        dispatcher.run(dispatcher_cancel).await;
    });

    // --- App state + router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        solver,
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await
        .expect("Server error");

    dispatcher_handle.await.ok();
    tracing::info!("Shutdown complete");
}

/// Resolve when Ctrl-C arrives, cancelling the dispatcher first so no new
/// jobs are claimed while the HTTP server drains.
async fn shutdown_signal(cancel: CancellationToken) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
