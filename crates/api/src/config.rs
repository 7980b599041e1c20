/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Database URL (default: `sqlite://bmds-jobs.db`).
    pub database_url: String,
    /// Path to the solver executable (default: `bmds-solver`, resolved
    /// via `PATH`).
    pub solver_path: String,
    /// Per-model solver run timeout in seconds (default: `300`).
    pub solver_timeout_secs: u64,
    /// Dispatcher poll interval in milliseconds (default: `1000`).
    pub dispatch_interval_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                     |
    /// | `DATABASE_URL`          | `sqlite://bmds-jobs.db`  |
    /// | `SOLVER_PATH`           | `bmds-solver`            |
    /// | `SOLVER_TIMEOUT_SECS`   | `300`                    |
    /// | `DISPATCH_INTERVAL_MS`  | `1000`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://bmds-jobs.db".into());

        let solver_path = std::env::var("SOLVER_PATH").unwrap_or_else(|_| "bmds-solver".into());

        let solver_timeout_secs: u64 = std::env::var("SOLVER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("SOLVER_TIMEOUT_SECS must be a valid u64");

        let dispatch_interval_ms: u64 = std::env::var("DISPATCH_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("DISPATCH_INTERVAL_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            solver_path,
            solver_timeout_secs,
            dispatch_interval_ms,
        }
    }
}
