//! Shared harness for API integration tests.
//!
//! Builds the production router (same middleware stack as `main.rs`)
//! against a scratch SQLite database, with a scripted solver backend and
//! a fast-polling dispatcher running in the background.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use bmds_api::config::ServerConfig;
use bmds_api::engine::JobDispatcher;
use bmds_api::router::build_app_router;
use bmds_api::state::AppState;
use bmds_db::DbPool;
use bmds_solver::{ModelFit, ModelRun, SolverBackend, SolverError};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        solver_path: "unused".to_string(),
        solver_timeout_secs: 30,
        dispatch_interval_ms: 20,
    }
}

/// A deterministic solver double with canned fits per model name.
///
/// `Probit` always crashes, which lets tests exercise per-model failure
/// isolation. The transcript reflects the BMR override the way the real
/// solver does, via a `Specified effect = ...` line.
pub struct ScriptedSolver;

#[async_trait]
impl SolverBackend for ScriptedSolver {
    async fn run_model(&self, run: &ModelRun) -> Result<ModelFit, SolverError> {
        if run.model_name == "Probit" {
            return Err(SolverError::Crashed {
                exit_code: 1,
                stderr: "scripted crash".to_string(),
            });
        }

        let effect = run.bmr.map(|b| b.value).unwrap_or(0.1);
        let bmd = match run.model_name.as_str() {
            "Logistic" => 29.5318,
            "Linear" => 1901.98,
            _ => 1.0,
        };

        let outfile = format!(
            "{} Model. Run time: scripted\n\
             Specified effect = {effect}\n\
             BMD = {bmd}\n",
            run.model_name,
        );

        Ok(ModelFit {
            outfile,
            output: serde_json::json!({ "BMD": bmd }),
        })
    }
}

pub struct TestHarness {
    pub app: Router,
    pub pool: DbPool,
    cancel: CancellationToken,
    _dir: tempfile::TempDir,
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Build the full application with a running dispatcher.
pub async fn spawn_test_app() -> TestHarness {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("jobs.db").display());
    let pool = bmds_db::create_pool(&url).await.expect("create pool");
    bmds_db::run_migrations(&pool).await.expect("run migrations");

    let solver: Arc<dyn SolverBackend> = Arc::new(ScriptedSolver);
    let config = test_config();

    let dispatcher = JobDispatcher::new(pool.clone(), Arc::clone(&solver))
        .with_poll_interval(Duration::from_millis(config.dispatch_interval_ms));
    let cancel = CancellationToken::new();
    let dispatcher_cancel = cancel.clone();
    tokio::spawn(async move {
        dispatcher.run(dispatcher_cancel).await;
    });

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        solver,
    };
    let app = build_app_router(state, &config);

    TestHarness {
        app,
        pool,
        cancel,
        _dir: dir,
    }
}

/// POST a submission document (as the `inputs` string field) to `/api/job`.
pub async fn post_job(app: &Router, document: &serde_json::Value) -> (StatusCode, serde_json::Value) {
    post_inputs(app, &document.to_string()).await
}

/// POST a raw `inputs` string to `/api/job` (for malformed-JSON cases).
pub async fn post_inputs(app: &Router, inputs: &str) -> (StatusCode, serde_json::Value) {
    let payload = serde_json::json!({ "inputs": inputs });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/job")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// GET a path and parse the JSON body.
pub async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Poll `/api/job/{id}` until `is_finished`, with a hard deadline.
pub async fn poll_until_finished(app: &Router, job_id: i64) -> serde_json::Value {
    let deadline = Duration::from_secs(10);
    let poll = async {
        loop {
            tokio::time::sleep(Duration::from_millis(25)).await;
            let (status, body) = get_json(app, &format!("/api/job/{job_id}")).await;
            assert_eq!(status, StatusCode::OK);
            if body["is_finished"] == true {
                return body;
            }
        }
    };
    tokio::time::timeout(deadline, poll)
        .await
        .expect("job did not finish before the deadline")
}

/// The dichotomous fixture from the original test suite.
pub fn complete_dichotomous() -> serde_json::Value {
    serde_json::json!({
        "bmds_version": "BMDS2601",
        "dataset_type": "D",
        "datasets": [{
            "id": 123,
            "doses": [0, 1.96, 5.69, 29.75],
            "ns": [75, 49, 50, 49],
            "incidences": [5, 0, 3, 14],
        }],
    })
}

/// The continuous fixture from the original test suite.
pub fn complete_continuous() -> serde_json::Value {
    serde_json::json!({
        "bmds_version": "BMDS2601",
        "dataset_type": "C",
        "datasets": [{
            "id": 123,
            "doses": [0, 10, 50, 150, 400],
            "ns": [111, 142, 143, 93, 42],
            "responses": [2.112, 0, 1.956, 1.587, 1.254],
            "stdevs": [0.235, 0, 0.231, 0.263, 0.159],
        }],
    })
}
