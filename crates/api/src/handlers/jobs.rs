//! Handlers for the `/api/job` resource.
//!
//! Submission runs the full validation pipeline before touching the
//! database: a job row exists only for fully validated requests. Polling
//! is a plain read; callers implement their own wait/backoff loop.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bmds_core::error::CoreError;
use bmds_core::types::{DbId, Timestamp};
use bmds_core::validation;
use bmds_db::models::job::Job;
use bmds_db::repositories::JobRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body of `POST /api/job`: the serialized request document as a string,
/// parsed and validated server-side.
#[derive(Debug, Deserialize)]
pub struct SubmitJobBody {
    pub inputs: String,
}

/// Wire representation of a job for submit and poll responses.
#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: DbId,
    pub is_finished: bool,
    pub inputs: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<serde_json::Value>,
    pub submitted_at: Timestamp,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            is_finished: job.is_finished,
            inputs: job.inputs.0,
            outputs: job.outputs.map(|o| o.0),
            submitted_at: job.submitted_at,
        }
    }
}

/// POST /api/job
///
/// Validate and submit a new dose-response job. Returns 201 with the
/// created job on success; any validation failure returns 400 with a
/// taxonomy code and creates no job. Never blocks on solver execution.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(body): Json<SubmitJobBody>,
) -> AppResult<impl IntoResponse> {
    let request = validation::validate_input(&body.inputs)?;

    // Persist the validated request verbatim; the dispatcher re-reads it.
    let inputs = serde_json::to_value(&request)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize request: {e}")))?;
    let job = JobRepo::submit(&state.pool, &inputs).await?;

    tracing::info!(
        job_id = job.id,
        dataset_type = %request.dataset_type,
        datasets = request.datasets.len(),
        "Job submitted",
    );

    Ok((StatusCode::CREATED, Json(JobView::from(job))))
}

/// GET /api/job/{id}
///
/// Poll a job: returns `is_finished` and, once finished, the immutable
/// outputs envelope. 404 for unknown ids.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    Ok(Json(JobView::from(job)))
}
