//! Solver backend trait and result types.

use async_trait::async_trait;
use bmds_core::request::{BmrOverride, Dataset, DatasetType};
use serde::{Deserialize, Serialize};

/// Parameter document for one model run: one dataset, one model name, and
/// the optional BMR override passed through unmodified.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRun {
    pub dataset_type: DatasetType,
    pub dataset: Dataset,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmr: Option<BmrOverride>,
}

/// What the backend returns for one successful model run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    /// Raw solver transcript. When a BMR override was supplied, the
    /// transcript contains a line identifying the specified effect value.
    pub outfile: String,
    /// Parsed numeric summary; at minimum a `BMD` field.
    pub output: serde_json::Value,
}

/// Failures of a single model run. Captured per model by the dispatcher;
/// never propagated as a job-level failure.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Failed to execute solver: {0}")]
    Io(#[from] std::io::Error),

    #[error("Solver timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Solver exited with code {exit_code}: {stderr}")]
    Crashed { exit_code: i32, stderr: String },

    #[error("Solver produced unparseable output: {0}")]
    UnparseableOutput(String),
}

/// The execution backend contract.
///
/// Implementations must be safe to call concurrently; the dispatcher runs
/// many model runs in flight at once across jobs.
#[async_trait]
pub trait SolverBackend: Send + Sync {
    /// Run one model against one dataset and return its fit.
    async fn run_model(&self, run: &ModelRun) -> Result<ModelFit, SolverError>;
}
