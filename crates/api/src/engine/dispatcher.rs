//! Background job dispatcher.
//!
//! Polls for `Created` jobs every `poll_interval`, claims them atomically
//! via [`JobRepo::claim_next`], and spawns one task per job. Within a job,
//! model runs execute concurrently and failures are isolated per model:
//! a crashed solver produces an error record in the outputs envelope while
//! sibling models still complete. Every claimed job reaches `Finished`.

use std::sync::Arc;
use std::time::Duration;

use bmds_core::models::resolve_models;
use bmds_core::outputs::{DatasetOutputs, JobOutputs, ModelOutcome};
use bmds_core::request::Request;
use bmds_core::validation;
use bmds_db::models::job::Job;
use bmds_db::repositories::JobRepo;
use bmds_db::DbPool;
use bmds_solver::{ModelRun, SolverBackend};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

/// Default polling interval for the dispatcher loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Background job dispatcher.
///
/// A single long-lived Tokio task that feeds claimed jobs to the solver
/// backend. Submission and polling never wait on it.
pub struct JobDispatcher {
    pool: DbPool,
    solver: Arc<dyn SolverBackend>,
    poll_interval: Duration,
}

impl JobDispatcher {
    /// Create a new dispatcher with the default 1-second poll interval.
    pub fn new(pool: DbPool, solver: Arc<dyn SolverBackend>) -> Self {
        Self {
            pool,
            solver,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the dispatcher loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Job dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.dispatch_pending().await {
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }
    }

    /// One dispatch cycle: claim every currently-pending job and spawn a
    /// task per job. Returns once all claimable jobs are in flight.
    pub async fn dispatch_pending(&self) -> Result<(), sqlx::Error> {
        while let Some(job) = JobRepo::claim_next(&self.pool).await? {
            tracing::info!(job_id = job.id, "Job claimed for execution");

            let pool = self.pool.clone();
            let solver = Arc::clone(&self.solver);
            tokio::spawn(async move {
                run_job(pool, solver, job).await;
            });
        }
        Ok(())
    }
}

/// Execute one claimed job to completion and finish it.
///
/// Never leaves the job in `Running`: whatever happens during execution,
/// an outputs envelope is attached and `is_finished` flips exactly once.
async fn run_job(pool: DbPool, solver: Arc<dyn SolverBackend>, job: Job) {
    let job_id = job.id;
    let outputs = execute_job(&solver, &job).await;

    let value = match serde_json::to_value(&outputs) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(job_id, error = %e, "Failed to serialize job outputs");
            serde_json::json!({ "outputs": [] })
        }
    };

    match JobRepo::finish(&pool, job_id, &value).await {
        Ok(true) => {
            let failed = outputs
                .outputs
                .iter()
                .flat_map(|d| &d.models)
                .filter(|m| !m.is_success())
                .count();
            tracing::info!(job_id, failed_models = failed, "Job finished");
        }
        Ok(false) => tracing::warn!(job_id, "Job was already finished"),
        Err(e) => tracing::error!(job_id, error = %e, "Failed to finish job"),
    }
}

/// Run every resolved model against every dataset of the job's request.
async fn execute_job(solver: &Arc<dyn SolverBackend>, job: &Job) -> JobOutputs {
    // The inputs row is the validated request the submit handler wrote;
    // revalidating is cheap and keeps this task free of partial decoding.
    let request: Request = match validation::validate_document(&job.inputs.0) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(job_id = job.id, error = %e, "Stored job inputs failed revalidation");
            return JobOutputs { outputs: Vec::new() };
        }
    };

    let model_names = match resolve_models(request.dataset_type, request.models.as_deref()) {
        Ok(names) => names,
        Err(e) => {
            tracing::error!(job_id = job.id, error = %e, "Stored job inputs failed model resolution");
            return JobOutputs { outputs: Vec::new() };
        }
    };

    let mut outputs = Vec::with_capacity(request.datasets.len());
    for (index, dataset) in request.datasets.iter().enumerate() {
        let runs = model_names.iter().map(|name| {
            let run = ModelRun {
                dataset_type: request.dataset_type,
                dataset: dataset.clone(),
                model_name: name.clone(),
                bmr: request.bmr,
            };
            let solver = Arc::clone(solver);
            let job_id = job.id;
            async move {
                match solver.run_model(&run).await {
                    Ok(fit) => ModelOutcome::success(run.model_name, fit.outfile, fit.output),
                    Err(e) => {
                        tracing::warn!(
                            job_id,
                            model = %run.model_name,
                            error = %e,
                            "Model run failed",
                        );
                        ModelOutcome::failure(run.model_name, e.to_string())
                    }
                }
            }
        });

        let models = join_all(runs).await;
        outputs.push(DatasetOutputs {
            dataset_index: index,
            dataset_id: dataset.id().clone(),
            models,
        });
    }

    JobOutputs { outputs }
}
