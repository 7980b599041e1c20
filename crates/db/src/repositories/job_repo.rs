//! Repository for the `jobs` table.
//!
//! Uses `JobStatus` from `models::status` for all transitions — no magic
//! numbers. The finish path writes `outputs` and `is_finished` in one
//! statement so a concurrent poll can never see one without the other.

use bmds_core::types::DbId;
use sqlx::types::Json;

use crate::models::job::Job;
use crate::models::status::JobStatus;
use crate::DbPool;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, status_id, is_finished, inputs, outputs, \
    submitted_at, started_at, completed_at";

/// Provides CRUD operations for dose-response jobs.
pub struct JobRepo;

impl JobRepo {
    /// Persist a new `Created` job holding the validated request.
    /// Returns immediately with the job row; execution happens later.
    pub async fn submit(pool: &DbPool, inputs: &serde_json::Value) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (status_id, is_finished, inputs, submitted_at) \
             VALUES (?1, 0, ?2, ?3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Created.id())
            .bind(Json(inputs))
            .bind(chrono::Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Fetch a job by ID.
    pub async fn find_by_id(pool: &DbPool, job_id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = ?1");
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest `Created` job, moving it to `Running`.
    ///
    /// SQLite serializes writers, so the single UPDATE-with-subquery is
    /// claim-safe without row locks; a job is handed to at most one task.
    pub async fn claim_next(pool: &DbPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = ?1, started_at = ?2 \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status_id = ?3 \
                 ORDER BY submitted_at ASC, id ASC \
                 LIMIT 1 \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Running.id())
            .bind(chrono::Utc::now())
            .bind(JobStatus::Created.id())
            .fetch_optional(pool)
            .await
    }

    /// Finish a job, attaching its outputs envelope.
    ///
    /// `outputs` and `is_finished` are written together in one statement,
    /// guarded by `is_finished = 0`: the transition is monotonic and
    /// idempotent, and repeated calls after completion are no-ops.
    /// Returns whether this call performed the transition.
    pub async fn finish(
        pool: &DbPool,
        job_id: DbId,
        outputs: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = ?1, is_finished = 1, outputs = ?2, completed_at = ?3 \
             WHERE id = ?4 AND is_finished = 0",
        )
        .bind(JobStatus::Finished.id())
        .bind(Json(outputs))
        .bind(chrono::Utc::now())
        .bind(job_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Re-queue unfinished jobs left `Running` by an interrupted process.
    ///
    /// Called once at startup, before the dispatcher begins claiming: any
    /// unfinished `Running` row belongs to a task that no longer exists,
    /// so it goes back to `Created` for a fresh claim. Returns how many
    /// rows were re-queued.
    pub async fn requeue_interrupted(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs \
             SET status_id = ?1, started_at = NULL \
             WHERE status_id = ?2 AND is_finished = 0",
        )
        .bind(JobStatus::Created.id())
        .bind(JobStatus::Running.id())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count jobs that have not yet finished (dispatch backlog + running).
    pub async fn count_unfinished(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs WHERE is_finished = 0")
            .fetch_one(pool)
            .await
    }
}
