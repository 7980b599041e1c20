//! Job entity model.

use bmds_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `jobs` table.
///
/// `inputs` is the validated request, persisted verbatim at submission and
/// never rewritten. `outputs` appears exactly when `is_finished` flips to
/// true and is immutable from then on.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub status_id: StatusId,
    pub is_finished: bool,
    pub inputs: Json<serde_json::Value>,
    pub outputs: Option<Json<serde_json::Value>>,
    pub submitted_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}
