//! Job output envelope.
//!
//! Mirrors the polling wire shape: `outputs.outputs[i].models[j]` is one
//! model run against one dataset. A model run either succeeded (`outfile`
//! + `output` present) or failed (`error` present); one model's failure
//! never removes its siblings from the envelope.

use serde::{Deserialize, Serialize};

use crate::request::DatasetId;

/// The full `outputs` payload attached to a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutputs {
    pub outputs: Vec<DatasetOutputs>,
}

/// All model runs for one dataset entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOutputs {
    /// Position of the dataset within the request's `datasets` array.
    pub dataset_index: usize,
    /// The caller-supplied dataset id, echoed back when present.
    #[serde(default, skip_serializing_if = "DatasetId::is_absent")]
    pub dataset_id: DatasetId,
    pub models: Vec<ModelOutcome>,
}

/// The result of running one model against one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutcome {
    pub name: String,
    /// Raw solver transcript. Present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outfile: Option<String>,
    /// Parsed numeric summary (at minimum a `BMD` field). Present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Failure marker for a crashed or unparseable solver run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelOutcome {
    pub fn success(name: String, outfile: String, output: serde_json::Value) -> Self {
        Self {
            name,
            outfile: Some(outfile),
            output: Some(output),
            error: None,
        }
    }

    pub fn failure(name: String, error: String) -> Self {
        Self {
            name,
            outfile: None,
            output: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_outcome_serializes_without_error_field() {
        let outcome = ModelOutcome::success(
            "Logistic".into(),
            "transcript".into(),
            json!({"BMD": 29.5318}),
        );
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outfile"], "transcript");
        assert_eq!(value["output"]["BMD"], 29.5318);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_outcome_carries_only_the_error() {
        let outcome = ModelOutcome::failure("Linear".into(), "solver crashed".into());
        let value = serde_json::to_value(&outcome).unwrap();
        assert!(value.get("outfile").is_none());
        assert!(value.get("output").is_none());
        assert_eq!(value["error"], "solver crashed");
        assert!(!outcome.is_success());
    }

    #[test]
    fn envelope_round_trips() {
        let envelope = JobOutputs {
            outputs: vec![DatasetOutputs {
                dataset_index: 0,
                dataset_id: DatasetId::Whole(123),
                models: vec![ModelOutcome::success(
                    "Logistic".into(),
                    "out".into(),
                    json!({"BMD": 1.0}),
                )],
            }],
        };
        let value = serde_json::to_value(&envelope).unwrap();
        let back: JobOutputs = serde_json::from_value(value).unwrap();
        assert_eq!(back, envelope);
    }
}
