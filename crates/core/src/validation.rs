//! Layered validation pipeline for submission documents.
//!
//! Stages, in order, each pure and fail-fast:
//!
//! 1. parse — raw text must be well-formed JSON;
//! 2. base schema — top-level shape ([`schema::BASE_SCHEMA`]);
//! 3. dataset schema — per-type shape of the `datasets` array, selected by
//!    the `dataset_type` discriminant;
//! 4. model schema — per-type model name enum over the `models` array;
//! 5. typed decode — build the [`Request`] value;
//! 6. cross-field invariants — constraints schemas cannot express;
//! 7. model compatibility — semantic re-check of requested names.
//!
//! No job is created until every stage has passed; the first violation is
//! surfaced with enough detail to identify the offending field.

use serde_json::Value;

use crate::error::ValidationError;
use crate::models;
use crate::request::{
    BmrOverride, ContinuousDataset, Dataset, DatasetType, DichotomousDataset, ModelSpec, Request,
};
use crate::schema;

/// Parse and fully validate a raw submission document.
pub fn validate_input(raw: &str) -> Result<Request, ValidationError> {
    let doc: Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::Parse(e.to_string()))?;
    validate_document(&doc)
}

/// Validate an already-parsed submission document.
pub fn validate_document(doc: &Value) -> Result<Request, ValidationError> {
    schema::BASE_SCHEMA.check(doc, "$")?;

    let dataset_type = decode::<DatasetType>(&doc["dataset_type"], "$.dataset_type")?;

    // Dataset-type-conditional schema dispatch.
    let datasets_value = &doc["datasets"];
    match dataset_type {
        DatasetType::Continuous => {
            schema::CONTINUOUS_DATASET_SCHEMA.check(datasets_value, "$.datasets")?
        }
        DatasetType::Dichotomous => {
            schema::DICHOTOMOUS_DATASET_SCHEMA.check(datasets_value, "$.datasets")?
        }
    }

    // Schema-layer model name enum, then the semantic resolver below.
    if let Some(models_value) = doc.get("models") {
        match dataset_type {
            DatasetType::Continuous => schema::C_MODEL_SCHEMA.check(models_value, "$.models")?,
            DatasetType::Dichotomous => schema::D_MODEL_SCHEMA.check(models_value, "$.models")?,
        }
    }

    let items = datasets_value.as_array().ok_or_else(|| ValidationError::Schema {
        path: "$.datasets".into(),
        message: "expected an array".into(),
    })?;

    let mut datasets = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = format!("$.datasets[{i}]");
        let dataset = match dataset_type {
            DatasetType::Continuous => {
                Dataset::Continuous(decode::<ContinuousDataset>(item, &path)?)
            }
            DatasetType::Dichotomous => {
                Dataset::Dichotomous(decode::<DichotomousDataset>(item, &path)?)
            }
        };
        check_dataset_invariants(i, &dataset)?;
        datasets.push(dataset);
    }

    let model_specs = match doc.get("models") {
        Some(value) => Some(decode::<Vec<ModelSpec>>(value, "$.models")?),
        None => None,
    };
    models::resolve_models(dataset_type, model_specs.as_deref())?;

    let bmr = match doc.get("bmr") {
        Some(value) => Some(decode::<BmrOverride>(value, "$.bmr")?),
        None => None,
    };

    let bmds_version = decode::<String>(&doc["bmds_version"], "$.bmds_version")?;

    Ok(Request {
        bmds_version,
        dataset_type,
        datasets,
        models: model_specs,
        bmr,
    })
}

/// Cross-field invariants one dataset entry must satisfy.
///
/// Evaluated after the schema pass, so array items are already known to be
/// well-typed; these checks relate fields to each other.
fn check_dataset_invariants(index: usize, dataset: &Dataset) -> Result<(), ValidationError> {
    let violation = |message: String| {
        Err(ValidationError::Invariant(format!(
            "datasets[{index}]: {message}"
        )))
    };

    match dataset {
        Dataset::Continuous(d) => {
            let len = d.doses.len();
            if d.ns.len() != len || d.responses.len() != len || d.stdevs.len() != len {
                return violation(format!(
                    "doses/ns/responses/stdevs must have equal lengths \
                     (got {}/{}/{}/{})",
                    len,
                    d.ns.len(),
                    d.responses.len(),
                    d.stdevs.len()
                ));
            }
            if let Some(pos) = d.ns.iter().position(|&n| n <= 0) {
                return violation(format!("ns[{pos}] must be greater than 0"));
            }
        }
        Dataset::Dichotomous(d) => {
            let len = d.doses.len();
            if d.ns.len() != len || d.incidences.len() != len {
                return violation(format!(
                    "doses/ns/incidences must have equal lengths (got {}/{}/{})",
                    len,
                    d.ns.len(),
                    d.incidences.len()
                ));
            }
            if let Some(pos) = d.ns.iter().position(|&n| n <= 0) {
                return violation(format!("ns[{pos}] must be greater than 0"));
            }
            for (pos, (&incidence, &n)) in d.incidences.iter().zip(&d.ns).enumerate() {
                if incidence < 0 || incidence > n {
                    return violation(format!(
                        "incidences[{pos}] must be between 0 and ns[{pos}] ({n}), got {incidence}"
                    ));
                }
            }
        }
    }
    Ok(())
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value, path: &str) -> Result<T, ValidationError> {
    serde_json::from_value(value.clone()).map_err(|e| ValidationError::Schema {
        path: path.to_owned(),
        message: e.to_string(),
    })
}
