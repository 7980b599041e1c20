//! Typed request model for dose-response job submissions.
//!
//! These types are only constructed by the validation pipeline in
//! [`crate::validation`]; a `Request` value is schema-valid and
//! invariant-checked by construction.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Which family of experimental data a request carries.
///
/// Wire values are the original single-letter discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetType {
    #[serde(rename = "C")]
    Continuous,
    #[serde(rename = "D")]
    Dichotomous,
}

impl DatasetType {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetType::Continuous => "C",
            DatasetType::Dichotomous => "D",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dataset identifier: absent, free text, or a whole number.
///
/// A float-typed id (e.g. `123.1`) is rejected at deserialization time.
/// The distinction is deliberate: an identifier is a whole label, not a
/// measured value, so `123` and `"123"` are fine but `123.1` is not.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DatasetId {
    #[default]
    Absent,
    Text(String),
    Whole(i64),
}

impl DatasetId {
    pub fn is_absent(&self) -> bool {
        matches!(self, DatasetId::Absent)
    }
}

impl Serialize for DatasetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DatasetId::Absent => serializer.serialize_none(),
            DatasetId::Text(s) => serializer.serialize_str(s),
            DatasetId::Whole(n) => serializer.serialize_i64(*n),
        }
    }
}

struct DatasetIdVisitor;

impl Visitor<'_> for DatasetIdVisitor {
    type Value = DatasetId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer dataset id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DatasetId, E> {
        Ok(DatasetId::Text(v.to_owned()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DatasetId, E> {
        Ok(DatasetId::Whole(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DatasetId, E> {
        i64::try_from(v)
            .map(DatasetId::Whole)
            .map_err(|_| E::custom("dataset id out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DatasetId, E> {
        Err(E::custom(format!(
            "dataset id must be a string or integer, got float {v}"
        )))
    }
}

impl<'de> Deserialize<'de> for DatasetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DatasetIdVisitor)
    }
}

/// A continuous dataset: dose groups with measured responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousDataset {
    #[serde(default, skip_serializing_if = "DatasetId::is_absent")]
    pub id: DatasetId,
    pub doses: Vec<f64>,
    pub ns: Vec<i64>,
    pub responses: Vec<f64>,
    pub stdevs: Vec<f64>,
}

/// A dichotomous dataset: dose groups with incidence counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DichotomousDataset {
    #[serde(default, skip_serializing_if = "DatasetId::is_absent")]
    pub id: DatasetId,
    pub doses: Vec<f64>,
    pub ns: Vec<i64>,
    pub incidences: Vec<i64>,
}

/// One dataset entry, discriminated by the request's `dataset_type`.
///
/// Serializes untagged (the request-level discriminant carries the type);
/// deserialization is always driven explicitly by the validation pipeline,
/// never inferred from shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Dataset {
    Continuous(ContinuousDataset),
    Dichotomous(DichotomousDataset),
}

impl Dataset {
    pub fn id(&self) -> &DatasetId {
        match self {
            Dataset::Continuous(d) => &d.id,
            Dataset::Dichotomous(d) => &d.id,
        }
    }
}

/// A requested model, by registry name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
}

/// Benchmark response type. Wire values are the original display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmrType {
    #[serde(rename = "Extra")]
    Extra,
    #[serde(rename = "Added")]
    Added,
    #[serde(rename = "Std. Dev.")]
    StdDev,
    #[serde(rename = "Abs. Dev.")]
    AbsDev,
    #[serde(rename = "Rel. Dev.")]
    RelDev,
    #[serde(rename = "Point")]
    Point,
}

/// An optional override of a model's default benchmark response target.
///
/// Threaded through to every model run unmodified; the solver transcript
/// must reflect the override's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmrOverride {
    #[serde(rename = "type")]
    pub bmr_type: BmrType,
    pub value: f64,
}

/// A fully validated submission. Immutable once attached to a job.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub bmds_version: String,
    pub dataset_type: DatasetType,
    pub datasets: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmr: Option<BmrOverride>,
}
