//! Declarative schema registry for submission documents.
//!
//! Schemas are pure data: tables of field rules with no behavior of their
//! own. A small applier walks a parsed `serde_json::Value` against a table
//! and reports the first violation with a path into the document
//! (e.g. `$.datasets[0].ns`).
//!
//! Registry contents:
//! - [`BASE_SCHEMA`] — top-level request shape
//! - [`CONTINUOUS_DATASET_SCHEMA`] / [`DICHOTOMOUS_DATASET_SCHEMA`] — the
//!   `datasets` array, selected by `dataset_type`
//! - [`C_MODEL_SCHEMA`] / [`D_MODEL_SCHEMA`] — the `models` array, with
//!   per-type model name enums

use serde_json::Value;

use crate::error::ValidationError;
use crate::models::{CONTINUOUS_MODEL_NAMES, DICHOTOMOUS_MODEL_NAMES};

/// Allowed `dataset_type` discriminants.
pub const DATASET_TYPES: &[&str] = &["C", "D"];

/// Allowed `bmr.type` values (original display strings).
pub const BMR_TYPES: &[&str] = &["Extra", "Added", "Std. Dev.", "Abs. Dev.", "Rel. Dev.", "Point"];

/// What shape a single field must have.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Any JSON string.
    Text,
    /// Any JSON number.
    Number,
    /// A string drawn from a fixed set.
    TextEnum(&'static [&'static str]),
    /// A string or whole integer; floats are rejected.
    Identifier,
    /// Array of JSON numbers.
    NumberArray,
    /// Array of whole integers.
    WholeArray,
    /// Array of whole integers, each strictly positive.
    PositiveWholeArray,
    /// Array of anything, with a minimum length.
    AnyArray { min_items: usize },
    /// Array of objects matching a nested schema.
    ObjectArray(&'static ObjectSchema),
    /// A nested object matching a schema.
    Object(&'static ObjectSchema),
}

/// One field rule inside an [`ObjectSchema`].
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// A named table of field rules for one JSON object.
#[derive(Debug)]
pub struct ObjectSchema {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
}

/// A named schema for a JSON array of objects.
#[derive(Debug)]
pub struct ArraySchema {
    pub name: &'static str,
    pub items: &'static ObjectSchema,
    pub min_items: usize,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Object shape of one requested model: `{"name": <registry name>}`.
/// The name enum is applied by the per-type model schemas; at the base
/// level any string is structurally acceptable.
static MODEL_SPEC_ITEM: ObjectSchema = ObjectSchema {
    name: "model",
    fields: &[FieldRule {
        name: "name",
        kind: FieldKind::Text,
        required: true,
    }],
};

static C_MODEL_ITEM: ObjectSchema = ObjectSchema {
    name: "continuous model",
    fields: &[FieldRule {
        name: "name",
        kind: FieldKind::TextEnum(CONTINUOUS_MODEL_NAMES),
        required: true,
    }],
};

static D_MODEL_ITEM: ObjectSchema = ObjectSchema {
    name: "dichotomous model",
    fields: &[FieldRule {
        name: "name",
        kind: FieldKind::TextEnum(DICHOTOMOUS_MODEL_NAMES),
        required: true,
    }],
};

static BMR_SCHEMA: ObjectSchema = ObjectSchema {
    name: "bmr",
    fields: &[
        FieldRule {
            name: "type",
            kind: FieldKind::TextEnum(BMR_TYPES),
            required: true,
        },
        FieldRule {
            name: "value",
            kind: FieldKind::Number,
            required: true,
        },
    ],
};

/// Top-level request shape. Dataset entries are deliberately unchecked
/// here; the per-type dataset schemas below are applied after the
/// `dataset_type` discriminant is known.
pub static BASE_SCHEMA: ObjectSchema = ObjectSchema {
    name: "request",
    fields: &[
        FieldRule {
            name: "bmds_version",
            kind: FieldKind::Text,
            required: true,
        },
        FieldRule {
            name: "dataset_type",
            kind: FieldKind::TextEnum(DATASET_TYPES),
            required: true,
        },
        FieldRule {
            name: "datasets",
            kind: FieldKind::AnyArray { min_items: 1 },
            required: true,
        },
        FieldRule {
            name: "models",
            kind: FieldKind::ObjectArray(&MODEL_SPEC_ITEM),
            required: false,
        },
        FieldRule {
            name: "bmr",
            kind: FieldKind::Object(&BMR_SCHEMA),
            required: false,
        },
    ],
};

static CONTINUOUS_DATASET_ITEM: ObjectSchema = ObjectSchema {
    name: "continuous dataset",
    fields: &[
        FieldRule {
            name: "id",
            kind: FieldKind::Identifier,
            required: false,
        },
        FieldRule {
            name: "doses",
            kind: FieldKind::NumberArray,
            required: true,
        },
        FieldRule {
            name: "ns",
            kind: FieldKind::PositiveWholeArray,
            required: true,
        },
        FieldRule {
            name: "responses",
            kind: FieldKind::NumberArray,
            required: true,
        },
        FieldRule {
            name: "stdevs",
            kind: FieldKind::NumberArray,
            required: true,
        },
    ],
};

static DICHOTOMOUS_DATASET_ITEM: ObjectSchema = ObjectSchema {
    name: "dichotomous dataset",
    fields: &[
        FieldRule {
            name: "id",
            kind: FieldKind::Identifier,
            required: false,
        },
        FieldRule {
            name: "doses",
            kind: FieldKind::NumberArray,
            required: true,
        },
        FieldRule {
            name: "ns",
            kind: FieldKind::PositiveWholeArray,
            required: true,
        },
        FieldRule {
            name: "incidences",
            kind: FieldKind::WholeArray,
            required: true,
        },
    ],
};

/// Schema for the `datasets` array of a continuous request.
pub static CONTINUOUS_DATASET_SCHEMA: ArraySchema = ArraySchema {
    name: "continuous datasets",
    items: &CONTINUOUS_DATASET_ITEM,
    min_items: 1,
};

/// Schema for the `datasets` array of a dichotomous request.
pub static DICHOTOMOUS_DATASET_SCHEMA: ArraySchema = ArraySchema {
    name: "dichotomous datasets",
    items: &DICHOTOMOUS_DATASET_ITEM,
    min_items: 1,
};

/// Schema for the `models` array of a continuous request.
pub static C_MODEL_SCHEMA: ArraySchema = ArraySchema {
    name: "continuous models",
    items: &C_MODEL_ITEM,
    min_items: 0,
};

/// Schema for the `models` array of a dichotomous request.
pub static D_MODEL_SCHEMA: ArraySchema = ArraySchema {
    name: "dichotomous models",
    items: &D_MODEL_ITEM,
    min_items: 0,
};

// ---------------------------------------------------------------------------
// Applier
// ---------------------------------------------------------------------------

fn schema_error(path: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::Schema {
        path: path.to_owned(),
        message: message.into(),
    }
}

fn is_whole(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

fn check_field(value: &Value, kind: FieldKind, path: &str) -> Result<(), ValidationError> {
    match kind {
        FieldKind::Text => {
            if !value.is_string() {
                return Err(schema_error(path, "expected a string"));
            }
        }
        FieldKind::Number => {
            if !value.is_number() {
                return Err(schema_error(path, "expected a number"));
            }
        }
        FieldKind::TextEnum(allowed) => {
            let s = value
                .as_str()
                .ok_or_else(|| schema_error(path, "expected a string"))?;
            if !allowed.contains(&s) {
                return Err(schema_error(
                    path,
                    format!("\"{s}\" is not one of {allowed:?}"),
                ));
            }
        }
        FieldKind::Identifier => {
            if !value.is_string() && !is_whole(value) {
                return Err(schema_error(
                    path,
                    "expected a string or integer (floats are not valid identifiers)",
                ));
            }
        }
        FieldKind::NumberArray => {
            let items = value
                .as_array()
                .ok_or_else(|| schema_error(path, "expected an array of numbers"))?;
            for (i, item) in items.iter().enumerate() {
                if !item.is_number() {
                    return Err(schema_error(&format!("{path}[{i}]"), "expected a number"));
                }
            }
        }
        FieldKind::WholeArray | FieldKind::PositiveWholeArray => {
            let items = value
                .as_array()
                .ok_or_else(|| schema_error(path, "expected an array of integers"))?;
            for (i, item) in items.iter().enumerate() {
                if !is_whole(item) {
                    return Err(schema_error(
                        &format!("{path}[{i}]"),
                        "expected an integer",
                    ));
                }
                if matches!(kind, FieldKind::PositiveWholeArray)
                    && item.as_i64().is_some_and(|n| n <= 0)
                {
                    return Err(schema_error(
                        &format!("{path}[{i}]"),
                        "expected a value greater than 0",
                    ));
                }
            }
        }
        FieldKind::AnyArray { min_items } => {
            let items = value
                .as_array()
                .ok_or_else(|| schema_error(path, "expected an array"))?;
            if items.len() < min_items {
                return Err(schema_error(
                    path,
                    format!("expected at least {min_items} item(s)"),
                ));
            }
        }
        FieldKind::ObjectArray(item_schema) => {
            let items = value
                .as_array()
                .ok_or_else(|| schema_error(path, "expected an array of objects"))?;
            for (i, item) in items.iter().enumerate() {
                item_schema.check(item, &format!("{path}[{i}]"))?;
            }
        }
        FieldKind::Object(schema) => {
            schema.check(value, path)?;
        }
    }
    Ok(())
}

impl ObjectSchema {
    /// Check `value` against this schema. `path` locates `value` within
    /// the enclosing document for error reporting.
    pub fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| schema_error(path, format!("expected a {} object", self.name)))?;

        for rule in self.fields {
            let field_path = format!("{path}.{}", rule.name);
            match obj.get(rule.name) {
                Some(field) => check_field(field, rule.kind, &field_path)?,
                None if rule.required => {
                    return Err(schema_error(
                        &field_path,
                        format!("\"{}\" is a required field", rule.name),
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl ArraySchema {
    /// Check a JSON array against this schema, validating every item.
    pub fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        let items = value
            .as_array()
            .ok_or_else(|| schema_error(path, format!("expected a {} array", self.name)))?;
        if items.len() < self.min_items {
            return Err(schema_error(
                path,
                format!("expected at least {} item(s)", self.min_items),
            ));
        }
        for (i, item) in items.iter().enumerate() {
            self.items.check(item, &format!("{path}[{i}]"))?;
        }
        Ok(())
    }
}
