//! Model registry and compatibility resolution.
//!
//! Model names are partitioned by dataset type; the two sets are disjoint,
//! and a name valid for one type is a hard rejection for the other even
//! when spelled correctly.

use crate::error::ValidationError;
use crate::request::{DatasetType, ModelSpec};

/// Models runnable against continuous datasets.
pub static CONTINUOUS_MODEL_NAMES: &[&str] = &[
    "Exponential-M2",
    "Exponential-M3",
    "Exponential-M4",
    "Exponential-M5",
    "Hill",
    "Linear",
    "Polynomial",
    "Power",
];

/// Models runnable against dichotomous datasets.
pub static DICHOTOMOUS_MODEL_NAMES: &[&str] = &[
    "Logistic",
    "LogLogistic",
    "LogProbit",
    "Probit",
    "Gamma",
    "Multistage",
    "Multistage-Cancer",
    "Weibull",
    "Quantal-Linear",
];

/// All model names registered for a dataset type.
pub fn model_names_for(dataset_type: DatasetType) -> &'static [&'static str] {
    match dataset_type {
        DatasetType::Continuous => CONTINUOUS_MODEL_NAMES,
        DatasetType::Dichotomous => DICHOTOMOUS_MODEL_NAMES,
    }
}

/// Resolve a requested model list against the dataset type's registry.
///
/// An absent or empty request means "run every model registered for the
/// type". Any name outside the type's set fails with
/// [`ValidationError::Compatibility`]; a name belonging to the opposite
/// type's set gets a message naming the mismatch.
pub fn resolve_models(
    dataset_type: DatasetType,
    requested: Option<&[ModelSpec]>,
) -> Result<Vec<String>, ValidationError> {
    let registered = model_names_for(dataset_type);

    let specs = match requested {
        None => return Ok(registered.iter().map(|&n| n.to_owned()).collect()),
        Some([]) => return Ok(registered.iter().map(|&n| n.to_owned()).collect()),
        Some(specs) => specs,
    };

    let other = match dataset_type {
        DatasetType::Continuous => DICHOTOMOUS_MODEL_NAMES,
        DatasetType::Dichotomous => CONTINUOUS_MODEL_NAMES,
    };

    let mut resolved = Vec::with_capacity(specs.len());
    for spec in specs {
        let name = spec.name.as_str();
        if !registered.contains(&name) {
            let message = if other.contains(&name) {
                format!(
                    "\"{name}\" is not valid for dataset type \"{dataset_type}\" \
                     (it belongs to the other dataset type's model set)"
                )
            } else {
                format!("unknown model \"{name}\" for dataset type \"{dataset_type}\"")
            };
            return Err(ValidationError::Compatibility(message));
        }
        resolved.push(name.to_owned());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn specs(names: &[&str]) -> Vec<ModelSpec> {
        names.iter().map(|&n| ModelSpec { name: n.into() }).collect()
    }

    #[test]
    fn model_sets_are_disjoint() {
        for name in CONTINUOUS_MODEL_NAMES {
            assert!(!DICHOTOMOUS_MODEL_NAMES.contains(name));
        }
    }

    #[test]
    fn absent_request_resolves_to_all_registered_models() {
        let resolved = resolve_models(DatasetType::Dichotomous, None).unwrap();
        assert_eq!(resolved.len(), DICHOTOMOUS_MODEL_NAMES.len());
        assert!(resolved.iter().any(|n| n == "Logistic"));
    }

    #[test]
    fn empty_request_resolves_to_all_registered_models() {
        let resolved = resolve_models(DatasetType::Continuous, Some(&[])).unwrap();
        assert_eq!(resolved.len(), CONTINUOUS_MODEL_NAMES.len());
    }

    #[test]
    fn valid_names_resolve_in_request_order() {
        let resolved = resolve_models(
            DatasetType::Continuous,
            Some(&specs(&["Exponential-M2", "Linear"])),
        )
        .unwrap();
        assert_eq!(resolved, vec!["Exponential-M2", "Linear"]);
    }

    #[test]
    fn continuous_name_rejected_for_dichotomous_request() {
        let err = resolve_models(
            DatasetType::Dichotomous,
            Some(&specs(&["Exponential-M2"])),
        )
        .unwrap_err();
        assert_matches!(err, ValidationError::Compatibility(_));
        assert!(err.to_string().contains("Exponential-M2"));
    }

    #[test]
    fn dichotomous_name_rejected_for_continuous_request() {
        let err =
            resolve_models(DatasetType::Continuous, Some(&specs(&["Logistic"]))).unwrap_err();
        assert_matches!(err, ValidationError::Compatibility(_));
    }

    #[test]
    fn unknown_name_rejected_for_either_type() {
        let err =
            resolve_models(DatasetType::Continuous, Some(&specs(&["Cubic"]))).unwrap_err();
        assert!(err.to_string().contains("unknown model"));
    }
}
