//! Primitive Taxonomy and Canonical Argument Schemas
//!
//! The `(category, subtype)` pair fully determines a primitive's default
//! input and output shape through the fixed lookup table below. Behavior
//! differences between subtypes live here, not in type hierarchies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::descriptor::{InputArg, OutputArg};
use crate::error::CatalogError;

/// Primitive category: chainable transformation or terminal aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transformation,
    Aggregation,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Transformation => f.write_str("transformation"),
            Category::Aggregation => f.write_str("aggregation"),
        }
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transformation" => Ok(Category::Transformation),
            "aggregation" => Ok(Category::Aggregation),
            other => Err(CatalogError::InvalidCategory(other.to_string())),
        }
    }
}

/// Data subtype the primitive operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtype {
    Amplitude,
    Frequency,
    FrequencyTime,
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subtype::Amplitude => f.write_str("amplitude"),
            Subtype::Frequency => f.write_str("frequency"),
            Subtype::FrequencyTime => f.write_str("frequency_time"),
        }
    }
}

impl FromStr for Subtype {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amplitude" => Ok(Subtype::Amplitude),
            "frequency" => Ok(Subtype::Frequency),
            "frequency_time" => Ok(Subtype::FrequencyTime),
            other => Err(CatalogError::InvalidSubtype(other.to_string())),
        }
    }
}

fn input(name: &str, ty: &str, required: bool) -> InputArg {
    InputArg {
        name: name.to_string(),
        ty: ty.to_string(),
        required,
        is_context: false,
    }
}

fn output(name: &str, ty: &str) -> OutputArg {
    OutputArg {
        name: name.to_string(),
        ty: ty.to_string(),
    }
}

/// Canonical default input arguments for a `(category, subtype)` pair.
pub fn default_inputs(category: Category, subtype: Subtype) -> Vec<InputArg> {
    match (category, subtype) {
        (Category::Transformation, Subtype::Amplitude) => vec![
            input("amplitude_values", "ndarray", true),
            input("sampling_frequency", "float", false),
        ],
        (Category::Transformation, Subtype::Frequency)
        | (Category::Transformation, Subtype::FrequencyTime) => vec![
            input("amplitude_values", "ndarray", true),
            input("sampling_frequency", "float", true),
        ],
        (Category::Aggregation, Subtype::Amplitude) => {
            vec![input("amplitude_values", "ndarray", true)]
        }
        (Category::Aggregation, Subtype::Frequency) => vec![
            input("amplitude_values", "ndarray", true),
            input("frequency_values", "ndarray", true),
        ],
        (Category::Aggregation, Subtype::FrequencyTime) => vec![
            input("amplitude_values", "ndarray", true),
            input("frequency_values", "ndarray", true),
            input("time_values", "ndarray", true),
        ],
    }
}

/// Canonical default output arguments for a `(category, subtype)` pair.
pub fn default_outputs(category: Category, subtype: Subtype) -> Vec<OutputArg> {
    match (category, subtype) {
        (Category::Transformation, Subtype::Amplitude) => {
            vec![output("amplitude_values", "ndarray")]
        }
        (Category::Transformation, Subtype::Frequency) => vec![
            output("amplitude_values", "ndarray"),
            output("frequency_values", "ndarray"),
        ],
        (Category::Transformation, Subtype::FrequencyTime) => vec![
            output("amplitude_values", "ndarray"),
            output("frequency_values", "ndarray"),
            output("time_values", "ndarray"),
        ],
        (Category::Aggregation, _) => vec![output("value", "float")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in [Category::Transformation, Category::Aggregation] {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_invalid_strings() {
        assert!(matches!(
            "filter".parse::<Category>(),
            Err(CatalogError::InvalidCategory(_))
        ));
        assert!(matches!(
            "phase".parse::<Subtype>(),
            Err(CatalogError::InvalidSubtype(_))
        ));
    }

    #[test]
    fn test_amplitude_transformation_schema() {
        let inputs = default_inputs(Category::Transformation, Subtype::Amplitude);
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].name, "amplitude_values");
        assert!(inputs[0].required);
        assert!(!inputs[1].required);
    }

    #[test]
    fn test_aggregation_default_output() {
        for subtype in [Subtype::Amplitude, Subtype::Frequency, Subtype::FrequencyTime] {
            let outputs = default_outputs(Category::Aggregation, subtype);
            assert_eq!(outputs.len(), 1);
            assert_eq!(outputs[0].name, "value");
        }
    }

    #[test]
    fn test_frequency_time_aggregation_inputs_all_required() {
        let inputs = default_inputs(Category::Aggregation, Subtype::FrequencyTime);
        let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["amplitude_values", "frequency_values", "time_values"]
        );
        assert!(inputs.iter().all(|i| i.required));
    }
}
