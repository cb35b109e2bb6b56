//! Manifest Records
//!
//! The canonical serializable descriptor record used for persistence and
//! for feeding the graph builder's input/output resolution. Round-tripping
//! a manifest reproduces an equivalent descriptor.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signal_kernels::Registry;

use crate::descriptor::{HyperparamSpec, InputArg, OutputArg, Primitive, TunableSpec};
use crate::error::CatalogError;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Classifier block: category and subtype as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classifiers {
    #[serde(rename = "type")]
    pub category: String,
    pub subtype: String,
}

/// One call argument in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestArg {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub context: bool,
}

/// One output field in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestOutput {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Produce block: call arguments and output fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Produce {
    pub args: Vec<ManifestArg>,
    pub output: Vec<ManifestOutput>,
}

/// Hyperparameter block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hyperparameters {
    #[serde(default)]
    pub fixed: BTreeMap<String, HyperparamSpec>,
    #[serde(default)]
    pub tunable: BTreeMap<String, TunableSpec>,
}

/// Canonical descriptor record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveManifest {
    pub name: String,
    pub classifiers: Classifiers,
    pub produce: Produce,
    pub hyperparameters: Hyperparameters,
}

impl PrimitiveManifest {
    /// Reconstruct a descriptor from this record against a kernel registry.
    pub fn to_primitive(&self, registry: &Registry) -> Result<Primitive, CatalogError> {
        let category = self.classifiers.category.parse()?;
        let subtype = self.classifiers.subtype.parse()?;
        let mut primitive =
            Primitive::with_registry(registry, &self.name, category, subtype, BTreeMap::new())?;

        primitive.set_inputs(
            self.produce
                .args
                .iter()
                .map(|arg| InputArg {
                    name: arg.name.clone(),
                    ty: arg.ty.clone(),
                    required: !arg.optional,
                    is_context: arg.context,
                })
                .collect(),
        );
        primitive.set_outputs(
            self.produce
                .output
                .iter()
                .map(|out| OutputArg {
                    name: out.name.clone(),
                    ty: out.ty.clone(),
                })
                .collect(),
        );
        primitive.set_fixed_hyperparameters(self.hyperparameters.fixed.clone());
        primitive.set_tunable_hyperparameters(self.hyperparameters.tunable.clone());

        Ok(primitive)
    }
}

impl Primitive {
    /// Render the canonical manifest record for this descriptor.
    pub fn to_manifest(&self) -> PrimitiveManifest {
        PrimitiveManifest {
            name: self.qualified_name().to_string(),
            classifiers: Classifiers {
                category: self.category().to_string(),
                subtype: self.subtype().to_string(),
            },
            produce: Produce {
                args: self
                    .inputs()
                    .iter()
                    .map(|input| ManifestArg {
                        name: input.name.clone(),
                        ty: input.ty.clone(),
                        optional: !input.required,
                        context: input.is_context,
                    })
                    .collect(),
                output: self
                    .outputs()
                    .iter()
                    .map(|out| ManifestOutput {
                        name: out.name.clone(),
                        ty: out.ty.clone(),
                    })
                    .collect(),
            },
            hyperparameters: Hyperparameters {
                fixed: self.fixed_hyperparameters().clone(),
                tunable: self.tunable_hyperparameters().clone(),
            },
        }
    }
}

/// Write a descriptor manifest as JSON under `root`.
///
/// With `subfolders` the dotted name maps to a directory tree
/// (`a.b.c` -> `a/b/c.json`), otherwise to a flat `a.b.c.json` file.
pub fn write_manifest(
    primitive: &Primitive,
    root: &Path,
    subfolders: bool,
) -> Result<PathBuf, CatalogError> {
    let manifest = primitive.to_manifest();
    let path = if subfolders {
        let mut path = root.to_path_buf();
        let mut segments = manifest.name.split('.').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{segment}.json"));
            }
        }
        path
    } else {
        root.join(format!("{}.json", manifest.name))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
    Ok(path)
}

/// Read a descriptor manifest from a JSON file.
pub fn read_manifest(path: &Path) -> Result<PrimitiveManifest, CatalogError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use signal_kernels::builtins as kernel_builtins;

    #[test]
    fn test_manifest_round_trip() {
        let primitive = builtins::kurtosis(false, true);
        let manifest = primitive.to_manifest();
        let restored = manifest.to_primitive(kernel_builtins()).unwrap();

        assert_eq!(restored.qualified_name(), primitive.qualified_name());
        assert_eq!(restored.category(), primitive.category());
        assert_eq!(restored.subtype(), primitive.subtype());
        assert_eq!(restored.inputs(), primitive.inputs());
        assert_eq!(restored.outputs(), primitive.outputs());
        assert_eq!(
            restored.fixed_hyperparameters(),
            primitive.fixed_hyperparameters()
        );
    }

    #[test]
    fn test_manifest_json_schema() {
        let manifest = builtins::mean().to_manifest();
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["name"], "aggregations.amplitude.statistical.mean");
        assert_eq!(json["classifiers"]["type"], "aggregation");
        assert_eq!(json["classifiers"]["subtype"], "amplitude");
        assert_eq!(json["produce"]["args"][0]["name"], "amplitude_values");
        assert_eq!(json["produce"]["output"][0]["name"], "mean_value");
    }

    #[test]
    fn test_context_flag_survives_round_trip() {
        let mut primitive = builtins::mean();
        primitive.set_context_arguments(vec![("segment_id".to_string(), "str".to_string())]);
        let restored = primitive
            .to_manifest()
            .to_primitive(kernel_builtins())
            .unwrap();
        assert_eq!(restored.context_arguments().count(), 1);
    }

    #[test]
    fn test_invalid_category_string() {
        let mut manifest = builtins::mean().to_manifest();
        manifest.classifiers.category = "reduction".to_string();
        assert!(matches!(
            manifest.to_primitive(kernel_builtins()),
            Err(CatalogError::InvalidCategory(_))
        ));
    }

    #[test]
    fn test_write_and_read_manifest() {
        let dir = std::env::temp_dir().join("primitive-catalog-manifest-test");
        let _ = fs::remove_dir_all(&dir);

        let primitive = builtins::band_mean(20.0, 30.0);
        let path = write_manifest(&primitive, &dir, true).unwrap();
        assert!(path.ends_with("aggregations/frequency/band/band_mean.json"));

        let manifest = read_manifest(&path).unwrap();
        assert_eq!(manifest, primitive.to_manifest());

        let flat = write_manifest(&primitive, &dir, false).unwrap();
        assert!(flat.ends_with("aggregations.frequency.band.band_mean.json"));

        let _ = fs::remove_dir_all(&dir);
    }
}
