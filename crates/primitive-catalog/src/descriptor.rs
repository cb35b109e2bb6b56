//! Primitive Descriptor
//!
//! One struct describes every computation unit; the `(category, subtype)`
//! pair plus the canonical schema table replace per-primitive types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use signal_kernels::{builtins, Registry, Value};

use crate::error::CatalogError;
use crate::taxonomy::{default_inputs, default_outputs, Category, Subtype};

/// Declared formal input of a primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputArg {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Required inputs must resolve to an upstream output or the raw input.
    pub required: bool,
    /// Context inputs are supplied by the caller at execution time.
    pub is_context: bool,
}

/// Declared output field of a primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputArg {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Fixed hyperparameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparamSpec {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Tunable hyperparameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunableSpec {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<Value>>,
}

/// Descriptor for one transformation or aggregation primitive.
///
/// Identity is the dotted `qualified_name`; the `tag` is the short
/// user-facing name used to build output paths and must be unique within
/// one graph build.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    qualified_name: String,
    tag: String,
    category: Category,
    subtype: Subtype,
    inputs: Vec<InputArg>,
    outputs: Vec<OutputArg>,
    fixed_hyperparameters: BTreeMap<String, HyperparamSpec>,
    tunable_hyperparameters: BTreeMap<String, TunableSpec>,
    init_params: BTreeMap<String, Value>,
    kernel_params: Vec<String>,
}

impl Primitive {
    /// Construct a descriptor backed by a built-in kernel.
    pub fn new(
        qualified_name: &str,
        category: Category,
        subtype: Subtype,
    ) -> Result<Self, CatalogError> {
        Self::with_params(qualified_name, category, subtype, BTreeMap::new())
    }

    /// Construct a descriptor with concrete hyperparameter values bound.
    pub fn with_params(
        qualified_name: &str,
        category: Category,
        subtype: Subtype,
        init_params: BTreeMap<String, Value>,
    ) -> Result<Self, CatalogError> {
        Self::with_registry(builtins(), qualified_name, category, subtype, init_params)
    }

    /// Construct a descriptor backed by a kernel in the given registry.
    /// This is the entry point for user-contributed primitives.
    pub fn with_registry(
        registry: &Registry,
        qualified_name: &str,
        category: Category,
        subtype: Subtype,
        init_params: BTreeMap<String, Value>,
    ) -> Result<Self, CatalogError> {
        let kernel = registry
            .get(qualified_name)
            .ok_or_else(|| CatalogError::FunctionNotFound(qualified_name.to_string()))?;

        let tag = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name)
            .to_string();

        Ok(Self {
            qualified_name: qualified_name.to_string(),
            tag,
            category,
            subtype,
            inputs: default_inputs(category, subtype),
            outputs: default_outputs(category, subtype),
            fixed_hyperparameters: BTreeMap::new(),
            tunable_hyperparameters: BTreeMap::new(),
            init_params,
            kernel_params: kernel.params().to_vec(),
        })
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn subtype(&self) -> Subtype {
        self.subtype
    }

    pub fn inputs(&self) -> &[InputArg] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputArg] {
        &self.outputs
    }

    /// Declared inputs flagged as context arguments.
    pub fn context_arguments(&self) -> impl Iterator<Item = &InputArg> {
        self.inputs.iter().filter(|input| input.is_context)
    }

    pub fn fixed_hyperparameters(&self) -> &BTreeMap<String, HyperparamSpec> {
        &self.fixed_hyperparameters
    }

    pub fn tunable_hyperparameters(&self) -> &BTreeMap<String, TunableSpec> {
        &self.tunable_hyperparameters
    }

    pub fn init_params(&self) -> &BTreeMap<String, Value> {
        &self.init_params
    }

    /// Rename the tag; uniqueness is checked later, per graph build.
    pub fn set_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Replace the declared inputs (full replacement, no merge).
    pub fn set_inputs(&mut self, inputs: Vec<InputArg>) {
        self.inputs = inputs;
    }

    /// Replace the declared outputs (full replacement, no merge).
    pub fn set_outputs(&mut self, outputs: Vec<OutputArg>) {
        self.outputs = outputs;
    }

    pub fn set_fixed_hyperparameters(
        &mut self,
        hyperparameters: BTreeMap<String, HyperparamSpec>,
    ) {
        self.fixed_hyperparameters = hyperparameters;
    }

    pub fn set_tunable_hyperparameters(
        &mut self,
        hyperparameters: BTreeMap<String, TunableSpec>,
    ) {
        self.tunable_hyperparameters = hyperparameters;
    }

    /// Replace the context arguments. Non-context inputs are kept; the
    /// given arguments are appended flagged as required context inputs.
    pub fn set_context_arguments(&mut self, arguments: Vec<(String, String)>) {
        self.inputs.retain(|input| !input.is_context);
        for (name, ty) in arguments {
            self.inputs.push(InputArg {
                name,
                ty,
                required: true,
                is_context: true,
            });
        }
    }

    /// Check the declarations against the kernel's formal parameter list.
    ///
    /// Idempotent and side-effect-free; fails when a required data-flow
    /// input (other than `amplitude_values`), a context argument or a
    /// declared hyperparameter is not accepted by the kernel, or when the
    /// kernel accepts parameters nothing declares.
    pub fn validate_signature(&self) -> Result<(), CatalogError> {
        let mut remaining: Vec<&str> = self.kernel_params.iter().map(String::as_str).collect();

        fn consume(remaining: &mut Vec<&str>, name: &str) -> bool {
            if let Some(position) = remaining.iter().position(|p| *p == name) {
                remaining.remove(position);
                true
            } else {
                false
            }
        }

        for input in &self.inputs {
            let present = consume(&mut remaining, &input.name);
            if present {
                continue;
            }
            if input.is_context {
                return Err(CatalogError::SignatureMismatch {
                    primitive: self.qualified_name.clone(),
                    kind: "context argument",
                    argument: input.name.clone(),
                });
            }
            if input.required && input.name != "amplitude_values" {
                return Err(CatalogError::SignatureMismatch {
                    primitive: self.qualified_name.clone(),
                    kind: "input",
                    argument: input.name.clone(),
                });
            }
        }

        for name in self
            .fixed_hyperparameters
            .keys()
            .chain(self.tunable_hyperparameters.keys())
        {
            if !consume(&mut remaining, name) {
                return Err(CatalogError::SignatureMismatch {
                    primitive: self.qualified_name.clone(),
                    kind: "hyperparameter",
                    argument: name.clone(),
                });
            }
        }

        if !remaining.is_empty() {
            return Err(CatalogError::UnexpectedArguments {
                primitive: self.qualified_name.clone(),
                arguments: remaining.join(", "),
            });
        }

        Ok(())
    }
}
