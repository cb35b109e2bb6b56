//! Dynamic Values Exchanged Between Kernels

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::KernelError;

/// Value flowing through a pipeline graph: raw signals, spectra,
/// spectrograms, hyperparameters and terminal features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean hyperparameter
    Bool(bool),
    /// Integer hyperparameter or timestamp
    Int(i64),
    /// Scalar value (feature or hyperparameter)
    Scalar(f64),
    /// Group key or other label
    Text(String),
    /// 1-D signal (amplitude, frequency or time values)
    Array(Vec<f64>),
    /// 1-D complex signal stored as (re, im) pairs
    ComplexArray(Vec<[f64; 2]>),
    /// 2-D spectrogram, one row per time slice
    Matrix(Vec<Vec<f64>>),
    /// 2-D complex spectrogram, one row per time slice
    ComplexMatrix(Vec<Vec<[f64; 2]>>),
}

impl Value {
    /// Interpret the value as a scalar, accepting integers.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Array(v)
    }
}

/// Read-only view over the resolved arguments of one kernel invocation.
///
/// The executor merges resolved data-flow inputs, context values and
/// hyperparameters into a single map before calling the kernel.
pub struct KernelArgs<'a> {
    values: &'a BTreeMap<String, Value>,
}

impl<'a> KernelArgs<'a> {
    pub fn new(values: &'a BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Required 1-D array argument.
    pub fn array(&self, name: &'static str) -> Result<&[f64], KernelError> {
        match self.values.get(name) {
            None => Err(KernelError::MissingArgument { name }),
            Some(value) => value.as_array().ok_or(KernelError::TypeMismatch {
                name,
                expected: "array",
            }),
        }
    }

    /// Required scalar argument (integers are widened).
    pub fn scalar(&self, name: &'static str) -> Result<f64, KernelError> {
        match self.values.get(name) {
            None => Err(KernelError::MissingArgument { name }),
            Some(value) => value.as_scalar().ok_or(KernelError::TypeMismatch {
                name,
                expected: "scalar",
            }),
        }
    }

    /// Boolean argument with a default for when it is not supplied.
    pub fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, KernelError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or(KernelError::TypeMismatch {
                name,
                expected: "bool",
            }),
        }
    }
}
