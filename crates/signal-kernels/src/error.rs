//! Kernel Error Types

use thiserror::Error;

/// Errors raised while resolving arguments or running a kernel
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    /// Required argument missing from the resolved argument map
    #[error("missing required argument: {name}")]
    MissingArgument { name: &'static str },

    /// Argument present but of the wrong value kind
    #[error("argument {name} has the wrong type, expected {expected}")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
    },

    /// Paired input arrays have different lengths
    #[error("arguments {left} and {right} have mismatched lengths ({left_len} vs {right_len})")]
    LengthMismatch {
        left: &'static str,
        right: &'static str,
        left_len: usize,
        right_len: usize,
    },
}
