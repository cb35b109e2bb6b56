//! Execution Error Types

use signal_kernels::KernelError;
use thiserror::Error;

/// Errors raised while running a built pipeline graph
#[derive(Debug, Error)]
pub enum ExecError {
    /// A required input could not be resolved from the namespace
    #[error(
        "instance {instance}: required argument {argument} \
         (expected under column {source_column}) was not supplied"
    )]
    MissingArgument {
        instance: String,
        argument: String,
        source_column: String,
    },

    /// The registry has no kernel behind an instance's qualified name
    #[error("no kernel registered under {name}")]
    UnknownKernel { name: String },

    /// The pipeline carries no descriptor for a graph instance
    #[error("instance {instance} has no backing descriptor")]
    MissingDescriptor { instance: String },

    /// A kernel returned a different number of outputs than declared
    #[error("instance {instance}: kernel produced {actual} outputs, {expected} declared")]
    OutputArity {
        instance: String,
        expected: usize,
        actual: usize,
    },

    /// The kernel itself failed
    #[error("instance {instance}: {source}")]
    Kernel {
        instance: String,
        source: KernelError,
    },
}
