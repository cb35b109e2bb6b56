//! Catalog Error Types

use thiserror::Error;

/// Errors raised while constructing or validating a primitive descriptor
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Category string outside the fixed taxonomy
    #[error("invalid primitive category: {0}")]
    InvalidCategory(String),

    /// Subtype string outside the fixed taxonomy
    #[error("invalid primitive subtype: {0}")]
    InvalidSubtype(String),

    /// No kernel registered under the qualified name
    #[error("no kernel registered under {0}")]
    FunctionNotFound(String),

    /// Declared argument or hyperparameter absent from the kernel signature
    #[error("primitive {primitive}: declared {kind} {argument} is not accepted by the kernel")]
    SignatureMismatch {
        primitive: String,
        kind: &'static str,
        argument: String,
    },

    /// Kernel parameters left over after accounting for all declarations
    #[error("primitive {primitive}: kernel accepts undeclared arguments: {arguments}")]
    UnexpectedArguments {
        primitive: String,
        arguments: String,
    },

    /// Manifest file could not be read or written
    #[error("manifest I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest record could not be parsed or rendered
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
