//! Graph Building Error Types

use primitive_catalog::CatalogError;
use thiserror::Error;

/// Errors raised while validating chains or building the graph
#[derive(Debug, Error)]
pub enum BuildError {
    /// A descriptor declaration does not match its kernel signature
    #[error(transparent)]
    Descriptor(#[from] CatalogError),

    /// Two distinct descriptors share a tag
    #[error("tag {tag} duplicated in the primitive set, all primitives must have distinct tags")]
    DuplicateTag { tag: String },

    /// No non-empty output feature was requested
    #[error("at least one non-empty output feature must be specified")]
    EmptyChainSet,

    /// A non-terminal chain element is not a transformation
    #[error("chain {chain}: primitive {tag} at position {position} is not a transformation")]
    NotATransformation {
        chain: usize,
        position: usize,
        tag: String,
    },

    /// The last chain element is not an aggregation
    #[error("chain {chain}: last primitive {tag} is not an aggregation")]
    NoTerminalAggregation { chain: usize, tag: String },

    /// A chain element is absent from the declared primitive set
    #[error("primitive with tag {tag} not found in the given primitives")]
    UnknownPrimitive { tag: String },

    /// A chain is a strict prefix of another chain. Indicates the chain
    /// validator was bypassed; unrecoverable.
    #[error("output feature {path} is a strict prefix of another requested feature")]
    PrefixConflict { path: String },
}
