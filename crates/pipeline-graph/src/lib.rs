//! Pipeline Graph Construction
//!
//! Validates requested primitive chains and builds the minimal,
//! shared-subexpression execution graph: a flat, topologically ordered
//! instruction list plus input/output bindings and the exposed feature
//! names.

mod builder;
mod error;
mod pipeline;
mod validate;

pub use builder::{build_graph, FinalOutput, GraphArtifact, RAW_INPUT};
pub use error::BuildError;
pub use pipeline::{
    build_layered, build_layered_tags, build_linear, build_tree, merge, Pipeline,
};
pub use validate::{validate, Chain};
