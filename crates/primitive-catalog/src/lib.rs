//! Primitive Catalog
//!
//! Primitive descriptors for signal feature pipelines: the
//! transformation/aggregation taxonomy, the canonical per-subtype argument
//! schemas, declaration-vs-kernel signature validation, manifest
//! (de)serialization and the built-in primitive factories.

pub mod builtins;
mod descriptor;
mod error;
mod manifest;
mod taxonomy;

pub use descriptor::{HyperparamSpec, InputArg, OutputArg, Primitive, TunableSpec};
pub use error::CatalogError;
pub use manifest::{read_manifest, write_manifest, PrimitiveManifest};
pub use taxonomy::{default_inputs, default_outputs, Category, Subtype};
