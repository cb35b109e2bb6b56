//! Signal Processing Kernels
//!
//! Provides the dynamic value type, the kernel registry and the built-in
//! numeric transformation and aggregation functions.

mod aggregations;
mod error;
mod registry;
mod transformations;
mod value;

pub use error::KernelError;
pub use registry::{builtins, Kernel, KernelFn, Registry};
pub use value::{KernelArgs, Value};
