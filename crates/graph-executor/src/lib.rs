//! Pipeline Graph Execution
//!
//! Runs a built pipeline graph over a flat namespace of named values:
//! instances execute in topological order, every output lands under its
//! bound column name, and the exposed features come back in the graph's
//! creation order.

mod error;
mod executor;

pub use error::ExecError;
pub use executor::GraphExecutor;
