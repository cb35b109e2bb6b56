//! Tabular Pipeline Driver
//!
//! Applies a built signal feature pipeline over an in-memory record table,
//! once per row or once per grouped time window, and merges the exposed
//! features back as new columns.

pub mod demo;
mod driver;
mod error;
mod table;

pub use driver::{feature_columns, process_rows, process_windows, WindowSpec};
pub use error::DriverError;
pub use table::{record, KeepColumns, Record, Table};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
