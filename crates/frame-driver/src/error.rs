//! Driver Error Types

use graph_executor::ExecError;
use thiserror::Error;

/// Errors raised while applying a pipeline over tabular records
#[derive(Debug, Error)]
pub enum DriverError {
    /// A row is missing a column the driver was told to read
    #[error("row {row}: column {column} is missing")]
    MissingColumn { row: usize, column: String },

    /// The values column of a row does not hold a 1-D signal
    #[error("row {row}: column {column} does not hold an array signal")]
    NotAnArray { row: usize, column: String },

    /// A windowed values column entry is not a scalar sample
    #[error("row {row}: column {column} does not hold a scalar sample")]
    NotAScalar { row: usize, column: String },

    /// A time column entry is not an integer millisecond timestamp
    #[error("row {row}: column {column} does not hold an integer timestamp")]
    NotATimestamp { row: usize, column: String },

    /// The window width must be positive
    #[error("window width must be a positive number of milliseconds")]
    ZeroWindow,

    /// The pipeline failed on one row or window
    #[error(transparent)]
    Exec(#[from] ExecError),
}
