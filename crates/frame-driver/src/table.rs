//! In-Memory Record Table
//!
//! Rows are flat maps from column name to value; a table is just a row
//! vector. Rich enough for the driver contract, nothing more.

use std::collections::BTreeMap;

use signal_kernels::Value;

/// One row of a tabular input or output.
pub type Record = BTreeMap<String, Value>;

/// A tabular input or output, row major.
pub type Table = Vec<Record>;

/// Which original columns survive into the output rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepColumns {
    /// Every column except the values column.
    All,
    /// Drop every original column.
    None,
    /// Keep exactly the named columns.
    Only(Vec<String>),
}

impl KeepColumns {
    pub(crate) fn keeps(&self, column: &str, values_column: &str) -> bool {
        match self {
            KeepColumns::All => column != values_column,
            KeepColumns::None => false,
            KeepColumns::Only(names) => names.iter().any(|n| n == column),
        }
    }
}

/// Convenience constructor for building rows in demos and tests.
pub fn record<I>(columns: I) -> Record
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    columns
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
