//! Row and Window Application
//!
//! Two modes over the same pipeline contract: per-row, where each row
//! already carries a full signal array, and windowed, where scalar samples
//! are grouped by a key column and bucketed into fixed-width time windows
//! before one pipeline invocation per window.

use std::collections::BTreeMap;

use graph_executor::GraphExecutor;
use pipeline_graph::{Pipeline, RAW_INPUT};
use signal_kernels::Value;
use tracing::debug;

use crate::error::DriverError;
use crate::table::{KeepColumns, Record, Table};

/// Windowed-mode parameters.
#[derive(Debug, Clone)]
pub struct WindowSpec {
    /// Column holding one scalar sample per row.
    pub values_column: String,
    /// Column holding an integer millisecond timestamp per row.
    pub time_column: String,
    /// Fixed window width in milliseconds.
    pub window_ms: u64,
    /// Optional group key column; rows never share a window across groups.
    pub group_column: Option<String>,
}

/// Names of the feature columns a pipeline appends.
pub fn feature_columns(pipeline: &Pipeline) -> Vec<String> {
    pipeline
        .feature_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Apply the pipeline once per row.
///
/// The values column must hold a signal array; every sibling column is
/// offered to the pipeline as context under its own name. Output rows
/// carry the kept columns plus one column per exposed feature.
pub fn process_rows(
    executor: &GraphExecutor,
    pipeline: &Pipeline,
    rows: &[Record],
    values_column: &str,
    keep: &KeepColumns,
) -> Result<Table, DriverError> {
    let mut out = Table::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let signal = row
            .get(values_column)
            .ok_or_else(|| DriverError::MissingColumn {
                row: index,
                column: values_column.to_string(),
            })?;
        if signal.as_array().is_none() {
            return Err(DriverError::NotAnArray {
                row: index,
                column: values_column.to_string(),
            });
        }

        let mut context: BTreeMap<String, Value> = row.clone();
        context.remove(values_column);
        context.insert(RAW_INPUT.to_string(), signal.clone());

        let features = executor.run(pipeline, &context)?;

        let mut record: Record = row
            .iter()
            .filter(|(column, _)| keep.keeps(column, values_column))
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();
        for (name, value) in features {
            record.insert(name, value);
        }
        out.push(record);
    }

    debug!(rows = rows.len(), "processed per-row input");
    Ok(out)
}

/// Apply the pipeline once per time window.
///
/// Rows are split by the group column, bucketed by `timestamp / window_ms`
/// and their scalar samples gathered, in time order, into one signal array
/// per window. One output row per window: the kept columns of the window's
/// first row, the group key, the window start time and the features.
pub fn process_windows(
    executor: &GraphExecutor,
    pipeline: &Pipeline,
    rows: &[Record],
    spec: &WindowSpec,
    keep: &KeepColumns,
) -> Result<Table, DriverError> {
    if spec.window_ms == 0 {
        return Err(DriverError::ZeroWindow);
    }

    // (group key, bucket) -> time-ordered samples plus the first row seen.
    let mut windows: BTreeMap<(String, u64), (Vec<(u64, f64)>, usize)> = BTreeMap::new();

    for (index, row) in rows.iter().enumerate() {
        let group = match &spec.group_column {
            Some(column) => group_key(row, index, column)?,
            None => String::new(),
        };

        let time = match row.get(&spec.time_column) {
            Some(Value::Int(t)) if *t >= 0 => *t as u64,
            Some(_) => {
                return Err(DriverError::NotATimestamp {
                    row: index,
                    column: spec.time_column.clone(),
                })
            }
            None => {
                return Err(DriverError::MissingColumn {
                    row: index,
                    column: spec.time_column.clone(),
                })
            }
        };

        let sample = row
            .get(&spec.values_column)
            .ok_or_else(|| DriverError::MissingColumn {
                row: index,
                column: spec.values_column.clone(),
            })?
            .as_scalar()
            .ok_or_else(|| DriverError::NotAScalar {
                row: index,
                column: spec.values_column.clone(),
            })?;

        let bucket = time / spec.window_ms;
        windows
            .entry((group, bucket))
            .or_insert_with(|| (Vec::new(), index))
            .0
            .push((time, sample));
    }

    let mut out = Table::with_capacity(windows.len());
    for ((group, bucket), (mut samples, first_row)) in windows {
        samples.sort_by_key(|(time, _)| *time);
        let signal: Vec<f64> = samples.into_iter().map(|(_, sample)| sample).collect();
        let window_start = (bucket * spec.window_ms) as i64;
        let first = &rows[first_row];

        let mut context: BTreeMap<String, Value> = first.clone();
        context.remove(&spec.values_column);
        context.remove(&spec.time_column);
        context.insert(RAW_INPUT.to_string(), Value::Array(signal));

        let features = executor.run(pipeline, &context)?;

        let mut record: Record = first
            .iter()
            .filter(|(column, _)| {
                *column != &spec.time_column && keep.keeps(column, &spec.values_column)
            })
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();
        record.insert(spec.time_column.clone(), Value::Int(window_start));
        if let Some(column) = &spec.group_column {
            record.insert(column.clone(), Value::Text(group));
        }
        for (name, value) in features {
            record.insert(name, value);
        }
        out.push(record);
    }

    debug!(rows = rows.len(), windows = out.len(), "processed windowed input");
    Ok(out)
}

fn group_key(row: &Record, index: usize, column: &str) -> Result<String, DriverError> {
    let value = row.get(column).ok_or_else(|| DriverError::MissingColumn {
        row: index,
        column: column.to_string(),
    })?;
    let key = match value {
        Value::Text(text) => text.clone(),
        Value::Int(int) => int.to_string(),
        Value::Scalar(scalar) => scalar.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => {
            return Err(DriverError::NotAScalar {
                row: index,
                column: column.to_string(),
            })
        }
    };
    Ok(key)
}
