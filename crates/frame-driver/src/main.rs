//! Signal Feature Pipeline - Demo Entry Point

use frame_driver::demo::{demo_pipeline, demo_sample_rows, demo_signal_rows};
use frame_driver::{init_logging, process_rows, process_windows, KeepColumns, WindowSpec};
use graph_executor::GraphExecutor;
use signal_kernels::Value;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Signal Feature Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let pipeline = demo_pipeline()?;
    info!(
        instances = pipeline.graph().instance_list.len(),
        features = pipeline.final_outputs().len(),
        "demo pipeline built"
    );
    for name in pipeline.feature_names() {
        info!(feature = name, "exposed output");
    }

    let executor = GraphExecutor::new();

    // Per-row mode: every row already carries a full signal segment.
    let rows = demo_signal_rows();
    let out = process_rows(
        &executor,
        &pipeline,
        &rows,
        "signal_values",
        &KeepColumns::Only(vec!["turbine_id".to_string(), "segment".to_string()]),
    )?;
    info!(rows = out.len(), "per-row features computed");
    if let Some(first) = out.first() {
        for (column, value) in first {
            if let Value::Scalar(v) = value {
                info!(column = column.as_str(), value = *v, "first row feature");
            }
        }
    }

    // Windowed mode: scalar samples bucketed into one-second windows.
    let samples = demo_sample_rows();
    let spec = WindowSpec {
        values_column: "sample".to_string(),
        time_column: "timestamp".to_string(),
        window_ms: 1000,
        group_column: Some("turbine_id".to_string()),
    };
    let windows = process_windows(&executor, &pipeline, &samples, &spec, &KeepColumns::None)?;
    info!(windows = windows.len(), "windowed features computed");

    Ok(())
}
