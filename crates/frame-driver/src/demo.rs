//! Synthetic Demo Data
//!
//! Deterministic multi-tone signals and a small reference pipeline, used
//! by the `signal-demo` binary and handy for integration tests.

use pipeline_graph::{build_linear, BuildError, Pipeline};
use primitive_catalog::builtins;
use signal_kernels::Value;

use crate::table::{record, Table};

/// Demo sampling rate in Hz.
pub const DEMO_SAMPLING_FREQUENCY: f64 = 1000.0;

fn multi_tone(length: usize, tones: &[(f64, f64)], phase: f64) -> Vec<f64> {
    (0..length)
        .map(|i| {
            let t = i as f64 / DEMO_SAMPLING_FREQUENCY;
            tones
                .iter()
                .map(|&(frequency, amplitude)| {
                    amplitude * (2.0 * std::f64::consts::PI * frequency * t + phase).sin()
                })
                .sum()
        })
        .collect()
}

/// Per-row demo table: one full signal array per row, a few machines.
pub fn demo_signal_rows() -> Table {
    let mut rows = Table::new();
    for (index, machine) in ["T001", "T002", "T003"].iter().enumerate() {
        for segment in 0..4 {
            // Tone mix drifts per machine and per segment so every row
            // produces distinct features.
            let phase = segment as f64 * 0.25;
            let tones = [
                (50.0 + 10.0 * index as f64, 1.0),
                (120.0, 0.5 + 0.1 * segment as f64),
            ];
            rows.push(record([
                ("turbine_id", Value::Text(machine.to_string())),
                ("segment", Value::Int(segment)),
                (
                    "sampling_frequency",
                    Value::Scalar(DEMO_SAMPLING_FREQUENCY),
                ),
                (
                    "signal_values",
                    Value::Array(multi_tone(512, &tones, phase)),
                ),
            ]));
        }
    }
    rows
}

/// Windowed demo table: scalar samples at 1 kHz with timestamps, two
/// machines, enough rows for several one-second windows.
pub fn demo_sample_rows() -> Table {
    let mut rows = Table::new();
    for (index, machine) in ["T001", "T002"].iter().enumerate() {
        let tones = [(60.0 + 20.0 * index as f64, 1.0), (180.0, 0.3)];
        let samples = multi_tone(3000, &tones, 0.0);
        for (i, sample) in samples.into_iter().enumerate() {
            rows.push(record([
                ("turbine_id", Value::Text(machine.to_string())),
                ("timestamp", Value::Int(i as i64)),
                ("sample", Value::Scalar(sample)),
                (
                    "sampling_frequency",
                    Value::Scalar(DEMO_SAMPLING_FREQUENCY),
                ),
            ]));
        }
    }
    rows
}

/// Reference pipeline: one FFT spine feeding amplitude statistics and a
/// band aggregation.
pub fn demo_pipeline() -> Result<Pipeline, BuildError> {
    let fftr = builtins::fft_real().set_tag("fftr");
    build_linear(
        &[fftr],
        &[
            builtins::mean(),
            builtins::std(),
            builtins::rms(),
            builtins::kurtosis(true, true),
            builtins::band_mean(40.0, 200.0),
        ],
    )
}
