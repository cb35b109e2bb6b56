//! Built-in Transformation Kernels
//!
//! Amplitude, frequency and frequency-time transformations over signal
//! values. All kernels are pure functions over their resolved arguments.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::KernelError;
use crate::value::{KernelArgs, Value};

/// Forward FFT of a real signal.
fn forward_fft(signal: &[f64]) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    if !buffer.is_empty() {
        let fft = FftPlanner::new().plan_fft_forward(buffer.len());
        fft.process(&mut buffer);
    }
    buffer
}

/// Sample frequencies for a full-length FFT: non-negative bins first,
/// then the negative half, spaced at `fs / n`.
fn fft_frequencies(n: usize, sampling_frequency: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let step = sampling_frequency / n as f64;
    let positive = (n - 1) / 2 + 1;
    (0..n)
        .map(|i| {
            if i < positive {
                i as f64 * step
            } else {
                (i as i64 - n as i64) as f64 * step
            }
        })
        .collect()
}

/// Sample frequencies for a one-sided FFT: `0 ..= n/2` bins at `fs / n`.
fn rfft_frequencies(n: usize, sampling_frequency: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let step = sampling_frequency / n as f64;
    (0..=n / 2).map(|i| i as f64 * step).collect()
}

/// Periodic Hann window for short-time spectra.
fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
        .collect()
}

/// Pass the amplitude values through unchanged.
pub fn identity(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    Ok(vec![Value::Array(amplitude_values.to_vec())])
}

/// Full complex FFT plus the matching frequency values.
pub fn fft(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let sampling_frequency = args.scalar("sampling_frequency")?;

    let spectrum = forward_fft(amplitude_values);
    let frequency_values = fft_frequencies(spectrum.len(), sampling_frequency);
    let complex: Vec<[f64; 2]> = spectrum.iter().map(|c| [c.re, c.im]).collect();

    Ok(vec![
        Value::ComplexArray(complex),
        Value::Array(frequency_values),
    ])
}

/// Real components of the FFT plus the matching frequency values.
pub fn fft_real(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let sampling_frequency = args.scalar("sampling_frequency")?;

    let spectrum = forward_fft(amplitude_values);
    let frequency_values = fft_frequencies(spectrum.len(), sampling_frequency);
    let real: Vec<f64> = spectrum.iter().map(|c| c.re).collect();

    Ok(vec![Value::Array(real), Value::Array(frequency_values)])
}

/// Pass the amplitude values through and attach FFT frequency values.
pub fn fft_freq(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let sampling_frequency = args.scalar("sampling_frequency")?;

    let frequency_values = fft_frequencies(amplitude_values.len(), sampling_frequency);

    Ok(vec![
        Value::Array(amplitude_values.to_vec()),
        Value::Array(frequency_values),
    ])
}

/// One-sided power spectrum (magnitude squared) plus frequency values.
pub fn power_spectrum(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let sampling_frequency = args.scalar("sampling_frequency")?;

    let n = amplitude_values.len();
    let spectrum = forward_fft(amplitude_values);
    let power: Vec<f64> = spectrum.iter().take(n / 2 + 1).map(|c| c.norm_sqr()).collect();
    let frequency_values = rfft_frequencies(n, sampling_frequency);

    Ok(vec![Value::Array(power), Value::Array(frequency_values)])
}

/// Keep only the amplitude and frequency values strictly inside (low, high).
pub fn frequency_band(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let frequency_values = args.array("frequency_values")?;
    let low = args.scalar("low")?;
    let high = args.scalar("high")?;

    if amplitude_values.len() != frequency_values.len() {
        return Err(KernelError::LengthMismatch {
            left: "amplitude_values",
            right: "frequency_values",
            left_len: amplitude_values.len(),
            right_len: frequency_values.len(),
        });
    }

    let mut amplitudes = Vec::new();
    let mut frequencies = Vec::new();
    for (&amplitude, &frequency) in amplitude_values.iter().zip(frequency_values) {
        if frequency > low && frequency < high {
            amplitudes.push(amplitude);
            frequencies.push(frequency);
        }
    }

    Ok(vec![Value::Array(amplitudes), Value::Array(frequencies)])
}

/// Short Time Fourier Transform: Hann-windowed 256-sample segments with
/// 50% overlap, one-sided spectrum per segment scaled by the window sum.
fn stft_segments(signal: &[f64], sampling_frequency: f64) -> (Vec<Vec<Complex<f64>>>, Vec<f64>, Vec<f64>) {
    let n = signal.len();
    let nperseg = n.min(256);
    if nperseg == 0 {
        return (Vec::new(), Vec::new(), Vec::new());
    }

    let window = hann_window(nperseg);
    let window_sum: f64 = window.iter().sum();
    let scale = if window_sum > 0.0 { 1.0 / window_sum } else { 1.0 };
    let step = (nperseg - nperseg / 2).max(1);

    let mut slices = Vec::new();
    let mut time_values = Vec::new();
    let mut start = 0;
    while start + nperseg <= n {
        let windowed: Vec<f64> = signal[start..start + nperseg]
            .iter()
            .zip(&window)
            .map(|(&v, &w)| v * w)
            .collect();
        let spectrum: Vec<Complex<f64>> = forward_fft(&windowed)
            .into_iter()
            .take(nperseg / 2 + 1)
            .map(|c| c * scale)
            .collect();
        slices.push(spectrum);
        time_values.push((start + nperseg / 2) as f64 / sampling_frequency);
        start += step;
    }

    let frequency_values = rfft_frequencies(nperseg, sampling_frequency);
    (slices, frequency_values, time_values)
}

/// Complex STFT spectrogram plus frequency and time values.
pub fn stft(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let sampling_frequency = args.scalar("sampling_frequency")?;

    let (slices, frequency_values, time_values) =
        stft_segments(amplitude_values, sampling_frequency);
    let complex: Vec<Vec<[f64; 2]>> = slices
        .iter()
        .map(|row| row.iter().map(|c| [c.re, c.im]).collect())
        .collect();

    Ok(vec![
        Value::ComplexMatrix(complex),
        Value::Array(frequency_values),
        Value::Array(time_values),
    ])
}

/// Real components of the STFT spectrogram plus frequency and time values.
pub fn stft_real(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let sampling_frequency = args.scalar("sampling_frequency")?;

    let (slices, frequency_values, time_values) =
        stft_segments(amplitude_values, sampling_frequency);
    let real: Vec<Vec<f64>> = slices
        .iter()
        .map(|row| row.iter().map(|c| c.re).collect())
        .collect();

    Ok(vec![
        Value::Matrix(real),
        Value::Array(frequency_values),
        Value::Array(time_values),
    ])
}
