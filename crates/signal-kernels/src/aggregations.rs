//! Built-in Aggregation Kernels
//!
//! Statistical amplitude aggregations and frequency band aggregations.
//! Aggregations over an empty signal yield NaN.

use crate::error::KernelError;
use crate::value::{KernelArgs, Value};

/// Central moments up to order four, computed in one pass over the values.
struct Moments {
    n: f64,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl Moments {
    fn compute(values: &[f64]) -> Self {
        let n = values.len() as f64;
        if values.is_empty() {
            return Self {
                n,
                mean: f64::NAN,
                m2: f64::NAN,
                m3: f64::NAN,
                m4: f64::NAN,
            };
        }

        let mean = values.iter().sum::<f64>() / n;
        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        for &v in values {
            let d = v - mean;
            m2 += d * d;
            m3 += d * d * d;
            m4 += d * d * d * d;
        }

        Self {
            n,
            mean,
            m2: m2 / n,
            m3: m3 / n,
            m4: m4 / n,
        }
    }
}

/// Arithmetic mean of the amplitude values.
pub fn mean(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let moments = Moments::compute(args.array("amplitude_values")?);
    Ok(vec![Value::Scalar(moments.mean)])
}

/// Population standard deviation of the amplitude values.
pub fn std(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let moments = Moments::compute(args.array("amplitude_values")?);
    Ok(vec![Value::Scalar(moments.m2.sqrt())])
}

/// Population variance of the amplitude values.
pub fn var(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let moments = Moments::compute(args.array("amplitude_values")?);
    Ok(vec![Value::Scalar(moments.m2)])
}

/// Root mean square of the amplitude values.
pub fn rms(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let values = args.array("amplitude_values")?;
    if values.is_empty() {
        return Ok(vec![Value::Scalar(f64::NAN)]);
    }
    let mean_square = values.iter().map(|&v| v * v).sum::<f64>() / values.len() as f64;
    Ok(vec![Value::Scalar(mean_square.sqrt())])
}

/// Ratio of the absolute peak to the RMS. Estimates impact wear.
pub fn crest_factor(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let values = args.array("amplitude_values")?;
    if values.is_empty() {
        return Ok(vec![Value::Scalar(f64::NAN)]);
    }
    let peak = values.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
    let mean_square = values.iter().map(|&v| v * v).sum::<f64>() / values.len() as f64;
    Ok(vec![Value::Scalar(peak / mean_square.sqrt())])
}

/// Sample skewness of the amplitude values (biased estimator).
pub fn skew(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let moments = Moments::compute(args.array("amplitude_values")?);
    let value = if moments.m2 > 0.0 {
        moments.m3 / moments.m2.powf(1.5)
    } else {
        0.0
    };
    Ok(vec![Value::Scalar(value)])
}

/// Kurtosis of the amplitude values.
///
/// `fisher = true` yields excess kurtosis (normal => 0.0), otherwise the
/// Pearson definition (normal => 3.0). `bias = false` applies the
/// statistical bias correction; it needs at least four samples.
pub fn kurtosis(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let values = args.array("amplitude_values")?;
    let fisher = args.bool_or("fisher", true)?;
    let bias = args.bool_or("bias", true)?;

    if values.is_empty() {
        return Ok(vec![Value::Scalar(f64::NAN)]);
    }

    let moments = Moments::compute(values);
    let mut excess = if moments.m2 > 0.0 {
        moments.m4 / (moments.m2 * moments.m2) - 3.0
    } else if fisher {
        -3.0
    } else {
        0.0
    };

    if !bias && moments.m2 > 0.0 && moments.n > 3.0 {
        let n = moments.n;
        excess = ((n - 1.0) / ((n - 2.0) * (n - 3.0))) * ((n + 1.0) * excess + 6.0);
    }

    let value = if fisher { excess } else { excess + 3.0 };
    Ok(vec![Value::Scalar(value)])
}

/// Mean of the amplitude values whose frequency lies inside
/// [min_frequency, max_frequency].
pub fn band_mean(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
    let amplitude_values = args.array("amplitude_values")?;
    let frequency_values = args.array("frequency_values")?;
    let min_frequency = args.scalar("min_frequency")?;
    let max_frequency = args.scalar("max_frequency")?;

    if amplitude_values.len() != frequency_values.len() {
        return Err(KernelError::LengthMismatch {
            left: "amplitude_values",
            right: "frequency_values",
            left_len: amplitude_values.len(),
            right_len: frequency_values.len(),
        });
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for (&amplitude, &frequency) in amplitude_values.iter().zip(frequency_values) {
        if frequency >= min_frequency && frequency <= max_frequency {
            sum += amplitude;
            count += 1;
        }
    }

    let value = if count > 0 {
        sum / count as f64
    } else {
        f64::NAN
    };
    Ok(vec![Value::Scalar(value)])
}
