//! Built-in Primitive Factories
//!
//! Descriptor constructors for every built-in kernel, with the output
//! renames and fixed hyperparameter declarations each one carries.

use std::collections::BTreeMap;

use signal_kernels::{builtins as kernel_builtins, Value};

use crate::descriptor::{HyperparamSpec, InputArg, OutputArg, Primitive};
use crate::taxonomy::{Category, Subtype};

fn builtin(
    qualified_name: &str,
    category: Category,
    subtype: Subtype,
    init_params: BTreeMap<String, Value>,
) -> Primitive {
    Primitive::with_registry(kernel_builtins(), qualified_name, category, subtype, init_params)
        .expect("built-in kernel is registered")
}

fn input(name: &str, ty: &str) -> InputArg {
    InputArg {
        name: name.to_string(),
        ty: ty.to_string(),
        required: true,
        is_context: false,
    }
}

fn output(name: &str, ty: &str) -> OutputArg {
    OutputArg {
        name: name.to_string(),
        ty: ty.to_string(),
    }
}

fn hyperparam(ty: &str, default: Option<Value>) -> HyperparamSpec {
    HyperparamSpec {
        ty: ty.to_string(),
        default,
    }
}

// Transformations

/// Amplitude passthrough.
pub fn identity() -> Primitive {
    builtin(
        "transformations.amplitude.identity.identity",
        Category::Transformation,
        Subtype::Amplitude,
        BTreeMap::new(),
    )
}

/// One-sided power spectrum. Declared as an amplitude transformation but
/// produces frequency-shaped outputs.
pub fn power_spectrum() -> Primitive {
    let mut primitive = builtin(
        "transformations.amplitude.spectrum.power_spectrum",
        Category::Transformation,
        Subtype::Amplitude,
        BTreeMap::new(),
    );
    primitive.set_inputs(vec![
        input("amplitude_values", "ndarray"),
        input("sampling_frequency", "float"),
    ]);
    primitive.set_outputs(vec![
        output("amplitude_values", "ndarray"),
        output("frequency_values", "ndarray"),
    ]);
    primitive
}

/// Full complex FFT.
pub fn fft() -> Primitive {
    builtin(
        "transformations.frequency.fft.fft",
        Category::Transformation,
        Subtype::Frequency,
        BTreeMap::new(),
    )
}

/// FFT keeping only real components.
pub fn fft_real() -> Primitive {
    builtin(
        "transformations.frequency.fft.fft_real",
        Category::Transformation,
        Subtype::Frequency,
        BTreeMap::new(),
    )
}

/// Amplitude passthrough attaching FFT sample frequencies.
pub fn fft_freq() -> Primitive {
    builtin(
        "transformations.frequency.fftfreq.fft_freq",
        Category::Transformation,
        Subtype::Frequency,
        BTreeMap::new(),
    )
}

/// Band-pass filter over an already-transformed spectrum.
pub fn frequency_band(low: f64, high: f64) -> Primitive {
    let mut init_params = BTreeMap::new();
    init_params.insert("low".to_string(), Value::Scalar(low));
    init_params.insert("high".to_string(), Value::Scalar(high));

    let mut primitive = builtin(
        "transformations.frequency.band.frequency_band",
        Category::Transformation,
        Subtype::Frequency,
        init_params,
    );
    primitive.set_inputs(vec![
        input("amplitude_values", "ndarray"),
        input("frequency_values", "ndarray"),
    ]);
    primitive.set_outputs(vec![
        output("amplitude_values", "ndarray"),
        output("frequency_values", "ndarray"),
    ]);

    let mut fixed = BTreeMap::new();
    fixed.insert("low".to_string(), hyperparam("float", None));
    fixed.insert("high".to_string(), hyperparam("float", None));
    primitive.set_fixed_hyperparameters(fixed);
    primitive
}

/// Short Time Fourier Transform.
pub fn stft() -> Primitive {
    builtin(
        "transformations.frequency_time.stft.stft",
        Category::Transformation,
        Subtype::FrequencyTime,
        BTreeMap::new(),
    )
}

/// STFT keeping only real components.
pub fn stft_real() -> Primitive {
    let mut primitive = builtin(
        "transformations.frequency_time.stft.stft_real",
        Category::Transformation,
        Subtype::FrequencyTime,
        BTreeMap::new(),
    );
    primitive.set_outputs(vec![
        output("real_amplitude_values", "ndarray"),
        output("frequency_values", "ndarray"),
        output("time_values", "ndarray"),
    ]);
    primitive
}

// Aggregations

fn amplitude_aggregation(qualified_name: &str, output_name: &str) -> Primitive {
    let mut primitive = builtin(
        qualified_name,
        Category::Aggregation,
        Subtype::Amplitude,
        BTreeMap::new(),
    );
    primitive.set_outputs(vec![output(output_name, "float")]);
    primitive
}

/// Ratio of peak amplitude to RMS.
pub fn crest_factor() -> Primitive {
    amplitude_aggregation(
        "aggregations.amplitude.statistical.crest_factor",
        "crest_factor_value",
    )
}

/// Kurtosis, Fisher or Pearson, optionally bias-corrected.
pub fn kurtosis(fisher: bool, bias: bool) -> Primitive {
    let mut init_params = BTreeMap::new();
    init_params.insert("fisher".to_string(), Value::Bool(fisher));
    init_params.insert("bias".to_string(), Value::Bool(bias));

    let mut primitive = builtin(
        "aggregations.amplitude.statistical.kurtosis",
        Category::Aggregation,
        Subtype::Amplitude,
        init_params,
    );
    primitive.set_outputs(vec![output("kurtosis_value", "float")]);

    let mut fixed = BTreeMap::new();
    fixed.insert(
        "fisher".to_string(),
        hyperparam("bool", Some(Value::Bool(true))),
    );
    fixed.insert(
        "bias".to_string(),
        hyperparam("bool", Some(Value::Bool(true))),
    );
    primitive.set_fixed_hyperparameters(fixed);
    primitive
}

/// Arithmetic mean.
pub fn mean() -> Primitive {
    amplitude_aggregation("aggregations.amplitude.statistical.mean", "mean_value")
}

/// Root mean square.
pub fn rms() -> Primitive {
    amplitude_aggregation("aggregations.amplitude.statistical.rms", "rms_value")
}

/// Sample skewness.
pub fn skew() -> Primitive {
    amplitude_aggregation("aggregations.amplitude.statistical.skew", "skew_value")
}

/// Population standard deviation.
pub fn std() -> Primitive {
    amplitude_aggregation("aggregations.amplitude.statistical.std", "std_value")
}

/// Population variance.
pub fn var() -> Primitive {
    amplitude_aggregation("aggregations.amplitude.statistical.var", "var_value")
}

/// Mean amplitude inside a frequency band.
pub fn band_mean(min_frequency: f64, max_frequency: f64) -> Primitive {
    let mut init_params = BTreeMap::new();
    init_params.insert("min_frequency".to_string(), Value::Scalar(min_frequency));
    init_params.insert("max_frequency".to_string(), Value::Scalar(max_frequency));

    let mut primitive = builtin(
        "aggregations.frequency.band.band_mean",
        Category::Aggregation,
        Subtype::Frequency,
        init_params,
    );

    let mut fixed = BTreeMap::new();
    fixed.insert("min_frequency".to_string(), hyperparam("float", None));
    fixed.insert("max_frequency".to_string(), hyperparam("float", None));
    primitive.set_fixed_hyperparameters(fixed);
    primitive
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_tags() {
        assert_eq!(identity().tag(), "identity");
        assert_eq!(fft_real().tag(), "fft_real");
        assert_eq!(crest_factor().tag(), "crest_factor");
    }

    #[test]
    fn test_aggregation_output_renames() {
        assert_eq!(mean().outputs()[0].name, "mean_value");
        assert_eq!(kurtosis(true, true).outputs()[0].name, "kurtosis_value");
        // band_mean keeps the default aggregation output.
        assert_eq!(band_mean(0.0, 10.0).outputs()[0].name, "value");
    }

    #[test]
    fn test_kurtosis_init_params() {
        let primitive = kurtosis(false, true);
        assert_eq!(
            primitive.init_params().get("fisher"),
            Some(&Value::Bool(false))
        );
        assert_eq!(primitive.init_params().get("bias"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_frequency_band_declarations() {
        let primitive = frequency_band(20.0, 30.0);
        let names: Vec<&str> = primitive.inputs().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["amplitude_values", "frequency_values"]);
        assert!(primitive.fixed_hyperparameters().contains_key("low"));
        assert_eq!(
            primitive.init_params().get("high"),
            Some(&Value::Scalar(30.0))
        );
    }
}
