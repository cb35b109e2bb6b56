//! Kernel Registry
//!
//! Maps dotted qualified names to kernel functions. Each entry also records
//! the kernel's formal parameter list, which stands in for runtime
//! reflection when descriptor declarations are validated against the
//! underlying function.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::aggregations;
use crate::error::KernelError;
use crate::transformations;
use crate::value::{KernelArgs, Value};

/// Signature shared by every kernel function.
pub type KernelFn = fn(&KernelArgs<'_>) -> Result<Vec<Value>, KernelError>;

/// One registered computation unit.
#[derive(Clone)]
pub struct Kernel {
    name: String,
    params: Vec<String>,
    func: KernelFn,
}

impl Kernel {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal parameter names the kernel accepts.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn call(&self, args: &BTreeMap<String, Value>) -> Result<Vec<Value>, KernelError> {
        (self.func)(&KernelArgs::new(args))
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Registry of kernels available to a pipeline.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    kernels: HashMap<String, Kernel>,
}

impl Registry {
    /// Empty registry, for fully custom primitive sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in kernels.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(
            "transformations.amplitude.identity.identity",
            &["amplitude_values"],
            transformations::identity,
        );
        registry.register(
            "transformations.amplitude.spectrum.power_spectrum",
            &["amplitude_values", "sampling_frequency"],
            transformations::power_spectrum,
        );
        registry.register(
            "transformations.frequency.fft.fft",
            &["amplitude_values", "sampling_frequency"],
            transformations::fft,
        );
        registry.register(
            "transformations.frequency.fft.fft_real",
            &["amplitude_values", "sampling_frequency"],
            transformations::fft_real,
        );
        registry.register(
            "transformations.frequency.fftfreq.fft_freq",
            &["amplitude_values", "sampling_frequency"],
            transformations::fft_freq,
        );
        registry.register(
            "transformations.frequency.band.frequency_band",
            &["amplitude_values", "frequency_values", "low", "high"],
            transformations::frequency_band,
        );
        registry.register(
            "transformations.frequency_time.stft.stft",
            &["amplitude_values", "sampling_frequency"],
            transformations::stft,
        );
        registry.register(
            "transformations.frequency_time.stft.stft_real",
            &["amplitude_values", "sampling_frequency"],
            transformations::stft_real,
        );

        registry.register(
            "aggregations.amplitude.statistical.mean",
            &["amplitude_values"],
            aggregations::mean,
        );
        registry.register(
            "aggregations.amplitude.statistical.std",
            &["amplitude_values"],
            aggregations::std,
        );
        registry.register(
            "aggregations.amplitude.statistical.var",
            &["amplitude_values"],
            aggregations::var,
        );
        registry.register(
            "aggregations.amplitude.statistical.rms",
            &["amplitude_values"],
            aggregations::rms,
        );
        registry.register(
            "aggregations.amplitude.statistical.crest_factor",
            &["amplitude_values"],
            aggregations::crest_factor,
        );
        registry.register(
            "aggregations.amplitude.statistical.skew",
            &["amplitude_values"],
            aggregations::skew,
        );
        registry.register(
            "aggregations.amplitude.statistical.kurtosis",
            &["amplitude_values", "fisher", "bias"],
            aggregations::kurtosis,
        );
        registry.register(
            "aggregations.frequency.band.band_mean",
            &[
                "amplitude_values",
                "frequency_values",
                "min_frequency",
                "max_frequency",
            ],
            aggregations::band_mean,
        );

        registry
    }

    /// Register a kernel, replacing any previous entry with the same name.
    pub fn register(&mut self, name: impl Into<String>, params: &[&str], func: KernelFn) {
        let name = name.into();
        self.kernels.insert(
            name.clone(),
            Kernel {
                name,
                params: params.iter().map(|p| p.to_string()).collect(),
                func,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Kernel> {
        self.kernels.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kernels.contains_key(name)
    }

    /// Sorted names of every registered kernel.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kernels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Shared registry of the built-in kernels.
pub fn builtins() -> &'static Registry {
    static BUILTINS: OnceLock<Registry> = OnceLock::new();
    BUILTINS.get_or_init(Registry::with_builtins)
}
