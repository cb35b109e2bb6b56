//! Graph Execution
//!
//! Walks a built graph's instance list in order, resolves each instance's
//! arguments out of a flat column namespace, calls the kernel and writes
//! its outputs back under the bound column names. The namespace is seeded
//! from the caller's context, which must at least carry the raw signal.

use std::collections::BTreeMap;

use pipeline_graph::Pipeline;
use signal_kernels::{Registry, Value};
use tracing::debug;

use crate::error::ExecError;

/// Executor over a kernel registry.
///
/// Stateless between runs; one executor can run any number of pipelines
/// whose kernels it knows.
#[derive(Debug, Clone)]
pub struct GraphExecutor {
    registry: Registry,
}

impl Default for GraphExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphExecutor {
    /// Executor over the built-in kernels.
    pub fn new() -> Self {
        Self {
            registry: Registry::with_builtins(),
        }
    }

    /// Executor over a custom registry, for user-contributed kernels.
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run the pipeline once over the given context.
    ///
    /// Returns the exposed features in the graph's creation order. The
    /// context must carry `amplitude_values` plus any context arguments
    /// and externally supplied inputs the graph expects.
    pub fn run(
        &self,
        pipeline: &Pipeline,
        context: &BTreeMap<String, Value>,
    ) -> Result<Vec<(String, Value)>, ExecError> {
        let graph = pipeline.graph();
        let mut namespace: BTreeMap<String, Value> = context.clone();

        for instance in &graph.instance_list {
            let qualified_name = instance.split('#').next().unwrap_or_default();
            let kernel =
                self.registry
                    .get(qualified_name)
                    .ok_or_else(|| ExecError::UnknownKernel {
                        name: qualified_name.to_string(),
                    })?;
            let descriptor = pipeline.primitive_for_instance(instance).ok_or_else(|| {
                ExecError::MissingDescriptor {
                    instance: instance.clone(),
                }
            })?;

            let mut args: BTreeMap<String, Value> = graph
                .init_params_by_instance
                .get(instance)
                .cloned()
                .unwrap_or_default();

            let bindings = graph.input_bindings_by_instance.get(instance);
            for input in descriptor.inputs() {
                let name = input.name.as_str();
                let source = bindings.and_then(|b| b.get(name));

                // Bound inputs read their column; a missing column falls
                // back to the bare argument name so values supplied by the
                // caller reach inner layers. Unbound inputs (context and
                // optional arguments) resolve by bare name only.
                let value = match source {
                    Some(column) => namespace.get(column).or_else(|| namespace.get(name)),
                    None => namespace.get(name),
                };

                match value {
                    Some(value) => {
                        args.insert(name.to_string(), value.clone());
                    }
                    None if input.required => {
                        return Err(ExecError::MissingArgument {
                            instance: instance.clone(),
                            argument: name.to_string(),
                            source_column: source.cloned().unwrap_or_else(|| name.to_string()),
                        });
                    }
                    None => {}
                }
            }

            let outputs = kernel.call(&args).map_err(|source| ExecError::Kernel {
                instance: instance.clone(),
                source,
            })?;
            if outputs.len() != descriptor.outputs().len() {
                return Err(ExecError::OutputArity {
                    instance: instance.clone(),
                    expected: descriptor.outputs().len(),
                    actual: outputs.len(),
                });
            }

            debug!(
                instance = instance.as_str(),
                outputs = outputs.len(),
                "executed graph instance"
            );

            match graph.output_bindings_by_instance.get(instance) {
                Some(columns) => {
                    for (declared, value) in descriptor.outputs().iter().zip(outputs) {
                        if let Some(column) = columns.get(&declared.name) {
                            namespace.insert(column.clone(), value);
                        }
                    }
                }
                // Terminal instance; fields land under the instance name.
                None => {
                    for (declared, value) in descriptor.outputs().iter().zip(outputs) {
                        namespace.insert(format!("{instance}.{}", declared.name), value);
                    }
                }
            }
        }

        let mut features = Vec::with_capacity(graph.final_outputs.len());
        for output in &graph.final_outputs {
            let value =
                namespace
                    .get(&output.variable)
                    .ok_or_else(|| ExecError::MissingArgument {
                        instance: output.variable.clone(),
                        argument: output.name.clone(),
                        source_column: output.variable.clone(),
                    })?;
            features.push((output.name.clone(), value.clone()));
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_graph::{build_layered, build_linear};
    use primitive_catalog::builtins;
    use signal_kernels::KernelError;

    fn context(signal: Vec<f64>, fs: f64) -> BTreeMap<String, Value> {
        let mut ctx = BTreeMap::new();
        ctx.insert("amplitude_values".to_string(), Value::Array(signal));
        ctx.insert("sampling_frequency".to_string(), Value::Scalar(fs));
        ctx
    }

    #[test]
    fn test_single_aggregation_chain() {
        let id1 = builtins::identity().set_tag("id1");
        let pipeline =
            build_linear(std::slice::from_ref(&id1), &[builtins::mean()]).unwrap();
        let executor = GraphExecutor::new();
        let features = executor
            .run(&pipeline, &context(vec![2.0, 4.0, 6.0], 100.0))
            .unwrap();
        assert_eq!(
            features,
            vec![("id1.mean.mean_value".to_string(), Value::Scalar(4.0))]
        );
    }

    #[test]
    fn test_shared_prefix_runs_once_per_instance() {
        let id1 = builtins::identity().set_tag("id1");
        let pipeline = build_linear(
            std::slice::from_ref(&id1),
            &[builtins::mean(), builtins::rms()],
        )
        .unwrap();
        let features = GraphExecutor::new()
            .run(&pipeline, &context(vec![3.0, 4.0], 100.0))
            .unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].0, "id1.mean.mean_value");
        assert_eq!(features[0].1, Value::Scalar(3.5));
        assert_eq!(features[1].0, "id1.rms.rms_value");
        let Value::Scalar(rms) = features[1].1 else {
            panic!("rms is scalar");
        };
        assert!((rms - (12.5f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_bare_name_fallback_for_inner_layers() {
        // identity produces no sampling frequency; fft_real one layer in
        // must fall back to the bare context value.
        let id1 = builtins::identity().set_tag("id1");
        let fftr = builtins::fft_real().set_tag("fftr");
        let pipeline = build_linear(&[id1, fftr], &[builtins::mean()]).unwrap();
        let signal: Vec<f64> = (0..64)
            .map(|i| (2.0 * std::f64::consts::PI * 5.0 * i as f64 / 64.0).sin())
            .collect();
        let features = GraphExecutor::new()
            .run(&pipeline, &context(signal, 64.0))
            .unwrap();
        assert_eq!(features[0].0, "id1.fftr.mean.mean_value");
        assert!(matches!(features[0].1, Value::Scalar(v) if v.is_finite()));
    }

    #[test]
    fn test_hyperparameters_reach_kernel() {
        let fftr = builtins::fft_real().set_tag("fftr");
        let pipeline = build_linear(
            std::slice::from_ref(&fftr),
            &[builtins::band_mean(0.0, 10.0)],
        )
        .unwrap();
        let signal: Vec<f64> = (0..32).map(|i| i as f64).collect();
        let features = GraphExecutor::new()
            .run(&pipeline, &context(signal, 32.0))
            .unwrap();
        assert_eq!(features[0].0, "fftr.band_mean.value");
        assert!(matches!(features[0].1, Value::Scalar(v) if v.is_finite()));
    }

    #[test]
    fn test_missing_raw_input() {
        let id1 = builtins::identity().set_tag("id1");
        let pipeline =
            build_linear(std::slice::from_ref(&id1), &[builtins::mean()]).unwrap();
        let err = GraphExecutor::new()
            .run(&pipeline, &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ExecError::MissingArgument { argument, .. } if argument == "amplitude_values"
        ));
    }

    #[test]
    fn test_missing_sampling_frequency() {
        let fftr = builtins::fft_real().set_tag("fftr");
        let pipeline =
            build_linear(std::slice::from_ref(&fftr), &[builtins::mean()]).unwrap();
        let mut ctx = BTreeMap::new();
        ctx.insert(
            "amplitude_values".to_string(),
            Value::Array(vec![1.0, 2.0, 3.0, 4.0]),
        );
        let err = GraphExecutor::new().run(&pipeline, &ctx).unwrap_err();
        assert!(matches!(
            err,
            ExecError::MissingArgument { argument, .. } if argument == "sampling_frequency"
        ));
    }

    #[test]
    fn test_kernel_failure_carries_instance() {
        // frequency_band with an empty band selection still succeeds, but a
        // type mismatch in the context surfaces as a kernel error.
        let id1 = builtins::identity().set_tag("id1");
        let pipeline =
            build_linear(std::slice::from_ref(&id1), &[builtins::mean()]).unwrap();
        let mut ctx = BTreeMap::new();
        ctx.insert("amplitude_values".to_string(), Value::Scalar(1.0));
        let err = GraphExecutor::new().run(&pipeline, &ctx).unwrap_err();
        assert!(matches!(
            err,
            ExecError::Kernel {
                source: KernelError::TypeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_custom_kernel_end_to_end() {
        use primitive_catalog::{Category, Primitive, Subtype};
        use signal_kernels::KernelArgs;

        fn double(args: &KernelArgs<'_>) -> Result<Vec<Value>, KernelError> {
            let values = args.array("amplitude_values")?;
            Ok(vec![Value::Array(values.iter().map(|v| v * 2.0).collect())])
        }

        let mut registry = Registry::with_builtins();
        registry.register(
            "transformations.amplitude.custom.double",
            &["amplitude_values"],
            double,
        );

        let doubler = Primitive::with_registry(
            &registry,
            "transformations.amplitude.custom.double",
            Category::Transformation,
            Subtype::Amplitude,
            BTreeMap::new(),
        )
        .unwrap();
        let pipeline = build_layered(
            &[doubler.clone(), builtins::mean()],
            &[vec![doubler, builtins::mean()]],
        )
        .unwrap();

        let features = GraphExecutor::with_registry(registry)
            .run(&pipeline, &context(vec![1.0, 2.0, 3.0], 100.0))
            .unwrap();
        assert_eq!(
            features,
            vec![("double.mean.mean_value".to_string(), Value::Scalar(4.0))]
        );
    }

    #[test]
    fn test_feature_order_matches_graph_order() {
        let fftr = builtins::fft_real().set_tag("fftr");
        let pipeline = build_linear(
            std::slice::from_ref(&fftr),
            &[builtins::std(), builtins::var(), builtins::skew()],
        )
        .unwrap();
        let signal: Vec<f64> = (0..16).map(|i| (i as f64).cos()).collect();
        let features = GraphExecutor::new()
            .run(&pipeline, &context(signal, 16.0))
            .unwrap();
        let names: Vec<&str> = features.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "fftr.std.std_value",
                "fftr.var.var_value",
                "fftr.skew.skew_value",
            ]
        );
    }
}
