//! Graph Builder
//!
//! Layered prefix-sharing construction: chains are walked layer by layer,
//! identical prefixes are materialized once, each instance's inputs are
//! resolved to upstream outputs or the raw input, and the result is a flat
//! instruction list plus bindings a generic executor can run.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use signal_kernels::Value;
use tracing::{debug, warn};

use crate::error::BuildError;
use crate::validate::Chain;

/// Sentinel source naming the raw input signal.
pub const RAW_INPUT: &str = "amplitude_values";

/// One exposed output feature of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalOutput {
    /// Exposed feature name: the chain's dotted tag path plus the field.
    pub name: String,
    /// Producing variable: `instance_name.field`.
    pub variable: String,
}

/// The built execution graph. Rebuilt in full on every build; immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphArtifact {
    /// Instance names in creation order; producers precede consumers.
    pub instance_list: Vec<String>,
    /// Hyperparameter bindings per instance.
    pub init_params_by_instance: BTreeMap<String, BTreeMap<String, Value>>,
    /// Resolved data-flow sources per instance, keyed by formal argument.
    pub input_bindings_by_instance: BTreeMap<String, BTreeMap<String, String>>,
    /// Column names of non-terminal outputs per instance.
    pub output_bindings_by_instance: BTreeMap<String, BTreeMap<String, String>>,
    /// Exposed features of chain-terminal instances, in creation order.
    pub final_outputs: Vec<FinalOutput>,
    /// Descriptor tag behind each instance.
    pub tag_by_instance: BTreeMap<String, String>,
}

fn tag_path(chain: &Chain, length: usize) -> String {
    chain[..length]
        .iter()
        .map(|primitive| primitive.tag())
        .collect::<Vec<_>>()
        .join(".")
}

/// Build the execution graph for an already-validated chain set.
///
/// Deterministic: identical chain sets yield identical artifacts, order
/// included. Instances appear in the order they are first required, which
/// is topologically valid because every prefix of length `l` is created
/// after all of its own shorter prefixes.
pub fn build_graph(chains: &[Chain]) -> Result<GraphArtifact, BuildError> {
    let num_layers = chains.iter().map(Vec::len).max().unwrap_or(0);

    let mut prefixes: HashSet<Vec<&str>> = HashSet::new();
    let mut counter: HashMap<&str, u32> = HashMap::new();
    let mut artifact = GraphArtifact::default();

    for layer in 1..=num_layers {
        for chain in chains {
            if layer > chain.len() {
                continue;
            }
            let terminal = layer == chain.len();
            let prefix: Vec<&str> = chain[..layer].iter().map(|p| p.tag()).collect();

            if prefixes.contains(&prefix) {
                if terminal {
                    // No chain may be a strict prefix of another; the
                    // validator guarantees it, so reaching this is an
                    // internal consistency failure.
                    return Err(BuildError::PrefixConflict {
                        path: prefix.join("."),
                    });
                }
                continue;
            }
            prefixes.insert(prefix.clone());

            let primitive = &chain[layer - 1];
            let count = counter.entry(primitive.qualified_name()).or_insert(0);
            *count += 1;
            let instance = format!("{}#{}", primitive.qualified_name(), count);

            debug!(
                instance = instance.as_str(),
                layer,
                path = prefix.join(".").as_str(),
                "materializing graph instance"
            );

            artifact.instance_list.push(instance.clone());
            artifact
                .init_params_by_instance
                .insert(instance.clone(), primitive.init_params().clone());
            artifact
                .tag_by_instance
                .insert(instance.clone(), primitive.tag().to_string());

            // Input resolution, declared order. Context arguments and
            // optional inputs stay unbound; the executor resolves them
            // from the caller context by name.
            let mut inputs: BTreeMap<String, String> = BTreeMap::new();
            for input in primitive.inputs() {
                let name = input.name.as_str();
                if name == RAW_INPUT || input.is_context || !input.required {
                    continue;
                }

                if layer == 1 {
                    // Leaf layer: the caller supplies the value directly.
                    inputs.insert(name.to_string(), name.to_string());
                    continue;
                }

                // Nearest predecessor whose declared outputs carry this
                // field, scanning backwards through the prefix.
                let producer = (0..layer - 1)
                    .rev()
                    .find(|&j| chain[j].outputs().iter().any(|out| out.name == name));

                match producer {
                    Some(j) => {
                        let column = format!("{}.{}.{}", tag_path(chain, j + 1), j + 1, name);
                        inputs.insert(name.to_string(), column);
                    }
                    None => {
                        // No ancestor produces it; assume the caller will.
                        let column = format!("{}.{}", prefix.join("."), name);
                        warn!(
                            instance = instance.as_str(),
                            argument = name,
                            "no predecessor produces required input, \
                             expecting it to be supplied externally"
                        );
                        inputs.insert(name.to_string(), column);
                    }
                }
            }

            if primitive.inputs().iter().any(|input| input.name == RAW_INPUT) {
                let source = if layer == 1 {
                    RAW_INPUT.to_string()
                } else {
                    format!("{}.{}.{}", tag_path(chain, layer - 1), layer - 1, RAW_INPUT)
                };
                inputs.insert(RAW_INPUT.to_string(), source);
            }
            artifact
                .input_bindings_by_instance
                .insert(instance.clone(), inputs);

            // Output naming: non-terminal layers carry a numeric depth
            // disambiguator, terminal layers expose the bare tag path.
            if !terminal {
                let column_base = format!("{}.{}", prefix.join("."), layer);
                let outputs: BTreeMap<String, String> = primitive
                    .outputs()
                    .iter()
                    .map(|out| (out.name.clone(), format!("{column_base}.{}", out.name)))
                    .collect();
                artifact
                    .output_bindings_by_instance
                    .insert(instance.clone(), outputs);
            } else {
                let path = prefix.join(".");
                for out in primitive.outputs() {
                    artifact.final_outputs.push(FinalOutput {
                        name: format!("{path}.{}", out.name),
                        variable: format!("{instance}.{}", out.name),
                    });
                }
            }
        }
    }

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use primitive_catalog::{builtins, Primitive};
    use proptest::prelude::*;

    fn graph(primitives: &[Primitive], chains: &[Chain]) -> GraphArtifact {
        let chains = validate(primitives, chains).unwrap();
        build_graph(&chains).unwrap()
    }

    #[test]
    fn test_single_chain_wiring() {
        let id1 = builtins::identity().set_tag("id1");
        let fftr = builtins::fft_real().set_tag("fftr");
        let mean = builtins::mean();
        let primitives = vec![id1.clone(), fftr.clone(), mean.clone()];
        let artifact = graph(&primitives, &[vec![id1, fftr, mean]]);

        assert_eq!(
            artifact.instance_list,
            vec![
                "transformations.amplitude.identity.identity#1",
                "transformations.frequency.fft.fft_real#1",
                "aggregations.amplitude.statistical.mean#1",
            ]
        );

        let identity_inputs =
            &artifact.input_bindings_by_instance["transformations.amplitude.identity.identity#1"];
        assert_eq!(identity_inputs["amplitude_values"], "amplitude_values");

        let fft_inputs =
            &artifact.input_bindings_by_instance["transformations.frequency.fft.fft_real#1"];
        assert_eq!(fft_inputs["amplitude_values"], "id1.1.amplitude_values");
        // identity does not produce a sampling frequency; expected from
        // the caller.
        assert_eq!(fft_inputs["sampling_frequency"], "id1.fftr.sampling_frequency");

        let mean_inputs =
            &artifact.input_bindings_by_instance["aggregations.amplitude.statistical.mean#1"];
        assert_eq!(mean_inputs["amplitude_values"], "id1.fftr.2.amplitude_values");

        assert_eq!(
            artifact.final_outputs,
            vec![FinalOutput {
                name: "id1.fftr.mean.mean_value".to_string(),
                variable: "aggregations.amplitude.statistical.mean#1.mean_value".to_string(),
            }]
        );
    }

    #[test]
    fn test_prefix_deduplication() {
        let fftr = builtins::fft_real().set_tag("fftr");
        let id1 = builtins::identity().set_tag("id1");
        let mean = builtins::mean();
        let kurtosis = builtins::kurtosis(true, true);
        let primitives = vec![fftr.clone(), id1.clone(), mean.clone(), kurtosis.clone()];
        let chains = vec![
            vec![fftr.clone(), id1.clone(), mean],
            vec![fftr, id1, kurtosis],
        ];
        let artifact = graph(&primitives, &chains);

        // One shared instance per shared prefix element, two aggregations.
        assert_eq!(artifact.instance_list.len(), 4);
        let fft_instances = artifact
            .instance_list
            .iter()
            .filter(|name| name.starts_with("transformations.frequency.fft.fft_real#"))
            .count();
        assert_eq!(fft_instances, 1);

        let names: Vec<&str> = artifact
            .final_outputs
            .iter()
            .map(|out| out.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["fftr.id1.mean.mean_value", "fftr.id1.kurtosis.kurtosis_value"]
        );
    }

    #[test]
    fn test_repeated_qualified_name_numbering() {
        // Same kernel under two tags: occurrence counter keeps increasing.
        let b1 = builtins::frequency_band(10.0, 20.0).set_tag("band_low");
        let b2 = builtins::frequency_band(20.0, 30.0).set_tag("band_high");
        let fftr = builtins::fft_real().set_tag("fftr");
        let mean = builtins::mean();
        let primitives = vec![fftr.clone(), b1.clone(), b2.clone(), mean.clone()];
        let chains = vec![
            vec![fftr.clone(), b1, mean.clone()],
            vec![fftr, b2, mean],
        ];
        let artifact = graph(&primitives, &chains);

        let band_instances: Vec<&str> = artifact
            .instance_list
            .iter()
            .filter(|name| name.contains("frequency_band"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            band_instances,
            vec![
                "transformations.frequency.band.frequency_band#1",
                "transformations.frequency.band.frequency_band#2",
            ]
        );
        // And the two mean instances are numbered globally as well.
        assert!(artifact
            .instance_list
            .contains(&"aggregations.amplitude.statistical.mean#2".to_string()));
    }

    #[test]
    fn test_ancestor_search_binds_nearest_producer() {
        let fftr = builtins::fft_real().set_tag("fftr");
        let band = builtins::band_mean(20.0, 30.0);
        let primitives = vec![fftr.clone(), band.clone()];
        let artifact = graph(&primitives, &[vec![fftr, band]]);

        let band_inputs =
            &artifact.input_bindings_by_instance["aggregations.frequency.band.band_mean#1"];
        // fft_real produces frequency_values one layer up.
        assert_eq!(band_inputs["frequency_values"], "fftr.1.frequency_values");
        assert_eq!(band_inputs["amplitude_values"], "fftr.1.amplitude_values");
    }

    #[test]
    fn test_no_dangling_sources() {
        let id1 = builtins::identity().set_tag("id1");
        let fftr = builtins::fft_real().set_tag("fftr");
        let band = builtins::frequency_band(10.0, 100.0).set_tag("band");
        let mean = builtins::mean();
        let band_mean = builtins::band_mean(20.0, 30.0);
        let primitives = vec![
            id1.clone(),
            fftr.clone(),
            band.clone(),
            mean.clone(),
            band_mean.clone(),
        ];
        let chains = vec![
            vec![id1.clone(), fftr.clone(), band.clone(), mean],
            vec![id1, fftr, band_mean],
        ];
        let artifact = graph(&primitives, &chains);

        let known_columns: HashSet<&str> = artifact
            .output_bindings_by_instance
            .values()
            .flat_map(|outputs| outputs.values())
            .map(String::as_str)
            .collect();
        for (instance, inputs) in &artifact.input_bindings_by_instance {
            for source in inputs.values() {
                let resolvable = source == RAW_INPUT
                    || !source.contains('.')
                    || known_columns.contains(source.as_str())
                    || source.ends_with(".sampling_frequency");
                assert!(resolvable, "dangling source {source} for {instance}");
            }
        }
    }

    #[test]
    fn test_artifact_serialization_round_trip() {
        let fftr = builtins::fft_real().set_tag("fftr");
        let mean = builtins::mean();
        let primitives = vec![fftr.clone(), mean.clone()];
        let artifact = graph(&primitives, &[vec![fftr, mean]]);

        let json = serde_json::to_string(&artifact).unwrap();
        let restored: GraphArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, artifact);
    }

    #[test]
    fn test_prefix_conflict_detected() {
        // Bypass the validator deliberately: one chain is a strict prefix
        // of the other.
        let fftr = builtins::fft_real().set_tag("fftr");
        let mean = builtins::mean();
        let kurtosis = builtins::kurtosis(true, true);
        let chains = vec![
            vec![fftr.clone(), mean.clone(), kurtosis],
            vec![fftr, mean],
        ];
        assert!(matches!(
            build_graph(&chains),
            Err(BuildError::PrefixConflict { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_build_is_deterministic(selector in proptest::collection::vec(
            (proptest::collection::vec(0usize..4, 0..4), 0usize..3),
            1..8,
        )) {
            let transformations = [
                builtins::identity().set_tag("t0"),
                builtins::fft_real().set_tag("t1"),
                builtins::fft_freq().set_tag("t2"),
                builtins::power_spectrum().set_tag("t3"),
            ];
            let aggregations = [
                builtins::mean().set_tag("a0"),
                builtins::rms().set_tag("a1"),
                builtins::std().set_tag("a2"),
            ];

            let chains: Vec<Chain> = selector
                .iter()
                .map(|(prefix, agg)| {
                    let mut chain: Chain =
                        prefix.iter().map(|&i| transformations[i].clone()).collect();
                    chain.push(aggregations[*agg].clone());
                    chain
                })
                .collect();

            // Skip selector draws where one chain prefixes or duplicates
            // another.
            let tag_seqs: Vec<Vec<&str>> = chains
                .iter()
                .map(|c| c.iter().map(|p| p.tag()).collect())
                .collect();
            let conflict = tag_seqs.iter().enumerate().any(|(i, a)| {
                tag_seqs.iter().enumerate().any(|(j, b)| {
                    i != j && a.len() <= b.len() && b[..a.len()] == a[..]
                })
            });
            prop_assume!(!conflict);

            let first = build_graph(&chains).unwrap();
            let second = build_graph(&chains).unwrap();
            prop_assert_eq!(&first, &second);

            // Instance count equals the number of distinct prefixes.
            let mut distinct: HashSet<Vec<&str>> = HashSet::new();
            for seq in &tag_seqs {
                for l in 1..=seq.len() {
                    distinct.insert(seq[..l].to_vec());
                }
            }
            prop_assert_eq!(first.instance_list.len(), distinct.len());
        }
    }
}
