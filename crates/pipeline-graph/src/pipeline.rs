//! Pipeline Assembly
//!
//! High-level constructors over the graph builder: the linear layout
//! (one transformation spine, many aggregations), the tree layout
//! (cartesian product of transformation layers), explicit layered chain
//! sets given as descriptors or tags, and pipeline merging.

use primitive_catalog::Primitive;
use tracing::debug;

use crate::builder::{build_graph, FinalOutput, GraphArtifact};
use crate::error::BuildError;
use crate::validate::{validate, Chain};

/// A validated chain set together with its built execution graph.
#[derive(Debug, Clone)]
pub struct Pipeline {
    primitives: Vec<Primitive>,
    chains: Vec<Chain>,
    artifact: GraphArtifact,
}

impl Pipeline {
    /// The declared primitive set, tags distinct.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// The requested output feature chains.
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// The built execution graph.
    pub fn graph(&self) -> &GraphArtifact {
        &self.artifact
    }

    /// Exposed feature outputs, creation order.
    pub fn final_outputs(&self) -> &[FinalOutput] {
        &self.artifact.final_outputs
    }

    /// Names of the exposed output features.
    pub fn feature_names(&self) -> Vec<&str> {
        self.artifact
            .final_outputs
            .iter()
            .map(|out| out.name.as_str())
            .collect()
    }

    /// Look up a declared descriptor by tag.
    pub fn primitive_by_tag(&self, tag: &str) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.tag() == tag)
    }

    /// The descriptor behind a graph instance.
    pub fn primitive_for_instance(&self, instance: &str) -> Option<&Primitive> {
        let tag = self.artifact.tag_by_instance.get(instance)?;
        self.primitive_by_tag(tag)
    }
}

/// Build a pipeline from an explicit chain set.
pub fn build_layered(
    primitives: &[Primitive],
    chains: &[Chain],
) -> Result<Pipeline, BuildError> {
    let chains = validate(primitives, chains)?;
    let artifact = build_graph(&chains)?;
    debug!(
        instances = artifact.instance_list.len(),
        features = artifact.final_outputs.len(),
        "pipeline graph built"
    );
    Ok(Pipeline {
        primitives: primitives.to_vec(),
        chains,
        artifact,
    })
}

/// Build a pipeline from chains given as tag sequences, resolved against
/// the declared primitive set.
pub fn build_layered_tags<S: AsRef<str>>(
    primitives: &[Primitive],
    tag_chains: &[Vec<S>],
) -> Result<Pipeline, BuildError> {
    let mut chains: Vec<Chain> = Vec::with_capacity(tag_chains.len());
    for tags in tag_chains {
        let mut chain: Chain = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.as_ref();
            let primitive = primitives
                .iter()
                .find(|p| p.tag() == tag)
                .ok_or_else(|| BuildError::UnknownPrimitive {
                    tag: tag.to_string(),
                })?;
            chain.push(primitive.clone());
        }
        chains.push(chain);
    }
    build_layered(primitives, &chains)
}

/// Build the linear layout: every aggregation is applied to the output of
/// the same transformation spine.
pub fn build_linear(
    transformations: &[Primitive],
    aggregations: &[Primitive],
) -> Result<Pipeline, BuildError> {
    let chains: Vec<Chain> = aggregations
        .iter()
        .map(|agg| {
            let mut chain = transformations.to_vec();
            chain.push(agg.clone());
            chain
        })
        .collect();

    let mut primitives = transformations.to_vec();
    primitives.extend(aggregations.iter().cloned());
    build_layered(&primitives, &chains)
}

/// Build the tree layout: one chain per element of the cartesian product
/// of the transformation layers, terminated by each aggregation in turn.
pub fn build_tree(
    transformation_layers: &[Vec<Primitive>],
    aggregations: &[Primitive],
) -> Result<Pipeline, BuildError> {
    let mut spines: Vec<Vec<Primitive>> = vec![Vec::new()];
    for layer in transformation_layers {
        let mut next = Vec::with_capacity(spines.len() * layer.len());
        for spine in &spines {
            for primitive in layer {
                let mut extended = spine.clone();
                extended.push(primitive.clone());
                next.push(extended);
            }
        }
        spines = next;
    }

    let chains: Vec<Chain> = spines
        .iter()
        .flat_map(|spine| {
            aggregations.iter().map(|agg| {
                let mut chain = spine.clone();
                chain.push(agg.clone());
                chain
            })
        })
        .collect();

    let mut primitives: Vec<Primitive> = Vec::new();
    for layer in transformation_layers {
        for primitive in layer {
            if !primitives.iter().any(|p| p.tag() == primitive.tag()) {
                primitives.push(primitive.clone());
            }
        }
    }
    for agg in aggregations {
        if !primitives.iter().any(|p| p.tag() == agg.tag()) {
            primitives.push(agg.clone());
        }
    }
    build_layered(&primitives, &chains)
}

/// Merge pipelines into one.
///
/// When several pipelines declare a descriptor under the same tag, the
/// earliest declaration wins and later chains are re-pointed at it.
/// Chains with identical tag sequences are kept once, first occurrence.
pub fn merge(pipelines: &[Pipeline]) -> Result<Pipeline, BuildError> {
    let mut primitives: Vec<Primitive> = Vec::new();
    for pipeline in pipelines {
        for primitive in pipeline.primitives() {
            if !primitives.iter().any(|p| p.tag() == primitive.tag()) {
                primitives.push(primitive.clone());
            }
        }
    }

    let mut chains: Vec<Chain> = Vec::new();
    let mut seen: Vec<Vec<String>> = Vec::new();
    for pipeline in pipelines {
        for chain in pipeline.chains() {
            let tags: Vec<String> =
                chain.iter().map(|p| p.tag().to_string()).collect();
            if seen.contains(&tags) {
                continue;
            }
            seen.push(tags.clone());
            let mut repointed: Chain = Vec::with_capacity(chain.len());
            for tag in &tags {
                // Every tag is present: primitives is a superset of each
                // pipeline's declared set.
                if let Some(primitive) = primitives.iter().find(|p| p.tag() == tag.as_str()) {
                    repointed.push(primitive.clone());
                }
            }
            chains.push(repointed);
        }
    }

    build_layered(&primitives, &chains)
}
