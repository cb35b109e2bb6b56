//! Chain Validation
//!
//! Structural legality checks performed before any graph construction:
//! distinct tags, non-empty chain set, transformation-then-aggregation
//! shape and membership of every chain element in the declared set.

use std::collections::HashMap;

use primitive_catalog::{Category, Primitive};

use crate::error::BuildError;

/// One requested output feature: zero or more transformations followed by
/// exactly one aggregation.
pub type Chain = Vec<Primitive>;

/// Validate a requested chain set against the declared primitives.
///
/// Pure function; returns the normalized chains on success.
pub fn validate(primitives: &[Primitive], chains: &[Chain]) -> Result<Vec<Chain>, BuildError> {
    let mut by_tag: HashMap<&str, &Primitive> = HashMap::new();
    for primitive in primitives {
        if by_tag.insert(primitive.tag(), primitive).is_some() {
            return Err(BuildError::DuplicateTag {
                tag: primitive.tag().to_string(),
            });
        }
    }

    for primitive in primitives {
        primitive.validate_signature()?;
    }

    if chains.iter().all(|chain| chain.is_empty()) {
        return Err(BuildError::EmptyChainSet);
    }

    for (chain_index, chain) in chains.iter().enumerate() {
        if chain.is_empty() {
            return Err(BuildError::EmptyChainSet);
        }

        for (position, primitive) in chain[..chain.len() - 1].iter().enumerate() {
            if primitive.category() != Category::Transformation {
                return Err(BuildError::NotATransformation {
                    chain: chain_index,
                    position,
                    tag: primitive.tag().to_string(),
                });
            }
        }

        let last = &chain[chain.len() - 1];
        if last.category() != Category::Aggregation {
            return Err(BuildError::NoTerminalAggregation {
                chain: chain_index,
                tag: last.tag().to_string(),
            });
        }

        for primitive in chain {
            if by_tag.get(primitive.tag()) != Some(&primitive) {
                return Err(BuildError::UnknownPrimitive {
                    tag: primitive.tag().to_string(),
                });
            }
        }
    }

    Ok(chains.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_catalog::builtins;

    #[test]
    fn test_accepts_transformation_chain() {
        let id1 = builtins::identity().set_tag("id1");
        let fftr = builtins::fft_real().set_tag("fftr");
        let mean = builtins::mean();
        let primitives = vec![id1.clone(), fftr.clone(), mean.clone()];
        let chains = vec![vec![id1, fftr, mean]];
        assert!(validate(&primitives, &chains).is_ok());
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let a = builtins::identity().set_tag("id1");
        let b = builtins::fft_real().set_tag("id1");
        let mean = builtins::mean();
        let err = validate(&[a.clone(), b, mean.clone()], &[vec![a, mean]]).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateTag { tag } if tag == "id1"));
    }

    #[test]
    fn test_empty_chain_set_rejected() {
        let mean = builtins::mean();
        assert!(matches!(
            validate(&[mean.clone()], &[]),
            Err(BuildError::EmptyChainSet)
        ));
        assert!(matches!(
            validate(&[mean], &[vec![]]),
            Err(BuildError::EmptyChainSet)
        ));
    }

    #[test]
    fn test_aggregation_not_last_rejected() {
        let id1 = builtins::identity().set_tag("id1");
        let mean = builtins::mean();
        let primitives = vec![id1.clone(), mean.clone()];
        let err = validate(&primitives, &[vec![mean, id1]]).unwrap_err();
        assert!(matches!(
            err,
            BuildError::NotATransformation { chain: 0, position: 0, .. }
        ));
    }

    #[test]
    fn test_missing_terminal_aggregation_rejected() {
        let id1 = builtins::identity().set_tag("id1");
        let fftr = builtins::fft_real().set_tag("fftr");
        let primitives = vec![id1.clone(), fftr.clone()];
        let err = validate(&primitives, &[vec![id1, fftr]]).unwrap_err();
        assert!(matches!(err, BuildError::NoTerminalAggregation { chain: 0, .. }));
    }

    #[test]
    fn test_unknown_primitive_rejected() {
        let id1 = builtins::identity().set_tag("id1");
        let mean = builtins::mean();
        let err = validate(&[id1.clone()], &[vec![id1, mean]]).unwrap_err();
        assert!(matches!(err, BuildError::UnknownPrimitive { tag } if tag == "mean"));
    }

    #[test]
    fn test_same_tag_different_descriptor_rejected() {
        // The chain references a descriptor whose tag is declared but whose
        // definition differs from the declared one.
        let declared = builtins::kurtosis(true, true);
        let other = builtins::kurtosis(false, false);
        let err = validate(&[declared], &[vec![other]]).unwrap_err();
        assert!(matches!(err, BuildError::UnknownPrimitive { .. }));
    }
}
