//! Tree counting: how many distinct trees a DAG represents.

use num_bigint::BigUint;
use num_traits::One;

use crate::madag::Madag;
use crate::newtypes::{EdgeId, NodeId};

use super::WeightOps;

/// Tree-count weight ops.
///
/// A leaf counts 1 tree; alternatives within a clade sum (every choice is
/// a different tree) and independent clades multiply. The weight below the
/// root is the number of distinct trees the DAG represents, as an
/// arbitrary-precision integer — tree counts grow multiplicatively and
/// overflow fixed-width integers quickly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeCount;

impl WeightOps for TreeCount {
    type Weight = BigUint;

    fn identity(&self) -> BigUint {
        BigUint::one()
    }

    fn compute_leaf(&self, _dag: &Madag, _node: NodeId) -> BigUint {
        BigUint::one()
    }

    fn compute_edge(&self, _dag: &Madag, _edge: EdgeId) -> BigUint {
        // Irrelevant: above_node ignores the edge weight.
        BigUint::one()
    }

    fn within_clade_accum_optimum(&self, weights: Vec<BigUint>) -> (BigUint, Vec<usize>) {
        let indices = (0..weights.len()).collect();
        (weights.into_iter().sum(), indices)
    }

    fn between_clades(&self, weights: Vec<BigUint>) -> BigUint {
        weights.into_iter().fold(BigUint::one(), |acc, w| acc * w)
    }

    fn above_node(&self, _edge_weight: BigUint, child_weight: BigUint) -> BigUint {
        child_weight
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn big(v: u32) -> BigUint {
        BigUint::from(v)
    }

    /// Alternatives sum and all indices stay optimal.
    #[test]
    fn test_within_clade_sums_all_indices() {
        let ops = TreeCount;
        let (w, idx) = ops.within_clade_accum_optimum(vec![big(2), big(3)]);
        assert_eq!(w, big(5));
        assert_eq!(idx, vec![0, 1]);
    }

    /// Independent clades multiply; the edge weight passes through.
    #[test]
    fn test_between_clades_multiplies() {
        let ops = TreeCount;
        assert_eq!(ops.between_clades(vec![big(2), big(3)]), big(6));
        assert_eq!(ops.between_clades(vec![]), big(1));
        assert_eq!(ops.above_node(big(7), big(4)), big(4));
    }
}
