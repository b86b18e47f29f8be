//! Weight distributions: counting how many trees attain each weight.
//!
//! [`WeightCounter`] is a multiset of weights with arbitrary-precision
//! counts; [`WeightAccumulator`] wraps any [`WeightOps`] so that the
//! subtree-weight engine computes, instead of a single optimum, the full
//! distribution of the wrapped weight across all trees in the DAG.
//!
//! The wrapped ops must satisfy two conditions: accumulating a single
//! weight within a clade must return that weight, and `between_clades`
//! must decompose into a commutative binary operation (it is applied
//! pairwise over the Cartesian product of counters).

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigUint;
use num_traits::One;

use crate::madag::Madag;
use crate::newtypes::{EdgeId, NodeId};

use super::WeightOps;

// ---------------------------------------------------------------------------
// WeightCounter
// ---------------------------------------------------------------------------

/// A multiset of weights: each distinct weight with the number of trees
/// attaining it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeightCounter<W: Ord> {
    weights: BTreeMap<W, BigUint>,
}

impl<W: Ord + Clone> WeightCounter<W> {
    /// The empty multiset.
    pub fn new() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    /// A multiset holding each of `weights` once.
    pub fn from_weights(weights: impl IntoIterator<Item = W>) -> Self {
        let mut counter = Self::new();
        for weight in weights {
            counter.insert(weight, BigUint::one());
        }
        counter
    }

    /// Adds `count` occurrences of `weight`.
    pub fn insert(&mut self, weight: W, count: BigUint) {
        *self.weights.entry(weight).or_default() += count;
    }

    /// The counts per distinct weight, in ascending weight order.
    pub fn counts(&self) -> &BTreeMap<W, BigUint> {
        &self.weights
    }

    /// Total number of occurrences across all weights.
    pub fn total(&self) -> BigUint {
        self.weights.values().sum()
    }

    /// Returns `true` when the multiset is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Multiset union: counts of equal weights add.
    pub fn union(&self, rhs: &Self) -> Self {
        let mut result = self.clone();
        for (weight, count) in rhs.weights.iter() {
            result.insert(weight.clone(), count.clone());
        }
        result
    }

    /// Cartesian product: combines every pair of weights with `combine`,
    /// multiplying their counts.
    pub fn product_with(&self, rhs: &Self, mut combine: impl FnMut(&W, &W) -> W) -> Self {
        let mut result = Self::new();
        for (left, left_count) in self.weights.iter() {
            for (right, right_count) in rhs.weights.iter() {
                result.insert(combine(left, right), left_count * right_count);
            }
        }
        result
    }
}

impl<W: Ord + fmt::Display> fmt::Display for WeightCounter<W> {
    /// Formats as `{weight: count, ...}` in ascending weight order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        for (weight, count) in &self.weights {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{weight}: {count}")?;
            first = false;
        }
        f.write_str("}")
    }
}

// ---------------------------------------------------------------------------
// WeightAccumulator
// ---------------------------------------------------------------------------

/// Wraps a [`WeightOps`] so the engine computes the full distribution of
/// its weight over all trees.
///
/// Within a clade every alternative is kept (union of counters, all
/// indices optimal); across clades counters combine by Cartesian product
/// under the wrapped `between_clades`; and edge weights map over the child
/// counter through the wrapped `above_node`.
#[derive(Debug, Clone, Default)]
pub struct WeightAccumulator<Ops> {
    inner: Ops,
}

impl<Ops> WeightAccumulator<Ops> {
    /// Wraps `inner`.
    pub fn new(inner: Ops) -> Self {
        Self { inner }
    }

    /// The wrapped ops.
    pub fn inner(&self) -> &Ops {
        &self.inner
    }
}

impl<Ops> WeightOps for WeightAccumulator<Ops>
where
    Ops: WeightOps,
    Ops::Weight: Ord,
{
    type Weight = WeightCounter<Ops::Weight>;

    fn identity(&self) -> Self::Weight {
        WeightCounter::from_weights([self.inner.identity()])
    }

    fn compute_leaf(&self, dag: &Madag, node: NodeId) -> Self::Weight {
        WeightCounter::from_weights([self.inner.compute_leaf(dag, node)])
    }

    fn compute_edge(&self, dag: &Madag, edge: EdgeId) -> Self::Weight {
        WeightCounter::from_weights([self.inner.compute_edge(dag, edge)])
    }

    fn within_clade_accum_optimum(
        &self,
        weights: Vec<Self::Weight>,
    ) -> (Self::Weight, Vec<usize>) {
        let indices = (0..weights.len()).collect();
        let union = weights
            .iter()
            .fold(WeightCounter::new(), |acc, counter| acc.union(counter));
        (union, indices)
    }

    fn between_clades(&self, weights: Vec<Self::Weight>) -> Self::Weight {
        let mut iter = weights.into_iter();
        let Some(first) = iter.next() else {
            return self.identity();
        };
        iter.fold(first, |acc, counter| {
            acc.product_with(&counter, |a, b| {
                self.inner.between_clades(vec![a.clone(), b.clone()])
            })
        })
    }

    fn above_node(&self, edge_weight: Self::Weight, child_weight: Self::Weight) -> Self::Weight {
        debug_assert_eq!(edge_weight.counts().len(), 1);
        let mut result = WeightCounter::new();
        for (edge, _) in edge_weight.counts() {
            for (child, count) in child_weight.counts() {
                result.insert(
                    self.inner.above_node(edge.clone(), child.clone()),
                    count.clone(),
                );
            }
        }
        result
    }
}
