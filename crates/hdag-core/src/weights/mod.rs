//! Weight operations: postorder aggregates over all trees in a DAG.
//!
//! A [`WeightOps`] describes one aggregate computed by the
//! [`SubtreeWeight`](crate::subtree_weight::SubtreeWeight) engine: what a
//! leaf and an edge contribute, how alternatives within one clade are
//! accumulated (and which alternatives are optimal), how independent child
//! clades combine, and how an edge's weight folds into the subtree below
//! it.
//!
//! Provided instantiations: [`ParsimonyScore`], [`TreeCount`], the
//! Robinson–Foulds family in [`rf_distance`], and the distribution-counting
//! [`WeightAccumulator`](accumulator::WeightAccumulator).

pub mod accumulator;
pub mod parsimony;
pub mod rf_distance;
pub mod tree_count;

pub use accumulator::{WeightAccumulator, WeightCounter};
pub use parsimony::ParsimonyScore;
pub use rf_distance::{MaxRfDistance, MaxSumRfDistance, RfDistance, RfError, SumRfDistance};
pub use tree_count::TreeCount;

use crate::madag::Madag;
use crate::newtypes::{EdgeId, NodeId};

/// A postorder weight aggregate.
///
/// The engine calls these hooks bottom-up: `compute_leaf` seeds leaves,
/// `above_node` folds `compute_edge`'s weight into each child subtree,
/// `within_clade_accum_optimum` reduces the alternatives of one clade
/// (reporting every optimal index), and `between_clades` combines the
/// node's independent clades.
pub trait WeightOps {
    /// The totally-orderable aggregate value.
    type Weight: Clone + std::fmt::Debug;

    /// The neutral element under [`WeightOps::between_clades`].
    fn identity(&self) -> Self::Weight;

    /// Weight contributed by the leaf `node`.
    fn compute_leaf(&self, dag: &Madag, node: NodeId) -> Self::Weight;

    /// Weight contributed by `edge`.
    fn compute_edge(&self, dag: &Madag, edge: EdgeId) -> Self::Weight;

    /// Reduces the alternative subtree weights below one clade.
    ///
    /// Returns the accumulated weight and the indices of every input
    /// attaining it; when optimality is undefined, all indices are
    /// returned.
    fn within_clade_accum_optimum(&self, weights: Vec<Self::Weight>)
    -> (Self::Weight, Vec<usize>);

    /// Combines the weights of a node's independent child clades.
    fn between_clades(&self, weights: Vec<Self::Weight>) -> Self::Weight;

    /// Folds an edge's weight into the weight of the subtree below it.
    ///
    /// The edge weight is always the first argument.
    fn above_node(&self, edge_weight: Self::Weight, child_weight: Self::Weight) -> Self::Weight;
}

/// Reduces `weights` to the optimum under `is_better`, reporting every
/// index attaining it.
///
/// Shared by the min- and max-flavored ops; ties extend the index list.
pub(crate) fn accum_optimum_by<W: PartialEq + Default>(
    weights: Vec<W>,
    mut is_better: impl FnMut(&W, &W) -> bool,
) -> (W, Vec<usize>) {
    let mut best: Option<W> = None;
    let mut optimal = Vec::new();
    for (i, weight) in weights.into_iter().enumerate() {
        let take = match &best {
            None => true,
            Some(current) => is_better(&weight, current),
        };
        if take {
            best = Some(weight);
            optimal.clear();
            optimal.push(i);
        } else if best.as_ref() == Some(&weight) {
            optimal.push(i);
        }
    }
    (best.unwrap_or_default(), optimal)
}
