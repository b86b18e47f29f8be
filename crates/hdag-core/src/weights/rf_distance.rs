//! Robinson–Foulds distances between a DAG's trees and a reference
//! ensemble.
//!
//! [`SumRfDistance`] precomputes, for every topologically distinct node of
//! a reference merge, how many reference trees pass through it
//! (`above_count * below_count`), grouped by the node's content key. An
//! edge of the subject DAG then weighs `T - 2 * trees_through(child)` when
//! the child's key appears in the reference (and `T`, the reference tree
//! count, otherwise). With min accumulation within clades and summation
//! across, `compute_weight_below(root) + shift_sum()` is the minimum, over
//! the subject's trees, of the summed RF distance to every reference tree.
//! The `Max*` variants flip the clade accumulation to maximize instead.
//!
//! Content keys are interner-independent: an internal node is keyed by its
//! nested leaf-set genome contents, a leaf by the singleton clade of its
//! own genome. Two merges over the same reference sequence therefore agree
//! on keys even though their interned ids differ.

use std::collections::HashMap;

use num_bigint::{BigInt, BigUint};
use num_traits::One;

use crate::intern::CgId;
use crate::madag::Madag;
use crate::merge::Merge;
use crate::newtypes::{Base, EdgeId, NodeId, SitePosition};
use crate::subtree_weight::{SubtreeWeight, WeightError};

use super::{TreeCount, WeightOps, accum_optimum_by};

/// One genome as its raw sorted mutation list.
type GenomeContent = Vec<(SitePosition, Base)>;

/// The content key of a node: nested clades of genome contents.
type RfKey = Vec<Vec<GenomeContent>>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when preparing RF distance ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RfError {
    /// The tree-constrained variants require a reference DAG that is a
    /// single tree.
    ReferenceNotATree,
    /// Counting trees in the reference failed.
    Weight(WeightError),
}

impl std::fmt::Display for RfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReferenceNotATree => f.write_str("reference DAG is not a single tree"),
            Self::Weight(e) => write!(f, "reference weight computation failed: {e}"),
        }
    }
}

impl std::error::Error for RfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Weight(e) => Some(e),
            Self::ReferenceNotATree => None,
        }
    }
}

impl From<WeightError> for RfError {
    fn from(e: WeightError) -> Self {
        Self::Weight(e)
    }
}

// ---------------------------------------------------------------------------
// Reference precomputation
// ---------------------------------------------------------------------------

/// The content key of one merged node.
fn node_key(merge: &Merge, node: NodeId) -> RfKey {
    let label = &merge.result_node_labels()[node.0];
    let leaf_set = merge.leaf_sets().get(label.leaf_set);
    let content = |id: CgId| merge.genomes().get(id).mutations().to_vec();
    if leaf_set.is_empty() {
        vec![vec![content(label.compact_genome)]]
    } else {
        leaf_set
            .clades()
            .iter()
            .map(|clade| clade.iter().map(|&id| content(id)).collect())
            .collect()
    }
}

/// Counts, per node of the reference result, the trees containing it
/// "from above": the root counts 1, and every other node sums, over its
/// parent edges, the parent's above-count times the tree counts of the
/// parent's other clades.
fn compute_above_counts(
    reference: &Madag,
    below: &[BigUint],
) -> Result<Vec<BigUint>, WeightError> {
    let root = reference.root().ok_or(WeightError::MissingUa)?;
    let mut above: Vec<Option<BigUint>> = vec![None; reference.node_count()];
    above[root.0] = Some(BigUint::one());
    enum Frame {
        Enter(NodeId),
        Exit(NodeId),
    }
    for start in reference.dag().node_ids() {
        let mut stack = vec![Frame::Enter(start)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    if above[node.0].is_some() {
                        continue;
                    }
                    stack.push(Frame::Exit(node));
                    for &edge in reference.dag().parents(node) {
                        let parent = reference.dag().edge(edge).parent;
                        if above[parent.0].is_none() {
                            stack.push(Frame::Enter(parent));
                        }
                    }
                }
                Frame::Exit(node) => {
                    if above[node.0].is_some() {
                        continue;
                    }
                    let mut total = BigUint::default();
                    for &edge in reference.dag().parents(node) {
                        let endpoints = reference.dag().edge(edge);
                        let mut below_parent = BigUint::one();
                        for (clade_idx, clade) in
                            reference.dag().clades(endpoints.parent).iter().enumerate()
                        {
                            if clade_idx == endpoints.clade.0 {
                                continue;
                            }
                            let clade_total: BigUint = clade
                                .iter()
                                .map(|&e| below[reference.dag().edge(e).child.0].clone())
                                .sum();
                            below_parent *= clade_total;
                        }
                        let parent_above =
                            above[endpoints.parent.0].clone().unwrap_or_default();
                        total += parent_above * below_parent;
                    }
                    above[node.0] = Some(total);
                }
            }
        }
    }
    Ok(above.into_iter().map(Option::unwrap_or_default).collect())
}

/// Shared state of the RF family: the reference's per-key tree-through
/// counts and the subject's per-node keys.
#[derive(Debug, Clone)]
struct RfTable {
    num_trees: BigInt,
    leafset_counts: HashMap<RfKey, BigInt>,
    shift_sum: BigInt,
    subject_keys: Vec<RfKey>,
}

impl RfTable {
    fn new(reference: &Merge, subject: &Merge) -> Result<Self, RfError> {
        let reference_dag = reference.result();
        let root = reference_dag.root().ok_or(WeightError::MissingUa)?;
        let mut counter = SubtreeWeight::new(reference_dag, TreeCount);
        let mut below = Vec::with_capacity(reference_dag.node_count());
        for node in reference_dag.dag().node_ids() {
            below.push(counter.compute_weight_below(node)?);
        }
        let above = compute_above_counts(reference_dag, &below)?;

        let mut leafset_counts: HashMap<RfKey, BigInt> = HashMap::new();
        for node in reference_dag.dag().node_ids() {
            if node == root {
                continue;
            }
            let through = BigInt::from(above[node.0].clone() * below[node.0].clone());
            *leafset_counts
                .entry(node_key(reference, node))
                .or_default() += through;
        }
        let shift_sum = leafset_counts.values().sum();
        let subject_keys = subject
            .result()
            .dag()
            .node_ids()
            .map(|n| node_key(subject, n))
            .collect();
        Ok(Self {
            num_trees: BigInt::from(below[root.0].clone()),
            leafset_counts,
            shift_sum,
            subject_keys,
        })
    }

    fn edge_weight(&self, dag: &Madag, edge: EdgeId) -> BigInt {
        let child = dag.dag().edge(edge).child;
        match self.leafset_counts.get(&self.subject_keys[child.0]) {
            Some(through) => self.num_trees.clone() - BigInt::from(2) * through,
            None => self.num_trees.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// SumRfDistance / RfDistance
// ---------------------------------------------------------------------------

/// Minimum, over the subject DAG's trees, of the summed RF distance to all
/// trees of a reference DAG.
///
/// Bind to a [`SubtreeWeight`] over the subject's result DAG; the summed
/// distance is `compute_weight_below(root) + shift_sum()`.
#[derive(Debug, Clone)]
pub struct SumRfDistance {
    table: RfTable,
}

impl SumRfDistance {
    /// Precomputes the distance table of `reference`, keyed for use over
    /// `subject`'s result DAG.
    pub fn new(reference: &Merge, subject: &Merge) -> Result<Self, RfError> {
        Ok(Self {
            table: RfTable::new(reference, subject)?,
        })
    }

    /// The additive shift `S`: the total trees-through count of the
    /// reference.
    pub fn shift_sum(&self) -> &BigInt {
        &self.table.shift_sum
    }
}

impl WeightOps for SumRfDistance {
    type Weight = BigInt;

    fn identity(&self) -> BigInt {
        BigInt::default()
    }

    fn compute_leaf(&self, _dag: &Madag, _node: NodeId) -> BigInt {
        BigInt::default()
    }

    fn compute_edge(&self, dag: &Madag, edge: EdgeId) -> BigInt {
        self.table.edge_weight(dag, edge)
    }

    fn within_clade_accum_optimum(&self, weights: Vec<BigInt>) -> (BigInt, Vec<usize>) {
        accum_optimum_by(weights, |a, b| a < b)
    }

    fn between_clades(&self, weights: Vec<BigInt>) -> BigInt {
        weights.into_iter().sum()
    }

    fn above_node(&self, edge_weight: BigInt, child_weight: BigInt) -> BigInt {
        edge_weight + child_weight
    }
}

/// [`SumRfDistance`] constrained to a reference that is a single tree:
/// the classical RF distance from each subject tree to that tree.
#[derive(Debug, Clone)]
pub struct RfDistance {
    inner: SumRfDistance,
}

impl RfDistance {
    /// Builds the table, rejecting a reference that represents more than
    /// one tree.
    pub fn new(reference: &Merge, subject: &Merge) -> Result<Self, RfError> {
        if !reference.result().is_tree() {
            return Err(RfError::ReferenceNotATree);
        }
        Ok(Self {
            inner: SumRfDistance::new(reference, subject)?,
        })
    }

    /// The additive shift `S`; for a reference tree this is its non-root
    /// node count.
    pub fn shift_sum(&self) -> &BigInt {
        self.inner.shift_sum()
    }
}

impl WeightOps for RfDistance {
    type Weight = BigInt;

    fn identity(&self) -> BigInt {
        self.inner.identity()
    }

    fn compute_leaf(&self, dag: &Madag, node: NodeId) -> BigInt {
        self.inner.compute_leaf(dag, node)
    }

    fn compute_edge(&self, dag: &Madag, edge: EdgeId) -> BigInt {
        self.inner.compute_edge(dag, edge)
    }

    fn within_clade_accum_optimum(&self, weights: Vec<BigInt>) -> (BigInt, Vec<usize>) {
        self.inner.within_clade_accum_optimum(weights)
    }

    fn between_clades(&self, weights: Vec<BigInt>) -> BigInt {
        self.inner.between_clades(weights)
    }

    fn above_node(&self, edge_weight: BigInt, child_weight: BigInt) -> BigInt {
        self.inner.above_node(edge_weight, child_weight)
    }
}

// ---------------------------------------------------------------------------
// Max variants
// ---------------------------------------------------------------------------

/// Maximum, over the subject DAG's trees, of the summed RF distance to all
/// trees of the reference: the worst case instead of the best.
#[derive(Debug, Clone)]
pub struct MaxSumRfDistance {
    inner: SumRfDistance,
}

impl MaxSumRfDistance {
    /// Precomputes the distance table of `reference`, keyed for `subject`.
    pub fn new(reference: &Merge, subject: &Merge) -> Result<Self, RfError> {
        Ok(Self {
            inner: SumRfDistance::new(reference, subject)?,
        })
    }

    /// The additive shift `S`.
    pub fn shift_sum(&self) -> &BigInt {
        self.inner.shift_sum()
    }
}

impl WeightOps for MaxSumRfDistance {
    type Weight = BigInt;

    fn identity(&self) -> BigInt {
        self.inner.identity()
    }

    fn compute_leaf(&self, dag: &Madag, node: NodeId) -> BigInt {
        self.inner.compute_leaf(dag, node)
    }

    fn compute_edge(&self, dag: &Madag, edge: EdgeId) -> BigInt {
        self.inner.compute_edge(dag, edge)
    }

    fn within_clade_accum_optimum(&self, weights: Vec<BigInt>) -> (BigInt, Vec<usize>) {
        accum_optimum_by(weights, |a, b| a > b)
    }

    fn between_clades(&self, weights: Vec<BigInt>) -> BigInt {
        self.inner.between_clades(weights)
    }

    fn above_node(&self, edge_weight: BigInt, child_weight: BigInt) -> BigInt {
        self.inner.above_node(edge_weight, child_weight)
    }
}

/// [`MaxSumRfDistance`] constrained to a single-tree reference.
#[derive(Debug, Clone)]
pub struct MaxRfDistance {
    inner: MaxSumRfDistance,
}

impl MaxRfDistance {
    /// Builds the table, rejecting a reference that represents more than
    /// one tree.
    pub fn new(reference: &Merge, subject: &Merge) -> Result<Self, RfError> {
        if !reference.result().is_tree() {
            return Err(RfError::ReferenceNotATree);
        }
        Ok(Self {
            inner: MaxSumRfDistance::new(reference, subject)?,
        })
    }

    /// The additive shift `S`.
    pub fn shift_sum(&self) -> &BigInt {
        self.inner.shift_sum()
    }
}

impl WeightOps for MaxRfDistance {
    type Weight = BigInt;

    fn identity(&self) -> BigInt {
        self.inner.identity()
    }

    fn compute_leaf(&self, dag: &Madag, node: NodeId) -> BigInt {
        self.inner.compute_leaf(dag, node)
    }

    fn compute_edge(&self, dag: &Madag, edge: EdgeId) -> BigInt {
        self.inner.compute_edge(dag, edge)
    }

    fn within_clade_accum_optimum(&self, weights: Vec<BigInt>) -> (BigInt, Vec<usize>) {
        self.inner.within_clade_accum_optimum(weights)
    }

    fn between_clades(&self, weights: Vec<BigInt>) -> BigInt {
        self.inner.between_clades(weights)
    }

    fn above_node(&self, edge_weight: BigInt, child_weight: BigInt) -> BigInt {
        self.inner.above_node(edge_weight, child_weight)
    }
}
