//! The subtree-weight engine: memoized postorder aggregates, trimming and
//! sampling.
//!
//! A [`SubtreeWeight`] binds a MADAG to one [`WeightOps`] instance and
//! caches, per node, the aggregate weight of the best (or accumulated)
//! subtree below it, plus the per-clade lists of edges attaining the clade
//! optimum. The engine owns its ops, so a cache can never be consulted
//! with operations other than the ones that populated it.
//!
//! Phylogenetic trees reach depths in the hundreds to thousands, so every
//! traversal here uses an explicit work stack instead of recursion.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dag::ConnectError;
use crate::madag::{Madag, MadagError};
use crate::newtypes::{EdgeId, NodeId};
use crate::weights::{TreeCount, WeightOps};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by weight computation and tree extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightError {
    /// The DAG has no root to compute below or sample from.
    MissingUa,
    /// A non-leaf node offers an empty clade; no tree can be extracted
    /// through it.
    DegenerateDag {
        /// The offending node.
        node: NodeId,
    },
    /// A cycle was reached during the postorder walk.
    Cycle {
        /// A node on the cycle.
        node: NodeId,
    },
    /// A structural defect in the DAG.
    Connect(ConnectError),
    /// Assembling the extracted MADAG failed.
    Madag(MadagError),
}

impl std::fmt::Display for WeightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUa => f.write_str("DAG has no universal-ancestor root"),
            Self::DegenerateDag { node } => {
                write!(f, "node {node} has an empty clade")
            }
            Self::Cycle { node } => write!(f, "cycle detected through node {node}"),
            Self::Connect(e) => write!(f, "connection error: {e}"),
            Self::Madag(e) => write!(f, "extraction error: {e}"),
        }
    }
}

impl std::error::Error for WeightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) => Some(e),
            Self::Madag(e) => Some(e),
            Self::MissingUa | Self::DegenerateDag { .. } | Self::Cycle { .. } => None,
        }
    }
}

impl From<ConnectError> for WeightError {
    fn from(e: ConnectError) -> Self {
        Self::Connect(e)
    }
}

impl From<MadagError> for WeightError {
    fn from(e: MadagError) -> Self {
        Self::Madag(e)
    }
}

// ---------------------------------------------------------------------------
// SubtreeWeight
// ---------------------------------------------------------------------------

enum Frame {
    Enter(NodeId),
    Exit(NodeId),
}

/// Memoized postorder weight computation over one MADAG.
///
/// Caches are populated lazily by [`SubtreeWeight::compute_weight_below`]
/// and shared by the trim and sample operations. Sampling uses the
/// engine's RNG: nondeterministic by default, reproducible via
/// [`SubtreeWeight::with_seed`].
pub struct SubtreeWeight<'a, Ops: WeightOps> {
    dag: &'a Madag,
    ops: Ops,
    cached_weights: Vec<Option<Ops::Weight>>,
    // Outer index: node id; middle: clade index; inner: the edges attaining
    // the clade optimum.
    cached_min_edges: Vec<Vec<Vec<EdgeId>>>,
    cached_subtree_counts: Vec<Option<BigUint>>,
    rng: StdRng,
}

impl<'a, Ops: WeightOps> SubtreeWeight<'a, Ops> {
    /// Creates an engine over `dag` with a nondeterministically seeded RNG.
    pub fn new(dag: &'a Madag, ops: Ops) -> Self {
        Self::with_rng(dag, ops, StdRng::from_entropy())
    }

    /// Creates an engine whose sampling is reproducible from `seed`.
    pub fn with_seed(dag: &'a Madag, ops: Ops, seed: u64) -> Self {
        Self::with_rng(dag, ops, StdRng::seed_from_u64(seed))
    }

    fn with_rng(dag: &'a Madag, ops: Ops, rng: StdRng) -> Self {
        Self {
            dag,
            ops,
            cached_weights: vec![None; dag.node_count()],
            cached_min_edges: vec![Vec::new(); dag.node_count()],
            cached_subtree_counts: vec![None; dag.node_count()],
            rng,
        }
    }

    /// The MADAG this engine computes over.
    pub fn dag(&self) -> &'a Madag {
        self.dag
    }

    /// The weight ops bound to this engine.
    pub fn ops(&self) -> &Ops {
        &self.ops
    }

    /// Computes the aggregate weight over all subtrees below `node`.
    ///
    /// Runs a memoized explicit-stack postorder: leaves seed with
    /// `compute_leaf`, each clade reduces its alternatives with
    /// `within_clade_accum_optimum` (recording the optimal edges), and
    /// clades combine with `between_clades`.
    ///
    /// # Errors
    ///
    /// [`WeightError::DegenerateDag`] on an empty clade,
    /// [`WeightError::Cycle`] if the walk re-enters a node still being
    /// expanded.
    pub fn compute_weight_below(&mut self, node: NodeId) -> Result<Ops::Weight, WeightError> {
        let mut expanded = vec![false; self.dag.node_count()];
        let mut stack = vec![Frame::Enter(node)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(n) => {
                    if self.cached_weights[n.0].is_some() {
                        continue;
                    }
                    if self.dag.dag().is_leaf(n) {
                        self.cached_weights[n.0] = Some(self.ops.compute_leaf(self.dag, n));
                        continue;
                    }
                    if expanded[n.0] {
                        return Err(WeightError::Cycle { node: n });
                    }
                    expanded[n.0] = true;
                    stack.push(Frame::Exit(n));
                    for edge in self.dag.dag().children(n) {
                        let child = self.dag.dag().edge(edge).child;
                        if self.cached_weights[child.0].is_none() {
                            stack.push(Frame::Enter(child));
                        }
                    }
                }
                Frame::Exit(n) => {
                    if self.cached_weights[n.0].is_some() {
                        continue;
                    }
                    let weight = self.node_weight(n)?;
                    self.cached_weights[n.0] = Some(weight);
                }
            }
        }
        self.cached_weights[node.0]
            .clone()
            .ok_or(WeightError::Cycle { node })
    }

    /// Combines the (already cached) children of `n` into its weight and
    /// records the optimal edges per clade.
    fn node_weight(&mut self, n: NodeId) -> Result<Ops::Weight, WeightError> {
        let clade_count = self.dag.dag().clade_count(n);
        let mut clade_weights = Vec::with_capacity(clade_count);
        let mut min_edges = Vec::with_capacity(clade_count);
        for clade in self.dag.dag().clades(n) {
            if clade.is_empty() {
                return Err(WeightError::DegenerateDag { node: n });
            }
            let mut edge_weights = Vec::with_capacity(clade.len());
            for &edge in clade {
                let child = self.dag.dag().edge(edge).child;
                let child_weight = self.cached_weights[child.0]
                    .clone()
                    .ok_or(WeightError::Cycle { node: child })?;
                edge_weights
                    .push(self.ops.above_node(self.ops.compute_edge(self.dag, edge), child_weight));
            }
            let (weight, optimal) = self.ops.within_clade_accum_optimum(edge_weights);
            min_edges.push(optimal.into_iter().map(|i| clade[i]).collect::<Vec<_>>());
            clade_weights.push(weight);
        }
        self.cached_min_edges[n.0] = min_edges;
        Ok(self.ops.between_clades(clade_weights))
    }

    /// Counts the minimum-weight subtrees below `node` (the trees the
    /// optimal-edge sets admit).
    pub fn min_weight_count(&mut self, node: NodeId) -> Result<BigUint, WeightError> {
        self.compute_weight_below(node)?;
        let mut stack = vec![Frame::Enter(node)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(n) => {
                    if self.cached_subtree_counts[n.0].is_some() {
                        continue;
                    }
                    if self.dag.dag().is_leaf(n) {
                        self.cached_subtree_counts[n.0] = Some(BigUint::one());
                        continue;
                    }
                    stack.push(Frame::Exit(n));
                    for clade in &self.cached_min_edges[n.0] {
                        for &edge in clade {
                            let child = self.dag.dag().edge(edge).child;
                            if self.cached_subtree_counts[child.0].is_none() {
                                stack.push(Frame::Enter(child));
                            }
                        }
                    }
                }
                Frame::Exit(n) => {
                    if self.cached_subtree_counts[n.0].is_some() {
                        continue;
                    }
                    let mut node_count = BigUint::one();
                    for clade in &self.cached_min_edges[n.0] {
                        let mut clade_count = BigUint::zero();
                        for &edge in clade {
                            let child = self.dag.dag().edge(edge).child;
                            clade_count += self.cached_subtree_counts[child.0]
                                .clone()
                                .unwrap_or_default();
                        }
                        node_count *= clade_count;
                    }
                    self.cached_subtree_counts[n.0] = Some(node_count);
                }
            }
        }
        Ok(self.cached_subtree_counts[node.0].clone().unwrap_or_default())
    }

    // =======================================================================
    // Trim and sampling
    // =======================================================================

    /// Builds a new MADAG containing only minimum-weight trees, picking the
    /// first optimal edge in every clade.
    pub fn trim_to_min_weight(&mut self) -> Result<Madag, WeightError> {
        let root = self.dag.root().ok_or(WeightError::MissingUa)?;
        self.compute_weight_below(root)?;
        let min_edges = &self.cached_min_edges;
        let (result, _) = extract_tree(self.dag, |node, clade_idx, _clade| {
            Ok(min_edges[node.0][clade_idx][0])
        })?;
        Ok(result)
    }

    /// Samples one tree, choosing uniformly among each clade's edges.
    ///
    /// Returns the sampled MADAG and the map from its node ids to source
    /// node ids.
    pub fn sample_tree(&mut self) -> Result<(Madag, Vec<NodeId>), WeightError> {
        let _ = self.dag.root().ok_or(WeightError::MissingUa)?;
        let rng = &mut self.rng;
        extract_tree(self.dag, |_node, _clade_idx, clade| {
            Ok(clade[rng.gen_range(0..clade.len())])
        })
    }

    /// Samples one minimum-weight tree, choosing uniformly among each
    /// clade's optimal edges.
    pub fn min_weight_sample_tree(&mut self) -> Result<(Madag, Vec<NodeId>), WeightError> {
        let root = self.dag.root().ok_or(WeightError::MissingUa)?;
        self.compute_weight_below(root)?;
        let min_edges = &self.cached_min_edges;
        let rng = &mut self.rng;
        extract_tree(self.dag, |node, clade_idx, _clade| {
            let optimal = &min_edges[node.0][clade_idx];
            Ok(optimal[rng.gen_range(0..optimal.len())])
        })
    }

    /// Samples one minimum-weight tree with probability proportional to the
    /// number of minimum-weight subtrees below each optimal edge, i.e.
    /// uniformly over the minimum-weight trees themselves.
    pub fn min_weight_uniform_sample_tree(
        &mut self,
    ) -> Result<(Madag, Vec<NodeId>), WeightError> {
        let root = self.dag.root().ok_or(WeightError::MissingUa)?;
        self.min_weight_count(root)?;
        let dag = self.dag;
        let min_edges = &self.cached_min_edges;
        let counts = &self.cached_subtree_counts;
        let rng = &mut self.rng;
        extract_tree(dag, |node, clade_idx, clade| {
            let optimal = &min_edges[node.0][clade_idx];
            let weights: Vec<BigUint> = clade
                .iter()
                .map(|edge| {
                    if optimal.contains(edge) {
                        let child = dag.dag().edge(*edge).child;
                        counts[child.0].clone().unwrap_or_default()
                    } else {
                        BigUint::zero()
                    }
                })
                .collect();
            pick_weighted(rng, &weights, node).map(|i| clade[i])
        })
    }
}

impl<'a> SubtreeWeight<'a, TreeCount> {
    /// Samples one tree uniformly over all trees the DAG represents: an
    /// edge's probability is proportional to the tree count below its
    /// child.
    pub fn uniform_sample_tree(&mut self) -> Result<(Madag, Vec<NodeId>), WeightError> {
        let root = self.dag.root().ok_or(WeightError::MissingUa)?;
        self.compute_weight_below(root)?;
        let dag = self.dag;
        let weights_cache = &self.cached_weights;
        let rng = &mut self.rng;
        extract_tree(dag, |node, _clade_idx, clade| {
            let weights: Vec<BigUint> = clade
                .iter()
                .map(|&edge| {
                    let child = dag.dag().edge(edge).child;
                    weights_cache[child.0].clone().unwrap_or_default()
                })
                .collect();
            pick_weighted(rng, &weights, node).map(|i| clade[i])
        })
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Builds a fresh MADAG by walking down from the source root, taking the
/// edge `select` picks in each clade.
///
/// The result carries the source's compact genomes and edge mutations
/// (when present) and propagates leaf sample ids. Returns the result and
/// the map from result node ids to source node ids.
fn extract_tree<F>(source: &Madag, mut select: F) -> Result<(Madag, Vec<NodeId>), WeightError>
where
    F: FnMut(NodeId, usize, &[EdgeId]) -> Result<EdgeId, WeightError>,
{
    let root = source.root().ok_or(WeightError::MissingUa)?;
    let carry_genomes = source.have_compact_genomes();
    let carry_mutations = source.have_edge_mutations();
    let mut result = Madag::new(source.reference_sequence().clone());
    let mut source_ids: Vec<NodeId> = Vec::new();

    let result_root = result.append_node();
    if carry_genomes {
        result.push_compact_genome(source.compact_genome(root).cloned().unwrap_or_default());
    }
    source_ids.push(root);

    let mut stack = vec![(root, result_root)];
    while let Some((src, res)) = stack.pop() {
        for (clade_idx, clade) in source.dag().clades(src).iter().enumerate() {
            if clade.is_empty() {
                return Err(WeightError::DegenerateDag { node: src });
            }
            let edge = select(src, clade_idx, clade)?;
            let endpoints = source.dag().edge(edge);
            let child_res = result.append_node();
            if carry_genomes {
                result.push_compact_genome(
                    source
                        .compact_genome(endpoints.child)
                        .cloned()
                        .unwrap_or_default(),
                );
            }
            source_ids.push(endpoints.child);
            result.append_edge(res, child_res, endpoints.clade);
            if carry_mutations {
                result.push_edge_mutations(
                    source.edge_mutation(edge).cloned().unwrap_or_default(),
                );
            }
            stack.push((endpoints.child, child_res));
        }
    }
    result.build_connections()?;
    let leafs: Vec<NodeId> = result.leafs().to_vec();
    for leaf in leafs {
        if let Some(sample_id) = source.sample_id(source_ids[leaf.0]) {
            result.set_sample_id(leaf, Some(sample_id.clone()));
        }
    }
    Ok((result, source_ids))
}

/// Samples an index with probability proportional to `weights`.
///
/// Arbitrary-precision weights are reduced to parts-per-million of their
/// total before feeding the weighted distribution, which keeps the
/// conversion exact enough for sampling while avoiding `f64` overflow.
fn pick_weighted(
    rng: &mut StdRng,
    weights: &[BigUint],
    node: NodeId,
) -> Result<usize, WeightError> {
    let total: BigUint = weights.iter().sum();
    if total.is_zero() {
        return Err(WeightError::DegenerateDag { node });
    }
    let scaled: Vec<f64> = weights
        .iter()
        .map(|w| ((w * 1_000_000u32) / &total).to_f64().unwrap_or(0.0))
        .collect();
    let distribution =
        WeightedIndex::new(&scaled).map_err(|_| WeightError::DegenerateDag { node })?;
    Ok(distribution.sample(rng))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use num_bigint::BigUint;

    use super::*;
    use crate::test_helpers::{fan_dag, graded_dag, reference, sample_tree};
    use crate::weights::ParsimonyScore;

    /// A DAG whose root clades offer 2 and 3 alternatives represents
    /// 2 x 3 = 6 trees (S5).
    #[test]
    fn test_tree_count_product_of_sums() {
        let dag = fan_dag();
        let root = dag.root().expect("has root");
        let mut engine = SubtreeWeight::new(&dag, TreeCount);
        assert_eq!(
            engine.compute_weight_below(root).expect("counts"),
            BigUint::from(6u32)
        );
    }

    /// A single tree counts as exactly one tree.
    #[test]
    fn test_tree_count_single_tree() {
        let dag = sample_tree();
        let root = dag.root().expect("has root");
        let mut engine = SubtreeWeight::new(&dag, TreeCount);
        assert_eq!(
            engine.compute_weight_below(root).expect("counts"),
            BigUint::from(1u32)
        );
    }

    /// The graded DAG's minimum parsimony score is 4, and the number of
    /// minimum-weight trees is 1.
    #[test]
    fn test_parsimony_minimum_and_count() {
        let dag = graded_dag();
        let root = dag.root().expect("has root");
        let mut engine = SubtreeWeight::new(&dag, ParsimonyScore);
        assert_eq!(engine.compute_weight_below(root).expect("scores"), 4);
        assert_eq!(
            engine.min_weight_count(root).expect("counts"),
            BigUint::from(1u32)
        );
    }

    /// Trimming to minimum parsimony leaves a DAG representing exactly the
    /// minimum-score tree (S4).
    #[test]
    fn test_trim_to_min_weight() {
        let dag = graded_dag();
        let mut engine = SubtreeWeight::new(&dag, ParsimonyScore);
        let trimmed = engine.trim_to_min_weight().expect("trims");

        let trimmed_root = trimmed.root().expect("has root");
        let mut count = SubtreeWeight::new(&trimmed, TreeCount);
        assert_eq!(
            count.compute_weight_below(trimmed_root).expect("counts"),
            BigUint::from(1u32)
        );
        let mut score = SubtreeWeight::new(&trimmed, ParsimonyScore);
        assert_eq!(score.compute_weight_below(trimmed_root).expect("scores"), 4);
    }

    /// A sampled tree is a tree, spans the source leaves, and keeps their
    /// sample ids (invariant 7).
    #[test]
    fn test_sample_tree_membership() {
        let dag = fan_dag();
        let mut engine = SubtreeWeight::with_seed(&dag, TreeCount, 7);
        let (sampled, source_ids) = engine.sample_tree().expect("samples");
        assert!(sampled.is_tree());
        assert_eq!(sampled.node_count(), sampled.edge_count() + 1);
        assert_eq!(sampled.leafs().len(), dag.leafs().len());
        assert_eq!(source_ids.len(), sampled.node_count());
        for &leaf in sampled.leafs() {
            let source_leaf = source_ids[leaf.0];
            assert_eq!(sampled.sample_id(leaf), dag.sample_id(source_leaf));
            assert_eq!(
                sampled.compact_genome(leaf),
                dag.compact_genome(source_leaf)
            );
        }
    }

    /// Equal seeds sample equal trees; the default constructor still
    /// produces valid trees.
    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let dag = fan_dag();
        let (first, first_ids) = SubtreeWeight::with_seed(&dag, TreeCount, 42)
            .sample_tree()
            .expect("samples");
        let (second, second_ids) = SubtreeWeight::with_seed(&dag, TreeCount, 42)
            .sample_tree()
            .expect("samples");
        assert_eq!(first_ids, second_ids);
        assert_eq!(first.edge_mutations(), second.edge_mutations());
    }

    /// Every tree sampled under the minimum-weight strategies attains the
    /// minimum score.
    #[test]
    fn test_min_weight_sampling_attains_minimum() {
        let dag = graded_dag();
        let mut engine = SubtreeWeight::with_seed(&dag, ParsimonyScore, 3);
        for _ in 0..10 {
            let (sampled, _) = engine.min_weight_sample_tree().expect("samples");
            let root = sampled.root().expect("has root");
            let mut score = SubtreeWeight::new(&sampled, ParsimonyScore);
            assert_eq!(score.compute_weight_below(root).expect("scores"), 4);
        }
        let mut uniform = SubtreeWeight::with_seed(&dag, ParsimonyScore, 4);
        let (sampled, _) = uniform
            .min_weight_uniform_sample_tree()
            .expect("samples");
        let root = sampled.root().expect("has root");
        let mut score = SubtreeWeight::new(&sampled, ParsimonyScore);
        assert_eq!(score.compute_weight_below(root).expect("scores"), 4);
    }

    /// Under tree-count ops every tree is optimal, so the minimum-weight
    /// count equals the tree count.
    #[test]
    fn test_min_weight_count_under_tree_count() {
        let dag = fan_dag();
        let root = dag.root().expect("has root");
        let mut engine = SubtreeWeight::new(&dag, TreeCount);
        assert_eq!(
            engine.min_weight_count(root).expect("counts"),
            BigUint::from(6u32)
        );
    }

    /// Sampling a DAG without built connections reports the missing root.
    #[test]
    fn test_sampling_requires_root() {
        let dag = Madag::new(reference("AAA"));
        let mut engine = SubtreeWeight::new(&dag, TreeCount);
        assert!(matches!(
            engine.sample_tree(),
            Err(WeightError::MissingUa)
        ));
    }
}
