//! The merge engine: unify many MADAGs into one history DAG.
//!
//! Merging deduplicates nodes by their [`NodeLabel`] (compact genome, leaf
//! set, sample id) and edges by their [`EdgeLabel`] (the pair of endpoint
//! labels). The result DAG's node set is exactly the union of distinct node
//! labels across inputs, and its edge set the union of distinct edge
//! labels.
//!
//! [`Merge::add_dags`] runs the batch algorithm with rayon-parallel phases:
//!
//! 1. per input, intern every node's compact genome;
//! 2. per input, compute and intern every node's leaf set;
//! 3. serially assign result node ids to unseen labels;
//! 4. per input, deduplicate edge labels through a concurrent map, then
//!    serially append the fresh edges with clade indices recovered from the
//!    parent's leaf set.
//!
//! [`Merge::add_dag`] is the serial incremental form, optionally attaching
//! the new DAG below an existing result node.

use std::collections::{BTreeMap, HashMap};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rayon::prelude::*;

use crate::compact_genome::{CompactGenome, CompactGenomeError};
use crate::dag::ConnectError;
use crate::edge_mutations::EdgeMutations;
use crate::intern::{CgId, GenomeInterner, LeafSetId, LeafSetInterner};
use crate::labels::{EdgeLabel, NodeLabel};
use crate::leaf_set::{LeafSet, compute_leaf_sets};
use crate::madag::{Madag, MadagError};
use crate::newtypes::{EdgeId, NodeId, ReferenceSequence};

/// Sentinel stored while an edge label is claimed but its result edge not
/// yet appended.
const PENDING_EDGE: EdgeId = EdgeId(usize::MAX);

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by the merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// An input DAG has no universal-ancestor root.
    MissingUa {
        /// Index of the offending input in the batch.
        input: usize,
    },
    /// An input DAG's reference sequence differs from the merge's.
    ReferenceMismatch {
        /// Index of the offending input in the batch.
        input: usize,
    },
    /// A child's parent-clade could not be located in its parent's leaf
    /// set, so the edge's clade index is undefined.
    CladeIndexNotFound {
        /// The edge's parent in the result DAG.
        parent: NodeId,
        /// The edge's child in the result DAG.
        child: NodeId,
    },
    /// A structural defect in the result DAG.
    Connect(ConnectError),
    /// An input annotation computation failed.
    Madag(MadagError),
    /// A compact-genome diff failed.
    Genome(CompactGenomeError),
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUa { input } => {
                write!(f, "input DAG {input} has no universal-ancestor root")
            }
            Self::ReferenceMismatch { input } => {
                write!(f, "input DAG {input} has a different reference sequence")
            }
            Self::CladeIndexNotFound { parent, child } => write!(
                f,
                "no clade of result node {parent} matches the leaf set of child {child}"
            ),
            Self::Connect(e) => write!(f, "result DAG is malformed: {e}"),
            Self::Madag(e) => write!(f, "input annotation error: {e}"),
            Self::Genome(e) => write!(f, "compact genome error: {e}"),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) => Some(e),
            Self::Madag(e) => Some(e),
            Self::Genome(e) => Some(e),
            Self::MissingUa { .. }
            | Self::ReferenceMismatch { .. }
            | Self::CladeIndexNotFound { .. } => None,
        }
    }
}

impl From<ConnectError> for MergeError {
    fn from(e: ConnectError) -> Self {
        Self::Connect(e)
    }
}

impl From<MadagError> for MergeError {
    fn from(e: MadagError) -> Self {
        Self::Madag(e)
    }
}

impl From<CompactGenomeError> for MergeError {
    fn from(e: CompactGenomeError) -> Self {
        Self::Genome(e)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// An in-progress merge of MADAGs sharing one reference sequence.
///
/// Interned genomes and leaf sets live as long as the merge; result node
/// ids are assigned in first-observation order and never renumbered.
#[derive(Debug)]
pub struct Merge {
    reference_sequence: ReferenceSequence,
    genomes: GenomeInterner,
    leaf_sets: LeafSetInterner,
    result_nodes: HashMap<NodeLabel, NodeId>,
    result_node_labels: Vec<NodeLabel>,
    result_edges: DashMap<EdgeLabel, EdgeId>,
    result: Madag,
}

impl Merge {
    /// Creates an empty merge over `reference_sequence`.
    pub fn new(reference_sequence: ReferenceSequence) -> Self {
        let result = Madag::new(reference_sequence.clone());
        Self {
            reference_sequence,
            genomes: GenomeInterner::new(),
            leaf_sets: LeafSetInterner::new(),
            result_nodes: HashMap::new(),
            result_node_labels: Vec::new(),
            result_edges: DashMap::new(),
            result,
        }
    }

    /// The merged DAG.
    pub fn result(&self) -> &Madag {
        &self.result
    }

    /// The shared reference sequence.
    pub fn reference_sequence(&self) -> &ReferenceSequence {
        &self.reference_sequence
    }

    /// The label of every result node, indexed by node id.
    pub fn result_node_labels(&self) -> &[NodeLabel] {
        &self.result_node_labels
    }

    /// The label-to-node-id map of the result DAG.
    pub fn result_nodes(&self) -> &HashMap<NodeLabel, NodeId> {
        &self.result_nodes
    }

    /// The interned compact genomes of this merge.
    pub fn genomes(&self) -> &GenomeInterner {
        &self.genomes
    }

    /// The interned leaf sets of this merge.
    pub fn leaf_sets(&self) -> &LeafSetInterner {
        &self.leaf_sets
    }

    /// Returns `true` when `leaf_set` was observed on any merged node.
    pub fn contains_leaf_set(&self, leaf_set: &LeafSet) -> bool {
        self.leaf_sets.lookup(leaf_set).is_some()
    }

    // =======================================================================
    // Batch merge
    // =======================================================================

    /// Merges a batch of DAGs into the result.
    ///
    /// Inputs must be UA-rooted and share this merge's reference sequence.
    /// Inputs lacking stored compact genomes have them computed on the fly.
    ///
    /// # Errors
    ///
    /// [`MergeError::MissingUa`] / [`MergeError::ReferenceMismatch`] on
    /// invalid inputs, [`MergeError::CladeIndexNotFound`] when an edge's
    /// endpoints cannot be joined, and [`MergeError::Connect`] when the
    /// result fails validation.
    pub fn add_dags(&mut self, dags: &[&Madag]) -> Result<(), MergeError> {
        for (input, dag) in dags.iter().enumerate() {
            if !is_ua_rooted(dag) {
                return Err(MergeError::MissingUa { input });
            }
            if dag.reference_sequence() != &self.reference_sequence {
                return Err(MergeError::ReferenceMismatch { input });
            }
        }

        // Step 1: intern per-node compact genomes, in parallel per input.
        let genome_ids: Vec<Vec<CgId>> = dags
            .par_iter()
            .map(|dag| -> Result<Vec<CgId>, MergeError> {
                let computed;
                let node_genomes: &[CompactGenome] = if dag.have_compact_genomes() {
                    dag.compact_genomes()
                } else {
                    computed = dag.compute_compact_genomes()?;
                    &computed
                };
                Ok(node_genomes.iter().map(|g| self.genomes.intern(g)).collect())
            })
            .collect::<Result<_, _>>()?;
        self.genomes.finalize();

        // Step 2: compute and intern per-node leaf sets, in parallel per
        // input.
        let leaf_set_ids: Vec<Vec<LeafSetId>> = dags
            .par_iter()
            .zip(genome_ids.par_iter())
            .map(|(dag, ids)| {
                compute_leaf_sets(dag.dag(), ids, &self.genomes)
                    .iter()
                    .map(|set| self.leaf_sets.intern(set))
                    .collect()
            })
            .collect();
        self.leaf_sets.finalize();

        let labels: Vec<Vec<NodeLabel>> = dags
            .iter()
            .enumerate()
            .map(|(t, dag)| {
                (0..dag.node_count())
                    .map(|n| {
                        NodeLabel::new(
                            genome_ids[t][n],
                            leaf_set_ids[t][n],
                            dag.sample_id(NodeId(n)).cloned(),
                        )
                    })
                    .collect()
            })
            .collect();

        // Step 3: serially assign result node ids in first-observation
        // order.
        for tree_labels in &labels {
            for label in tree_labels {
                self.assign_node_id(label);
            }
        }

        // Step 4: deduplicate edge labels in parallel; the first observer of
        // a label claims it.
        let result_edges = &self.result_edges;
        let added: Vec<EdgeLabel> = dags
            .par_iter()
            .enumerate()
            .flat_map_iter(|(t, dag)| {
                let tree_labels = &labels[t];
                dag.dag().edge_ids().filter_map(move |e| {
                    let endpoints = dag.dag().edge(e);
                    let label = EdgeLabel::new(
                        tree_labels[endpoints.parent.0].clone(),
                        tree_labels[endpoints.child.0].clone(),
                    );
                    claim_edge(result_edges, label)
                })
            })
            .collect();

        self.finalize_result(added)
    }

    // =======================================================================
    // Incremental merge
    // =======================================================================

    /// Merges one DAG serially, optionally attaching it below an existing
    /// result node.
    ///
    /// With `below = None` (or `below` equal to the result root, which is
    /// treated the same) the whole DAG is added from its UA. Otherwise the
    /// input's UA is discarded and the input's root-child is connected under
    /// `below`'s parent by a synthetic edge.
    ///
    /// Returns the mapping from input node ids to result node ids.
    pub fn add_dag(
        &mut self,
        dag: &Madag,
        below: Option<NodeId>,
    ) -> Result<BTreeMap<NodeId, NodeId>, MergeError> {
        if !is_ua_rooted(dag) {
            return Err(MergeError::MissingUa { input: 0 });
        }
        if dag.reference_sequence() != &self.reference_sequence {
            return Err(MergeError::ReferenceMismatch { input: 0 });
        }
        let below = below.filter(|b| Some(*b) != self.result.root());
        let is_subtree = below.is_some();
        let input_root = dag
            .root()
            .ok_or(MergeError::Connect(ConnectError::MissingRoot))?;

        let computed;
        let node_genomes: &[CompactGenome] = if dag.have_compact_genomes() {
            dag.compact_genomes()
        } else {
            computed = dag.compute_compact_genomes()?;
            &computed
        };
        let genome_ids: Vec<CgId> =
            node_genomes.iter().map(|g| self.genomes.intern(g)).collect();
        self.genomes.finalize();

        let leaf_set_ids: Vec<LeafSetId> =
            compute_leaf_sets(dag.dag(), &genome_ids, &self.genomes)
                .iter()
                .map(|set| self.leaf_sets.intern(set))
                .collect();
        self.leaf_sets.finalize();

        let labels: Vec<Option<NodeLabel>> = (0..dag.node_count())
            .map(|n| {
                if is_subtree && NodeId(n) == input_root {
                    return None;
                }
                Some(NodeLabel::new(
                    genome_ids[n],
                    leaf_set_ids[n],
                    dag.sample_id(NodeId(n)).cloned(),
                ))
            })
            .collect();

        for label in labels.iter().flatten() {
            self.assign_node_id(label);
        }

        let mut added: Vec<EdgeLabel> = Vec::new();
        for e in dag.dag().edge_ids() {
            let endpoints = dag.dag().edge(e);
            if is_subtree && endpoints.parent == input_root {
                continue;
            }
            let (Some(parent), Some(child)) =
                (&labels[endpoints.parent.0], &labels[endpoints.child.0])
            else {
                continue;
            };
            let label = EdgeLabel::new(parent.clone(), child.clone());
            if let Some(label) = claim_edge(&self.result_edges, label) {
                added.push(label);
            }
        }

        if let Some(below) = below {
            // Synthetic edge from below's parent to the mapped root of the
            // new DAG (the single child of the input's UA).
            let below_parent_edge = self.result.dag().parents(below)[0];
            let below_parent = self.result.dag().edge(below_parent_edge).parent;
            let root_child_edge = dag
                .dag()
                .children(input_root)
                .next()
                .ok_or(MergeError::Connect(ConnectError::EmptyClade {
                    node: input_root,
                    clade: crate::newtypes::CladeIdx(0),
                }))?;
            let root_child = dag.dag().edge(root_child_edge).child;
            let Some(child_label) = &labels[root_child.0] else {
                return Err(MergeError::Connect(ConnectError::MissingRoot));
            };
            let label = EdgeLabel::new(
                self.result_node_labels[below_parent.0].clone(),
                child_label.clone(),
            );
            if let Some(label) = claim_edge(&self.result_edges, label) {
                added.push(label);
            }
        }

        self.finalize_result(added)?;

        let mut mapping = BTreeMap::new();
        for (n, label) in labels.iter().enumerate() {
            if let Some(label) = label {
                if let Some(&id) = self.result_nodes.get(label) {
                    mapping.insert(NodeId(n), id);
                }
            }
        }
        Ok(mapping)
    }

    // =======================================================================
    // Finalization
    // =======================================================================

    /// Computes and stores the mutation set of every result edge from its
    /// endpoint genomes.
    pub fn compute_result_edge_mutations(&mut self) -> Result<(), MergeError> {
        let Self {
            reference_sequence,
            genomes,
            result_edges,
            result,
            ..
        } = self;
        for entry in result_edges.iter() {
            let label = entry.key();
            let mutations = CompactGenome::to_edge_mutations(
                reference_sequence,
                genomes.get(label.parent.compact_genome),
                genomes.get(label.child.compact_genome),
            )?;
            result.set_edge_mutation(*entry.value(), mutations);
        }
        Ok(())
    }

    /// Assigns the next result node id to `label` if unseen.
    fn assign_node_id(&mut self, label: &NodeLabel) {
        if !self.result_nodes.contains_key(label) {
            let id = NodeId(self.result_node_labels.len());
            self.result_nodes.insert(label.clone(), id);
            self.result_node_labels.push(label.clone());
        }
    }

    /// Grows the result DAG to cover all assigned labels and appends the
    /// freshly claimed edges, then rebuilds connections.
    fn finalize_result(&mut self, added: Vec<EdgeLabel>) -> Result<(), MergeError> {
        let node_count = self.result_node_labels.len();
        self.result.initialize_nodes(node_count);
        let known = self.result.compact_genomes().len();
        for idx in known..node_count {
            let label = &self.result_node_labels[idx];
            self.result
                .push_compact_genome(self.genomes.get(label.compact_genome).clone());
            if let Some(sample_id) = &label.sample_id {
                self.result.set_sample_id(NodeId(idx), Some(sample_id.clone()));
            }
        }
        for label in added {
            let parent = self.result_nodes[&label.parent];
            let child = self.result_nodes[&label.child];
            let clade = label
                .compute_clade_idx(&self.genomes, &self.leaf_sets)
                .ok_or(MergeError::CladeIndexNotFound { parent, child })?;
            let edge = self.result.append_edge(parent, child, clade);
            self.result.push_edge_mutations(EdgeMutations::new());
            if let Some(mut slot) = self.result_edges.get_mut(&label) {
                *slot = edge;
            }
        }
        self.result.build_connections()?;
        debug_assert_eq!(self.result_nodes.len(), self.result.node_count());
        debug_assert_eq!(self.result_edges.len(), self.result.edge_count());
        Ok(())
    }
}

/// A DAG is UA-rooted for merging purposes when it has a discovered root
/// with exactly one child clade. The stricter id-position convention of
/// [`Madag::assert_ua`] is not required, so merge results can themselves be
/// merged.
fn is_ua_rooted(dag: &Madag) -> bool {
    match dag.root() {
        Some(root) => dag.dag().clade_count(root) == 1,
        None => false,
    }
}

/// Claims `label` in the concurrent edge map, returning it when this caller
/// is the first observer.
fn claim_edge(result_edges: &DashMap<EdgeLabel, EdgeId>, label: EdgeLabel) -> Option<EdgeLabel> {
    match result_edges.entry(label.clone()) {
        Entry::Occupied(_) => None,
        Entry::Vacant(vacant) => {
            vacant.insert(PENDING_EDGE);
            Some(label)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::test_helpers::{alt_tree, reference, sample_tree, subtree_ab};

    /// Merging a single DAG reproduces its node and edge counts and leaf
    /// genomes (S1).
    #[test]
    fn test_single_merge_is_identity() {
        let tree = sample_tree();
        let mut merge = Merge::new(tree.reference_sequence().clone());
        merge.add_dags(&[&tree]).expect("merge succeeds");
        let result = merge.result();
        assert_eq!(result.node_count(), tree.node_count());
        assert_eq!(result.edge_count(), tree.edge_count());
        let mut input_leafs: Vec<_> = tree
            .leafs()
            .iter()
            .map(|&l| tree.compact_genome(l).expect("genomes present").clone())
            .collect();
        let mut result_leafs: Vec<_> = result
            .leafs()
            .iter()
            .map(|&l| result.compact_genome(l).expect("genomes present").clone())
            .collect();
        input_leafs.sort();
        result_leafs.sort();
        assert_eq!(input_leafs, result_leafs);
    }

    /// Merging two identical topologies deduplicates every node and edge
    /// (S2).
    #[test]
    fn test_identical_topologies_deduplicate() {
        let a = sample_tree();
        let b = sample_tree();
        let mut merge = Merge::new(a.reference_sequence().clone());
        merge.add_dags(&[&a, &b]).expect("merge succeeds");
        assert_eq!(merge.result().node_count(), a.node_count());
        assert_eq!(merge.result().edge_count(), a.edge_count());
    }

    /// Merging two distinct topologies over the same leaves shares the
    /// leaves and the UA but keeps both internal structures.
    #[test]
    fn test_disjoint_topologies_union() {
        let a = sample_tree();
        let b = alt_tree();
        let mut merge = Merge::new(a.reference_sequence().clone());
        merge.add_dags(&[&a, &b]).expect("merge succeeds");
        // 4 shared leaves, 2 + 2 distinct internal nodes, 2 distinct roots,
        // 1 shared UA.
        assert_eq!(merge.result().node_count(), 11);
        assert_eq!(merge.result().edge_count(), 14);
        // The UA's single clade now offers both roots.
        let ua = merge.result().root().expect("has root");
        assert_eq!(merge.result().dag().clade_count(ua), 1);
        assert_eq!(merge.result().dag().clade(ua, crate::newtypes::CladeIdx(0)).len(), 2);
    }

    /// Batch and incremental merging produce the same result counts.
    #[test]
    fn test_incremental_matches_batch() {
        let a = sample_tree();
        let b = alt_tree();
        let mut batch = Merge::new(a.reference_sequence().clone());
        batch.add_dags(&[&a, &b]).expect("batch merge succeeds");
        let mut incremental = Merge::new(a.reference_sequence().clone());
        let first = incremental.add_dag(&a, None).expect("first add succeeds");
        let second = incremental.add_dag(&b, None).expect("second add succeeds");
        assert_eq!(first.len(), a.node_count());
        assert_eq!(second.len(), b.node_count());
        assert_eq!(batch.result().node_count(), incremental.result().node_count());
        assert_eq!(batch.result().edge_count(), incremental.result().edge_count());
        // Merging the same DAG again changes nothing.
        incremental.add_dag(&a, None).expect("re-add succeeds");
        assert_eq!(batch.result().node_count(), incremental.result().node_count());
        assert_eq!(batch.result().edge_count(), incremental.result().edge_count());
    }

    /// Result edge mutations agree with the diffs of their endpoint
    /// genomes.
    #[test]
    fn test_result_edge_mutations() {
        let a = sample_tree();
        let b = alt_tree();
        let mut merge = Merge::new(a.reference_sequence().clone());
        merge.add_dags(&[&a, &b]).expect("merge succeeds");
        merge
            .compute_result_edge_mutations()
            .expect("finalization succeeds");
        merge.result().check_edge_mutations().expect("mutations consistent");
    }

    /// Inputs without a UA are rejected.
    #[test]
    fn test_missing_ua_rejected() {
        let mut no_ua = Madag::new(reference("AAA"));
        let a = no_ua.append_node();
        let b = no_ua.append_node();
        let c = no_ua.append_node();
        no_ua.append_edge(c, a, crate::newtypes::CladeIdx(0));
        no_ua.append_edge(c, b, crate::newtypes::CladeIdx(1));
        no_ua.build_connections().expect("valid dag");
        // The root has two child clades, so it is not a universal ancestor.
        let mut merge = Merge::new(reference("AAA"));
        assert_eq!(
            merge.add_dags(&[&no_ua]),
            Err(MergeError::MissingUa { input: 0 })
        );
    }

    /// Inputs over a different reference are rejected.
    #[test]
    fn test_reference_mismatch_rejected() {
        let tree = sample_tree();
        let mut merge = Merge::new(reference("ACGT"));
        assert_eq!(
            merge.add_dags(&[&tree]),
            Err(MergeError::ReferenceMismatch { input: 0 })
        );
    }

    /// Attaching a DAG below a result node adds an alternative resolution
    /// of that node's clade via a synthetic edge from the node's parent.
    #[test]
    fn test_add_dag_below() {
        let tree = sample_tree();
        let alternative = subtree_ab();
        let mut merge = Merge::new(tree.reference_sequence().clone());
        let mapping = merge.add_dag(&tree, None).expect("first add succeeds");
        let root_before = merge.result().root();

        // Attach the alternative resolution below the `ab` node (input
        // node 4 of the sample tree).
        let below = mapping[&NodeId(4)];
        merge
            .add_dag(&alternative, Some(below))
            .expect("subtree add succeeds");

        // The alternative's UA is dropped; its internal node `x` is new,
        // its leaves deduplicate, and three edges appear: x -> a, x -> b
        // and the synthetic root -> x.
        assert_eq!(merge.result().node_count(), tree.node_count() + 1);
        assert_eq!(merge.result().edge_count(), tree.edge_count() + 3);
        assert_eq!(merge.result().root(), root_before);

        // The clade of `ab`'s parent that held one edge now offers two.
        let parent_edge = merge.result().dag().parents(below)[0];
        let endpoints = merge.result().dag().edge(parent_edge);
        assert_eq!(
            merge
                .result()
                .dag()
                .clade(endpoints.parent, endpoints.clade)
                .len(),
            2
        );
    }

    /// Attaching below the result root is treated as adding the whole DAG.
    #[test]
    fn test_add_dag_below_root_is_whole_dag() {
        let tree = sample_tree();
        let mut merge = Merge::new(tree.reference_sequence().clone());
        merge.add_dag(&tree, None).expect("first add succeeds");
        let root = merge.result().root().expect("has root");
        let mapping = merge
            .add_dag(&alt_tree(), Some(root))
            .expect("add below root succeeds");
        // The whole alternative tree was merged, UA included.
        assert_eq!(mapping.len(), alt_tree().node_count());
        assert_eq!(merge.result().node_count(), 11);
        assert_eq!(merge.result().edge_count(), 14);
    }
}
