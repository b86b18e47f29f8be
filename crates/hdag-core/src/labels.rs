//! Node and edge labels: the semantic identity used for deduplication.
//!
//! Two nodes from different input DAGs are the same history-DAG node iff
//! they agree on `(compact genome, leaf set, sample id)` — the
//! [`NodeLabel`]. An edge is identified by the [`EdgeLabel`] pair of its
//! endpoint labels, from which the clade index of the edge in the merged
//! DAG is recovered by locating the child's parent-clade within the
//! parent's leaf set.

use crate::intern::{CgId, GenomeInterner, LeafSetId, LeafSetInterner};
use crate::newtypes::{CladeIdx, SampleId};

/// The semantic identity of a node: genome, child-clade structure and
/// optional sample id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeLabel {
    /// The node's interned compact genome.
    pub compact_genome: CgId,
    /// The node's interned leaf set.
    pub leaf_set: LeafSetId,
    /// The leaf's external sample id, when present.
    pub sample_id: Option<SampleId>,
}

impl NodeLabel {
    /// Creates a label from its parts.
    pub fn new(compact_genome: CgId, leaf_set: LeafSetId, sample_id: Option<SampleId>) -> Self {
        Self {
            compact_genome,
            leaf_set,
            sample_id,
        }
    }
}

/// The semantic identity of an edge: its endpoint labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeLabel {
    /// Label of the parent endpoint.
    pub parent: NodeLabel,
    /// Label of the child endpoint.
    pub child: NodeLabel,
}

impl EdgeLabel {
    /// Creates an edge label from its endpoint labels.
    pub fn new(parent: NodeLabel, child: NodeLabel) -> Self {
        Self { parent, child }
    }

    /// Recovers the clade index of this edge under its parent.
    ///
    /// The child's parent-clade (its flattened leaf set, or its own genome
    /// for a leaf) must appear among the parent's leaf-set clades; its
    /// position there is the clade index. Returns `None` when the clade is
    /// not found, which indicates endpoint labels that cannot be joined by
    /// an edge.
    pub fn compute_clade_idx(
        &self,
        genomes: &GenomeInterner,
        leaf_sets: &LeafSetInterner,
    ) -> Option<CladeIdx> {
        let child_clade = leaf_sets
            .get(self.child.leaf_set)
            .to_parent_clade(self.child.compact_genome, genomes);
        leaf_sets
            .get(self.parent.leaf_set)
            .clades()
            .iter()
            .position(|clade| *clade == child_clade)
            .map(CladeIdx)
    }
}
