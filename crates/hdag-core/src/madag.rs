//! The mutation-annotated DAG overlay.
//!
//! A [`Madag`] couples a [`Dag`] with the shared reference sequence, per-node
//! [`CompactGenome`]s, per-edge [`EdgeMutations`] and optional per-leaf
//! sample ids. Either annotation may be absent and recomputed from the
//! other: compact genomes follow from edge mutations by walking down from
//! the root, and edge mutations follow from the genomes at each edge's
//! endpoints. When both are present they must be consistent, which
//! [`Madag::check_edge_mutations`] verifies.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use crate::compact_genome::{CompactGenome, CompactGenomeError};
use crate::dag::{ConnectError, Dag, EdgeEndpoints};
use crate::edge_mutations::EdgeMutations;
use crate::newtypes::{Base, CladeIdx, EdgeId, NodeId, ReferenceSequence, SampleId, SitePosition};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced by MADAG annotation computations and UA maintenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MadagError {
    /// The DAG has no universal-ancestor root in the expected shape (last
    /// node id, exactly one clade).
    MissingUa,
    /// A universal ancestor is already present; adding a second one would
    /// create two parentless nodes.
    DuplicateRoot {
        /// The existing UA node.
        ua: NodeId,
    },
    /// Two leaves resolved to the same compact genome.
    NonUniqueLeaf {
        /// The leaf first seen with this genome.
        first: NodeId,
        /// The conflicting leaf.
        second: NodeId,
    },
    /// A stored edge mutation contradicts the genomes at the edge's
    /// endpoints.
    InconsistentMutations {
        /// The offending edge.
        edge: EdgeId,
        /// The site at which the stored base disagrees.
        pos: SitePosition,
    },
    /// Edge mutations are required but absent.
    MissingEdgeMutations,
    /// Compact genomes are required but absent.
    MissingCompactGenomes,
    /// An annotation vector's length disagrees with the DAG.
    AnnotationMismatch {
        /// Which annotation is mis-sized.
        kind: &'static str,
        /// The expected length.
        expected: usize,
        /// The actual length.
        got: usize,
    },
    /// A structural defect reported by the underlying DAG.
    Connect(ConnectError),
    /// A compact-genome operation failed.
    Genome(CompactGenomeError),
}

impl fmt::Display for MadagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingUa => f.write_str("DAG has no universal-ancestor root"),
            Self::DuplicateRoot { ua } => {
                write!(f, "universal ancestor already present at node {ua}")
            }
            Self::NonUniqueLeaf { first, second } => {
                write!(f, "leaves {first} and {second} share a compact genome")
            }
            Self::InconsistentMutations { edge, pos } => {
                write!(f, "edge {edge} mutation at position {pos} contradicts endpoint genomes")
            }
            Self::MissingEdgeMutations => f.write_str("edge mutations are absent"),
            Self::MissingCompactGenomes => f.write_str("compact genomes are absent"),
            Self::AnnotationMismatch { kind, expected, got } => {
                write!(f, "{kind} annotation has length {got}, expected {expected}")
            }
            Self::Connect(e) => write!(f, "connection error: {e}"),
            Self::Genome(e) => write!(f, "compact genome error: {e}"),
        }
    }
}

impl std::error::Error for MadagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) => Some(e),
            Self::Genome(e) => Some(e),
            Self::MissingUa
            | Self::DuplicateRoot { .. }
            | Self::NonUniqueLeaf { .. }
            | Self::InconsistentMutations { .. }
            | Self::MissingEdgeMutations
            | Self::MissingCompactGenomes
            | Self::AnnotationMismatch { .. } => None,
        }
    }
}

impl From<ConnectError> for MadagError {
    fn from(e: ConnectError) -> Self {
        Self::Connect(e)
    }
}

impl From<CompactGenomeError> for MadagError {
    fn from(e: CompactGenomeError) -> Self {
        Self::Genome(e)
    }
}

// ---------------------------------------------------------------------------
// Madag
// ---------------------------------------------------------------------------

/// A mutation-annotated DAG.
///
/// Annotation vectors are parallel to the arena: `compact_genomes` is
/// indexed by node id and `edge_mutations` by edge id. An empty vector means
/// the annotation is absent (not that every entry is empty). Sample ids are
/// sparse; unset entries read as `None`.
#[derive(Debug, Clone)]
pub struct Madag {
    reference_sequence: ReferenceSequence,
    dag: Dag,
    edge_mutations: Vec<EdgeMutations>,
    compact_genomes: Vec<CompactGenome>,
    sample_ids: Vec<Option<SampleId>>,
}

impl Madag {
    /// Creates an empty MADAG over `reference_sequence`.
    pub fn new(reference_sequence: ReferenceSequence) -> Self {
        Self {
            reference_sequence,
            dag: Dag::new(),
            edge_mutations: Vec::new(),
            compact_genomes: Vec::new(),
            sample_ids: Vec::new(),
        }
    }

    /// The shared reference sequence.
    pub fn reference_sequence(&self) -> &ReferenceSequence {
        &self.reference_sequence
    }

    /// The underlying topology.
    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.dag.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.dag.edge_count()
    }

    /// The root node, once connections are built.
    pub fn root(&self) -> Option<NodeId> {
        self.dag.root()
    }

    /// The leaves, once connections are built.
    pub fn leafs(&self) -> &[NodeId] {
        self.dag.leafs()
    }

    /// Returns `true` when the DAG is a single tree.
    pub fn is_tree(&self) -> bool {
        self.dag.is_tree()
    }

    // =======================================================================
    // Construction
    // =======================================================================

    /// Appends a fresh node.
    pub fn append_node(&mut self) -> NodeId {
        self.dag.append_node()
    }

    /// Appends an edge; adjacency becomes valid after
    /// [`Madag::build_connections`].
    pub fn append_edge(&mut self, parent: NodeId, child: NodeId, clade: CladeIdx) -> EdgeId {
        self.dag.append_edge(parent, child, clade)
    }

    /// Grows the node arena to at least `count` nodes.
    pub fn initialize_nodes(&mut self, count: usize) {
        self.dag.initialize_nodes(count);
    }

    /// Rebuilds adjacency from the flat edge list.
    pub fn build_connections(&mut self) -> Result<(), MadagError> {
        self.dag.build_connections()?;
        Ok(())
    }

    /// Replaces the per-edge mutation vector.
    pub fn set_edge_mutations(&mut self, mutations: Vec<EdgeMutations>) {
        self.edge_mutations = mutations;
    }

    /// Replaces the per-node compact genome vector.
    pub fn set_compact_genomes(&mut self, genomes: Vec<CompactGenome>) {
        self.compact_genomes = genomes;
    }

    /// Appends one compact genome, in lockstep with [`Madag::append_node`].
    pub fn push_compact_genome(&mut self, genome: CompactGenome) {
        self.compact_genomes.push(genome);
    }

    /// Appends one edge mutation set, in lockstep with
    /// [`Madag::append_edge`].
    pub fn push_edge_mutations(&mut self, mutations: EdgeMutations) {
        self.edge_mutations.push(mutations);
    }

    /// Overwrites the mutation set of one edge, growing the vector if
    /// needed.
    pub fn set_edge_mutation(&mut self, edge: EdgeId, mutations: EdgeMutations) {
        if self.edge_mutations.len() <= edge.0 {
            self.edge_mutations.resize_with(edge.0 + 1, EdgeMutations::default);
        }
        self.edge_mutations[edge.0] = mutations;
    }

    /// Sets or clears the sample id of `node`.
    pub fn set_sample_id(&mut self, node: NodeId, sample_id: Option<SampleId>) {
        if self.sample_ids.len() <= node.0 {
            self.sample_ids.resize(node.0 + 1, None);
        }
        self.sample_ids[node.0] = sample_id;
    }

    // =======================================================================
    // Annotation access
    // =======================================================================

    /// Returns `true` when per-node compact genomes are stored.
    pub fn have_compact_genomes(&self) -> bool {
        !self.compact_genomes.is_empty()
    }

    /// Returns `true` when per-edge mutations are stored.
    pub fn have_edge_mutations(&self) -> bool {
        !self.edge_mutations.is_empty()
    }

    /// The stored compact genomes, ordered by node id (empty when absent).
    pub fn compact_genomes(&self) -> &[CompactGenome] {
        &self.compact_genomes
    }

    /// The stored edge mutations, ordered by edge id (empty when absent).
    pub fn edge_mutations(&self) -> &[EdgeMutations] {
        &self.edge_mutations
    }

    /// The compact genome of one node, if genomes are stored.
    pub fn compact_genome(&self, node: NodeId) -> Option<&CompactGenome> {
        self.compact_genomes.get(node.0)
    }

    /// The mutation set of one edge, if mutations are stored.
    pub fn edge_mutation(&self, edge: EdgeId) -> Option<&EdgeMutations> {
        self.edge_mutations.get(edge.0)
    }

    /// The sample id of one node, if set.
    pub fn sample_id(&self, node: NodeId) -> Option<&SampleId> {
        self.sample_ids.get(node.0).and_then(|s| s.as_ref())
    }

    /// Clears all stored compact genomes.
    pub fn remove_compact_genomes(&mut self) {
        self.compact_genomes = Vec::new();
    }

    /// Clears all stored edge mutations.
    pub fn remove_edge_mutations(&mut self) {
        self.edge_mutations = Vec::new();
    }

    // =======================================================================
    // Annotation computation
    // =======================================================================

    /// Computes compact genomes from the stored edge mutations.
    ///
    /// The root is seeded with the empty genome; every other node applies its
    /// first parent edge's mutations to the parent's genome, walking an
    /// explicit chain so arbitrarily deep trees do not recurse.
    ///
    /// # Errors
    ///
    /// - [`MadagError::MissingEdgeMutations`] when mutations are absent.
    /// - [`MadagError::NonUniqueLeaf`] when two leaves resolve to the same
    ///   genome.
    /// - [`MadagError::Connect`] when connections have not been built.
    pub fn compute_compact_genomes(&self) -> Result<Vec<CompactGenome>, MadagError> {
        if self.dag.edge_count() > 0 && self.edge_mutations.len() < self.dag.edge_count() {
            return Err(MadagError::MissingEdgeMutations);
        }
        if self.dag.root().is_none() {
            return Err(MadagError::Connect(ConnectError::MissingRoot));
        }
        let mut result: Vec<Option<CompactGenome>> = vec![None; self.dag.node_count()];
        for node in self.dag.node_ids() {
            if result[node.0].is_some() {
                continue;
            }
            // Walk up first-parent links until a computed ancestor or the
            // root, then unwind applying each edge's mutations.
            let mut chain: Vec<NodeId> = Vec::new();
            let mut cur = node;
            let mut acc = loop {
                if let Some(cg) = &result[cur.0] {
                    break cg.clone();
                }
                if self.dag.parents(cur).is_empty() {
                    result[cur.0] = Some(CompactGenome::new());
                    break CompactGenome::new();
                }
                chain.push(cur);
                cur = self.dag.edge(self.dag.parents(cur)[0]).parent;
            };
            for &n in chain.iter().rev() {
                let edge = self.dag.parents(n)[0];
                acc = CompactGenome::apply(&acc, &self.edge_mutations[edge.0], &self.reference_sequence)?;
                result[n.0] = Some(acc.clone());
            }
        }
        let genomes: Vec<CompactGenome> =
            result.into_iter().map(Option::unwrap_or_default).collect();
        let mut leaf_genomes: HashMap<&CompactGenome, NodeId> = HashMap::new();
        for &leaf in self.dag.leafs() {
            if let Some(&first) = leaf_genomes.get(&genomes[leaf.0]) {
                return Err(MadagError::NonUniqueLeaf { first, second: leaf });
            }
            leaf_genomes.insert(&genomes[leaf.0], leaf);
        }
        Ok(genomes)
    }

    /// Computes compact genomes and stores them in place.
    pub fn recompute_compact_genomes(&mut self) -> Result<(), MadagError> {
        self.compact_genomes = self.compute_compact_genomes()?;
        Ok(())
    }

    /// Computes per-edge mutations from the stored compact genomes.
    ///
    /// # Errors
    ///
    /// [`MadagError::MissingCompactGenomes`] when genomes are absent;
    /// [`MadagError::Genome`] on out-of-range sites.
    pub fn compute_edge_mutations(&self) -> Result<Vec<EdgeMutations>, MadagError> {
        if self.compact_genomes.len() < self.dag.node_count() {
            return Err(MadagError::MissingCompactGenomes);
        }
        let mut result = Vec::with_capacity(self.dag.edge_count());
        for edge in self.dag.edge_ids() {
            let EdgeEndpoints { parent, child, .. } = self.dag.edge(edge);
            result.push(CompactGenome::to_edge_mutations(
                &self.reference_sequence,
                &self.compact_genomes[parent.0],
                &self.compact_genomes[child.0],
            )?);
        }
        Ok(result)
    }

    /// Computes edge mutations and stores them in place.
    pub fn recompute_edge_mutations(&mut self) -> Result<(), MadagError> {
        self.edge_mutations = self.compute_edge_mutations()?;
        Ok(())
    }

    /// Verifies that every stored edge mutation agrees with the genomes at
    /// the edge's endpoints.
    ///
    /// Each entry's parent base must equal the parent genome resolved at
    /// that site (defaulting to the reference), and likewise the child base
    /// against the child genome.
    ///
    /// # Errors
    ///
    /// [`MadagError::InconsistentMutations`] naming the first disagreeing
    /// edge and site. Requires both annotations to be present.
    pub fn check_edge_mutations(&self) -> Result<(), MadagError> {
        if self.compact_genomes.len() < self.dag.node_count() {
            return Err(MadagError::MissingCompactGenomes);
        }
        if self.dag.edge_count() > 0 && self.edge_mutations.len() < self.dag.edge_count() {
            return Err(MadagError::MissingEdgeMutations);
        }
        for edge in self.dag.edge_ids() {
            let EdgeEndpoints { parent, child, .. } = self.dag.edge(edge);
            for (pos, (parent_base, child_base)) in self.edge_mutations[edge.0].iter() {
                let resolved_parent = self.resolve_base(&self.compact_genomes[parent.0], pos)?;
                let resolved_child = self.resolve_base(&self.compact_genomes[child.0], pos)?;
                if resolved_parent != parent_base || resolved_child != child_base {
                    return Err(MadagError::InconsistentMutations { edge, pos });
                }
            }
        }
        Ok(())
    }

    fn resolve_base(&self, genome: &CompactGenome, pos: SitePosition) -> Result<Base, MadagError> {
        if let Some(base) = genome.base_at(pos) {
            return Ok(base);
        }
        self.reference_sequence.base_at(pos).ok_or(MadagError::Genome(
            CompactGenomeError::PositionOutOfRange {
                pos,
                reference_len: self.reference_sequence.len(),
            },
        ))
    }

    // =======================================================================
    // Universal ancestor
    // =======================================================================

    /// Returns `true` when a universal ancestor is present: the root is the
    /// last node and has exactly one clade.
    pub fn have_ua(&self) -> bool {
        match self.dag.root() {
            Some(root) => {
                root.0 == self.dag.node_count() - 1 && self.dag.clade_count(root) == 1
            }
            None => false,
        }
    }

    /// Appends a universal-ancestor node above the current root.
    ///
    /// The new node becomes the root, connected to the previous root by a
    /// single mutation-free edge; stored annotations are extended to cover
    /// the new node and edge.
    ///
    /// # Errors
    ///
    /// [`MadagError::DuplicateRoot`] when a UA is already present;
    /// [`MadagError::Connect`] when the DAG has no root to attach above.
    pub fn add_ua(&mut self) -> Result<(), MadagError> {
        if self.have_ua() {
            let ua = self.dag.root().ok_or(MadagError::MissingUa)?;
            return Err(MadagError::DuplicateRoot { ua });
        }
        let root = self.dag.root().ok_or(MadagError::Connect(ConnectError::MissingRoot))?;
        let had_mutations = self.have_edge_mutations();
        let had_genomes = self.have_compact_genomes();
        let ua = self.dag.append_node();
        let ua_edge = self.dag.append_edge(ua, root, CladeIdx(0));
        self.dag.build_connections()?;
        if had_mutations {
            self.set_edge_mutation(ua_edge, EdgeMutations::new());
        }
        if had_genomes {
            self.compact_genomes.resize_with(self.dag.node_count(), CompactGenome::new);
        }
        self.assert_ua()
    }

    /// Verifies the universal-ancestor invariants.
    ///
    /// The root must be the last node with exactly one clade, and any stored
    /// annotation vector must match the DAG's size.
    ///
    /// # Errors
    ///
    /// [`MadagError::MissingUa`] on structural violations,
    /// [`MadagError::AnnotationMismatch`] on mis-sized annotations.
    pub fn assert_ua(&self) -> Result<(), MadagError> {
        let root = self.dag.root().ok_or(MadagError::MissingUa)?;
        if root.0 != self.dag.node_count() - 1 || self.dag.clade_count(root) != 1 {
            return Err(MadagError::MissingUa);
        }
        if !self.edge_mutations.is_empty() && self.edge_mutations.len() != self.dag.edge_count() {
            return Err(MadagError::AnnotationMismatch {
                kind: "edge mutation",
                expected: self.dag.edge_count(),
                got: self.edge_mutations.len(),
            });
        }
        if !self.compact_genomes.is_empty() && self.compact_genomes.len() != self.dag.node_count()
        {
            return Err(MadagError::AnnotationMismatch {
                kind: "compact genome",
                expected: self.dag.node_count(),
                got: self.compact_genomes.len(),
            });
        }
        Ok(())
    }

    // =======================================================================
    // Reindexing
    // =======================================================================

    /// Renumbers nodes in preorder and permutes node annotations to match.
    ///
    /// Edge ids (and therefore edge mutations) are unchanged. Returns the
    /// old-to-new node id map.
    pub fn reindex_preorder(&mut self) -> Result<BTreeMap<NodeId, NodeId>, MadagError> {
        let index = self.dag.reindex_preorder()?;
        if !self.compact_genomes.is_empty() {
            let mut genomes = vec![CompactGenome::new(); self.compact_genomes.len()];
            for (old, new) in &index {
                genomes[new.0] = std::mem::take(&mut self.compact_genomes[old.0]);
            }
            self.compact_genomes = genomes;
        }
        if !self.sample_ids.is_empty() {
            let mut samples = vec![None; self.dag.node_count()];
            for (old, new) in &index {
                if let Some(s) = self.sample_ids.get(old.0) {
                    samples[new.0] = s.clone();
                }
            }
            self.sample_ids = samples;
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::test_helpers::{pos, reference, sample_tree};

    /// Builds a three-node chain `0 -> 1 -> 2` with one mutation per edge.
    fn chain() -> Madag {
        let mut madag = Madag::new(reference("AAAA"));
        for _ in 0..3 {
            madag.append_node();
        }
        madag.append_edge(NodeId(0), NodeId(1), CladeIdx(0));
        madag.append_edge(NodeId(1), NodeId(2), CladeIdx(0));
        madag.build_connections().expect("valid chain");
        madag.set_edge_mutations(vec![
            [(pos(1), (Base::A, Base::G))].into_iter().collect(),
            [(pos(2), (Base::A, Base::T))].into_iter().collect(),
        ]);
        madag
    }

    /// Genomes accumulate mutations down the chain from the empty root
    /// genome.
    #[test]
    fn test_compute_compact_genomes_chain() {
        let madag = chain();
        let genomes = madag.compute_compact_genomes().expect("computes");
        assert!(genomes[0].is_empty());
        assert_eq!(genomes[1].base_at(pos(1)), Some(Base::G));
        assert_eq!(genomes[2].base_at(pos(1)), Some(Base::G));
        assert_eq!(genomes[2].base_at(pos(2)), Some(Base::T));
    }

    /// Edge mutations recomputed from computed genomes reproduce the stored
    /// mutations.
    #[test]
    fn test_genome_mutation_round_trip() {
        let mut madag = chain();
        let original = madag.edge_mutations().to_vec();
        madag.recompute_compact_genomes().expect("computes genomes");
        let recomputed = madag.compute_edge_mutations().expect("computes mutations");
        assert_eq!(recomputed, original);
    }

    /// Two leaves with equal genomes are rejected.
    #[test]
    fn test_non_unique_leaf() {
        let mut madag = Madag::new(reference("AAAA"));
        for _ in 0..3 {
            madag.append_node();
        }
        madag.append_edge(NodeId(0), NodeId(1), CladeIdx(0));
        madag.append_edge(NodeId(0), NodeId(2), CladeIdx(1));
        madag.build_connections().expect("valid dag");
        madag.set_edge_mutations(vec![
            [(pos(1), (Base::A, Base::G))].into_iter().collect(),
            [(pos(1), (Base::A, Base::G))].into_iter().collect(),
        ]);
        assert_eq!(
            madag.compute_compact_genomes(),
            Err(MadagError::NonUniqueLeaf {
                first: NodeId(1),
                second: NodeId(2)
            })
        );
    }

    /// A stored mutation whose parent base contradicts the parent genome is
    /// reported with its edge and site.
    #[test]
    fn test_check_edge_mutations_inconsistency() {
        let mut madag = chain();
        madag.recompute_compact_genomes().expect("computes genomes");
        madag.check_edge_mutations().expect("consistent");
        // Claim the second edge saw C -> T even though the parent genome has
        // G at site 1.
        madag.set_edge_mutation(
            EdgeId(1),
            [(pos(1), (Base::C, Base::T))].into_iter().collect(),
        );
        assert_eq!(
            madag.check_edge_mutations(),
            Err(MadagError::InconsistentMutations {
                edge: EdgeId(1),
                pos: pos(1)
            })
        );
    }

    /// `add_ua` appends the root-above-root and `assert_ua` then passes; a
    /// second `add_ua` fails with `DuplicateRoot`.
    #[test]
    fn test_add_ua_idempotence() {
        let mut madag = chain();
        madag.recompute_compact_genomes().expect("computes genomes");
        assert!(!madag.have_ua());
        madag.add_ua().expect("first add_ua succeeds");
        assert!(madag.have_ua());
        madag.assert_ua().expect("ua invariants hold");
        let ua = madag.root().expect("has root");
        assert_eq!(ua, NodeId(3));
        assert_eq!(
            madag.add_ua(),
            Err(MadagError::DuplicateRoot { ua })
        );
    }

    /// The sample tree fixture satisfies the UA invariants out of the box.
    #[test]
    fn test_sample_tree_has_ua() {
        let madag = sample_tree();
        assert!(madag.have_ua());
        madag.assert_ua().expect("ua invariants hold");
        assert!(madag.is_tree());
        assert_eq!(madag.leafs().len(), 4);
    }

    /// Preorder reindexing renumbers the root to 0 and carries genomes and
    /// sample ids along.
    #[test]
    fn test_reindex_preorder_carries_annotations() {
        let mut madag = sample_tree();
        let root = madag.root().expect("has root");
        let root_genome = madag.compact_genome(root).expect("genomes present").clone();
        let leaf_samples: Vec<_> = madag
            .leafs()
            .iter()
            .map(|&l| {
                (
                    madag.compact_genome(l).expect("genomes present").clone(),
                    madag.sample_id(l).cloned(),
                )
            })
            .collect();

        let index = madag.reindex_preorder().expect("reindex succeeds");
        assert_eq!(index[&root], NodeId(0));
        assert_eq!(madag.root(), Some(NodeId(0)));
        assert_eq!(madag.compact_genome(NodeId(0)), Some(&root_genome));
        for (genome, sample) in leaf_samples {
            let leaf = madag
                .leafs()
                .iter()
                .copied()
                .find(|&l| madag.compact_genome(l) == Some(&genome))
                .expect("leaf survives reindexing");
            assert_eq!(madag.sample_id(leaf).cloned(), sample);
        }
    }

    /// Computing genomes without mutations, or mutations without genomes,
    /// fails with the corresponding error.
    #[test]
    fn test_missing_annotations() {
        let mut madag = Madag::new(reference("AA"));
        madag.append_node();
        let second = madag.append_node();
        madag.append_edge(NodeId(0), second, CladeIdx(0));
        madag.build_connections().expect("valid dag");
        assert_eq!(
            madag.compute_compact_genomes(),
            Err(MadagError::MissingEdgeMutations)
        );
        assert_eq!(
            madag.compute_edge_mutations(),
            Err(MadagError::MissingCompactGenomes)
        );
    }
}
