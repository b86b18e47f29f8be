//! Leaf sets: the child-clade structure that defines node identity.
//!
//! A node's [`LeafSet`] records, for each of its child clades, the set of
//! leaf compact genomes reachable through that clade. Clades are stored as
//! sorted, deduplicated lists of interned genome ids, and the clades
//! themselves are sorted — both orderings are by genome *content* (via the
//! interner's value table), so the structure is deterministic across runs
//! even though interned ids are not.

use crate::dag::Dag;
use crate::intern::{CgId, GenomeInterner};
use crate::newtypes::NodeId;

/// The nested child-clade leaf structure of a node.
///
/// A leaf node has the empty leaf set. Equality and hashing are over the
/// nested id lists; because ids are interned, this coincides with content
/// equality within one merge session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LeafSet {
    clades: Vec<Vec<CgId>>,
}

impl LeafSet {
    /// The empty leaf set (of a leaf node).
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps pre-normalized clades: each clade sorted and deduplicated, the
    /// clades sorted, all by genome content.
    pub fn from_clades(clades: Vec<Vec<CgId>>) -> Self {
        Self { clades }
    }

    /// The clades, each a sorted list of leaf genome ids.
    pub fn clades(&self) -> &[Vec<CgId>] {
        &self.clades
    }

    /// Number of clades.
    pub fn len(&self) -> usize {
        self.clades.len()
    }

    /// Returns `true` for the leaf-node (empty) leaf set.
    pub fn is_empty(&self) -> bool {
        self.clades.is_empty()
    }

    /// Flattens this leaf set into the single clade the node contributes to
    /// its parent.
    ///
    /// A leaf contributes itself, so `self_genome` (the node's own genome)
    /// is returned when the leaf set is empty.
    pub fn to_parent_clade(&self, self_genome: CgId, genomes: &GenomeInterner) -> Vec<CgId> {
        if self.clades.is_empty() {
            return vec![self_genome];
        }
        let mut leafs: Vec<CgId> = self.clades.iter().flatten().copied().collect();
        sort_by_content(&mut leafs, genomes);
        leafs.dedup();
        leafs
    }
}

/// Sorts genome ids by the content order of the genomes they intern.
fn sort_by_content(ids: &mut [CgId], genomes: &GenomeInterner) {
    ids.sort_unstable_by(|a, b| genomes.get(*a).cmp(genomes.get(*b)));
}

/// Compares two clades lexicographically by genome content.
fn cmp_clades(a: &[CgId], b: &[CgId], genomes: &GenomeInterner) -> std::cmp::Ordering {
    let common = a.len().min(b.len());
    for i in 0..common {
        let ord = genomes.get(a[i]).cmp(genomes.get(b[i]));
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Computes the leaf set of every node by postorder over the DAG.
///
/// `node_genomes` maps each node id to its interned genome; `genomes` must
/// be finalized so clade contents can be ordered. Uses an explicit work
/// stack, so tree depth is bounded only by memory.
pub fn compute_leaf_sets(
    dag: &Dag,
    node_genomes: &[CgId],
    genomes: &GenomeInterner,
) -> Vec<LeafSet> {
    let mut computed: Vec<Option<LeafSet>> = vec![None; dag.node_count()];
    enum Frame {
        Enter(NodeId),
        Exit(NodeId),
    }
    for start in dag.node_ids() {
        if computed[start.0].is_some() {
            continue;
        }
        let mut stack = vec![Frame::Enter(start)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    if computed[node.0].is_some() {
                        continue;
                    }
                    if dag.is_leaf(node) {
                        computed[node.0] = Some(LeafSet::new());
                        continue;
                    }
                    stack.push(Frame::Exit(node));
                    for edge in dag.children(node) {
                        let child = dag.edge(edge).child;
                        if computed[child.0].is_none() {
                            stack.push(Frame::Enter(child));
                        }
                    }
                }
                Frame::Exit(node) => {
                    if computed[node.0].is_some() {
                        continue;
                    }
                    let mut clades: Vec<Vec<CgId>> =
                        Vec::with_capacity(dag.clade_count(node));
                    for clade in dag.clades(node) {
                        let mut leafs: Vec<CgId> = Vec::new();
                        for &edge in clade {
                            let child = dag.edge(edge).child;
                            match &computed[child.0] {
                                Some(child_set) if !child_set.is_empty() => {
                                    leafs.extend(child_set.clades().iter().flatten());
                                }
                                _ => leafs.push(node_genomes[child.0]),
                            }
                        }
                        sort_by_content(&mut leafs, genomes);
                        leafs.dedup();
                        clades.push(leafs);
                    }
                    clades.sort_unstable_by(|a, b| cmp_clades(a, b, genomes));
                    computed[node.0] = Some(LeafSet::from_clades(clades));
                }
            }
        }
    }
    computed.into_iter().map(Option::unwrap_or_default).collect()
}
