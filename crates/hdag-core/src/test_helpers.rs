//! Shared fixture constructors for unit tests.
//!
//! Compiled only in test builds. Integration tests under `tests/` define
//! their own local helpers because they link against the non-test library
//! build where this module is not available.
//!
//! All fixtures share the reference sequence `"AAA"` and the four leaf
//! genomes `{}`, `{1C}`, `{1G}`, `{1T}` with sample ids `a` through `d`
//! (plus fifth leaf `e` = `{2C}` where needed), so nodes deduplicate
//! across fixtures when merged.
#![allow(clippy::expect_used)]

use crate::compact_genome::CompactGenome;
use crate::madag::Madag;
use crate::newtypes::{Base, CladeIdx, NodeId, ReferenceSequence, SampleId, SitePosition};

/// Parses a 1-indexed site position, panicking on 0 (test-only).
pub fn pos(value: usize) -> SitePosition {
    SitePosition::new(value).expect("valid position")
}

/// Parses a reference sequence, panicking on invalid characters
/// (test-only).
pub fn reference(s: &str) -> ReferenceSequence {
    ReferenceSequence::try_from(s).expect("valid reference")
}

/// Builds a compact genome from `(position, base)` pairs.
pub fn genome(entries: &[(usize, Base)]) -> CompactGenome {
    let mut entries: Vec<_> = entries.iter().map(|&(p, b)| (pos(p), b)).collect();
    entries.sort_unstable_by_key(|(p, _)| *p);
    CompactGenome::from_raw(entries)
}

/// The four shared leaf genomes, in sample-id order `a`, `b`, `c`, `d`.
pub fn leaf_genomes() -> [CompactGenome; 4] {
    [
        genome(&[]),
        genome(&[(1, Base::C)]),
        genome(&[(1, Base::G)]),
        genome(&[(1, Base::T)]),
    ]
}

/// Finishes a fixture: builds connections, stores the given genomes and
/// derives edge mutations from them.
fn finish(mut madag: Madag, genomes: Vec<CompactGenome>) -> Madag {
    madag.build_connections().expect("fixture is well-formed");
    madag.set_compact_genomes(genomes);
    madag
        .recompute_edge_mutations()
        .expect("fixture genomes are in range");
    madag
}

/// The balanced four-leaf tree `((a b) (c d))` with a UA.
///
/// Nodes: leaves 0..=3 (`a`..`d`), internal 4 = `ab` and 5 = `cd`, root 6,
/// UA 7. All internal genomes equal the reference, so the minimum
/// parsimony score of the tree is 3.
pub fn sample_tree() -> Madag {
    let mut madag = Madag::new(reference("AAA"));
    for _ in 0..8 {
        madag.append_node();
    }
    madag.append_edge(NodeId(4), NodeId(0), CladeIdx(0));
    madag.append_edge(NodeId(4), NodeId(1), CladeIdx(1));
    madag.append_edge(NodeId(5), NodeId(2), CladeIdx(0));
    madag.append_edge(NodeId(5), NodeId(3), CladeIdx(1));
    madag.append_edge(NodeId(6), NodeId(4), CladeIdx(0));
    madag.append_edge(NodeId(6), NodeId(5), CladeIdx(1));
    madag.append_edge(NodeId(7), NodeId(6), CladeIdx(0));
    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        madag.set_sample_id(NodeId(i), Some(SampleId::from(*name)));
    }
    let [a, b, c, d] = leaf_genomes();
    let empty = CompactGenome::new();
    finish(
        madag,
        vec![a, b, c, d, empty.clone(), empty.clone(), empty.clone(), empty],
    )
}

/// The alternative four-leaf topology `((a c) (b d))` over the same leaves
/// as [`sample_tree`].
///
/// Nodes: leaves 0..=3 (`a`..`d`), internal 4 = `ac` and 5 = `bd`, root 6,
/// UA 7.
pub fn alt_tree() -> Madag {
    let mut madag = Madag::new(reference("AAA"));
    for _ in 0..8 {
        madag.append_node();
    }
    madag.append_edge(NodeId(4), NodeId(0), CladeIdx(0));
    madag.append_edge(NodeId(4), NodeId(2), CladeIdx(1));
    madag.append_edge(NodeId(5), NodeId(1), CladeIdx(0));
    madag.append_edge(NodeId(5), NodeId(3), CladeIdx(1));
    madag.append_edge(NodeId(6), NodeId(4), CladeIdx(0));
    madag.append_edge(NodeId(6), NodeId(5), CladeIdx(1));
    madag.append_edge(NodeId(7), NodeId(6), CladeIdx(0));
    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        madag.set_sample_id(NodeId(i), Some(SampleId::from(*name)));
    }
    let [a, b, c, d] = leaf_genomes();
    let empty = CompactGenome::new();
    finish(
        madag,
        vec![a, b, c, d, empty.clone(), empty.clone(), empty.clone(), empty],
    )
}

/// A two-leaf tree over `a` and `b` whose internal node carries `{1G}`,
/// usable as an alternative resolution of the `ab` clade of
/// [`sample_tree`].
///
/// Nodes: leaves 0 = `a`, 1 = `b`, internal 2 = `x`, UA 3.
pub fn subtree_ab() -> Madag {
    let mut madag = Madag::new(reference("AAA"));
    for _ in 0..4 {
        madag.append_node();
    }
    madag.append_edge(NodeId(2), NodeId(0), CladeIdx(0));
    madag.append_edge(NodeId(2), NodeId(1), CladeIdx(1));
    madag.append_edge(NodeId(3), NodeId(2), CladeIdx(0));
    madag.set_sample_id(NodeId(0), Some(SampleId::from("a")));
    madag.set_sample_id(NodeId(1), Some(SampleId::from("b")));
    let [a, b, _, _] = leaf_genomes();
    finish(
        madag,
        vec![a, b, genome(&[(1, Base::G)]), CompactGenome::new()],
    )
}

/// A DAG whose root has two clades with 2 and 3 alternative resolutions,
/// representing 2 x 3 = 6 trees.
///
/// Nodes: leaves 0..=4 (`a`, `b`, `c`, `d`, `e`), alternatives 5 and 6
/// over `{a, b}`, alternatives 7, 8, 9 over `{c, d, e}`, root 10, UA 11.
pub fn fan_dag() -> Madag {
    let mut madag = Madag::new(reference("AAA"));
    for _ in 0..12 {
        madag.append_node();
    }
    for alt in [5, 6] {
        madag.append_edge(NodeId(alt), NodeId(0), CladeIdx(0));
        madag.append_edge(NodeId(alt), NodeId(1), CladeIdx(1));
    }
    for alt in [7, 8, 9] {
        madag.append_edge(NodeId(alt), NodeId(2), CladeIdx(0));
        madag.append_edge(NodeId(alt), NodeId(3), CladeIdx(1));
        madag.append_edge(NodeId(alt), NodeId(4), CladeIdx(2));
    }
    madag.append_edge(NodeId(10), NodeId(5), CladeIdx(0));
    madag.append_edge(NodeId(10), NodeId(6), CladeIdx(0));
    madag.append_edge(NodeId(10), NodeId(7), CladeIdx(1));
    madag.append_edge(NodeId(10), NodeId(8), CladeIdx(1));
    madag.append_edge(NodeId(10), NodeId(9), CladeIdx(1));
    madag.append_edge(NodeId(11), NodeId(10), CladeIdx(0));
    for (i, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        madag.set_sample_id(NodeId(i), Some(SampleId::from(*name)));
    }
    let [a, b, c, d] = leaf_genomes();
    let e = genome(&[(2, Base::C)]);
    finish(
        madag,
        vec![
            a,
            b,
            c,
            d,
            e,
            genome(&[(3, Base::C)]),
            genome(&[(3, Base::G)]),
            genome(&[(3, Base::T)]),
            genome(&[(2, Base::T)]),
            genome(&[(2, Base::T), (3, Base::T)]),
            CompactGenome::new(),
            CompactGenome::new(),
        ],
    )
}

/// A DAG with two independent two-way choices whose tree parsimony scores
/// are `{4, 5, 5, 6}`, with a unique minimum.
///
/// Nodes: leaves 0..=3 (`a'` = `{1C}`, `b'` = `{1G}`, `c'` = `{2C}`,
/// `d'` = `{2G}`), alternatives 4 (score 2) and 5 (score 3) over the first
/// pair, alternatives 6 (score 2) and 7 (score 3) over the second, root 8,
/// UA 9.
pub fn graded_dag() -> Madag {
    let mut madag = Madag::new(reference("AAA"));
    for _ in 0..10 {
        madag.append_node();
    }
    for alt in [4, 5] {
        madag.append_edge(NodeId(alt), NodeId(0), CladeIdx(0));
        madag.append_edge(NodeId(alt), NodeId(1), CladeIdx(1));
    }
    for alt in [6, 7] {
        madag.append_edge(NodeId(alt), NodeId(2), CladeIdx(0));
        madag.append_edge(NodeId(alt), NodeId(3), CladeIdx(1));
    }
    madag.append_edge(NodeId(8), NodeId(4), CladeIdx(0));
    madag.append_edge(NodeId(8), NodeId(5), CladeIdx(0));
    madag.append_edge(NodeId(8), NodeId(6), CladeIdx(1));
    madag.append_edge(NodeId(8), NodeId(7), CladeIdx(1));
    madag.append_edge(NodeId(9), NodeId(8), CladeIdx(0));
    for (i, name) in ["pa", "pb", "pc", "pd"].iter().enumerate() {
        madag.set_sample_id(NodeId(i), Some(SampleId::from(*name)));
    }
    finish(
        madag,
        vec![
            genome(&[(1, Base::C)]),
            genome(&[(1, Base::G)]),
            genome(&[(2, Base::C)]),
            genome(&[(2, Base::G)]),
            CompactGenome::new(),
            genome(&[(1, Base::T)]),
            CompactGenome::new(),
            genome(&[(2, Base::T)]),
            CompactGenome::new(),
            CompactGenome::new(),
        ],
    )
}
