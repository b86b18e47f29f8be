//! Compact genomes: sparse diffs of a sequence against the shared reference.
//!
//! A [`CompactGenome`] lists only the sites at which a node's sequence
//! differs from the reference, sorted by position. It is immutable after
//! construction; equality, hashing and ordering depend only on the sorted
//! `(position, base)` list, which is what makes genomes usable as interning
//! keys and as the content-based total order on leaf-set clades.

use std::fmt;

use crate::edge_mutations::EdgeMutations;
use crate::newtypes::{Base, ReferenceSequence, SitePosition};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when constructing or diffing compact genomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactGenomeError {
    /// A stored entry's base equals the reference base at that position; such
    /// an entry is not a mutation and must not appear in a compact genome.
    InvalidMutation {
        /// The offending site.
        pos: SitePosition,
        /// The base that matched the reference.
        base: Base,
    },
    /// A site position lies beyond the end of the reference sequence.
    PositionOutOfRange {
        /// The offending site.
        pos: SitePosition,
        /// Length of the reference sequence in bases.
        reference_len: usize,
    },
    /// The supplied mutation list repeats a position.
    DuplicatePosition {
        /// The repeated site.
        pos: SitePosition,
    },
}

impl fmt::Display for CompactGenomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMutation { pos, base } => write!(
                f,
                "entry at position {pos} stores base {base}, which equals the reference"
            ),
            Self::PositionOutOfRange { pos, reference_len } => write!(
                f,
                "position {pos} is beyond the reference sequence (length {reference_len})"
            ),
            Self::DuplicatePosition { pos } => {
                write!(f, "position {pos} appears more than once in the mutation list")
            }
        }
    }
}

impl std::error::Error for CompactGenomeError {}

// ---------------------------------------------------------------------------
// CompactGenome
// ---------------------------------------------------------------------------

/// A sparse position -> base mapping relative to the reference sequence.
///
/// Invariants: entries are sorted by position with no duplicates, and no
/// entry's base equals the reference at its position. The empty genome is
/// the reference itself (and the conventional genome of the UA node).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompactGenome {
    mutations: Vec<(SitePosition, Base)>,
}

impl CompactGenome {
    /// The empty genome (identical to the reference).
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a child genome from its parent and the mutations on the
    /// connecting edge.
    ///
    /// Each edge mutation's child base is applied at its position: entries
    /// whose new base equals the reference are removed (the child reverts to
    /// the reference there), others are inserted or updated in sorted order.
    ///
    /// # Errors
    ///
    /// [`CompactGenomeError::PositionOutOfRange`] when a mutation site lies
    /// beyond the reference.
    pub fn apply(
        parent: &Self,
        mutations: &EdgeMutations,
        reference: &ReferenceSequence,
    ) -> Result<Self, CompactGenomeError> {
        let mut result = parent.mutations.clone();
        for (pos, (_parent_base, child_base)) in mutations.iter() {
            let ref_base =
                reference
                    .base_at(pos)
                    .ok_or(CompactGenomeError::PositionOutOfRange {
                        pos,
                        reference_len: reference.len(),
                    })?;
            let differs = child_base != ref_base;
            match result.binary_search_by_key(&pos, |(p, _)| *p) {
                Ok(i) => {
                    if differs {
                        result[i].1 = child_base;
                    } else {
                        result.remove(i);
                    }
                }
                Err(i) => {
                    if differs {
                        result.insert(i, (pos, child_base));
                    }
                }
            }
        }
        Ok(Self { mutations: result })
    }

    /// Builds a genome from an owned mutation list, validating it against the
    /// reference.
    ///
    /// The list is sorted internally; callers need not pre-sort.
    ///
    /// # Errors
    ///
    /// - [`CompactGenomeError::DuplicatePosition`] on repeated sites.
    /// - [`CompactGenomeError::PositionOutOfRange`] on sites beyond the
    ///   reference.
    /// - [`CompactGenomeError::InvalidMutation`] when an entry's base equals
    ///   the reference at its position.
    pub fn try_from_mutations(
        mut mutations: Vec<(SitePosition, Base)>,
        reference: &ReferenceSequence,
    ) -> Result<Self, CompactGenomeError> {
        mutations.sort_unstable_by_key(|(p, _)| *p);
        for window in mutations.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(CompactGenomeError::DuplicatePosition { pos: window[0].0 });
            }
        }
        for &(pos, base) in &mutations {
            let ref_base =
                reference
                    .base_at(pos)
                    .ok_or(CompactGenomeError::PositionOutOfRange {
                        pos,
                        reference_len: reference.len(),
                    })?;
            if base == ref_base {
                return Err(CompactGenomeError::InvalidMutation { pos, base });
            }
        }
        Ok(Self { mutations })
    }

    /// Builds a genome from a mutation list already known to be sorted,
    /// deduplicated and reference-consistent.
    pub(crate) fn from_raw(mutations: Vec<(SitePosition, Base)>) -> Self {
        debug_assert!(mutations.windows(2).all(|w| w[0].0 < w[1].0));
        Self { mutations }
    }

    /// The base stored at `pos`, or `None` when the genome matches the
    /// reference there.
    pub fn base_at(&self, pos: SitePosition) -> Option<Base> {
        self.mutations
            .binary_search_by_key(&pos, |(p, _)| *p)
            .ok()
            .map(|i| self.mutations[i].1)
    }

    /// Iterates `(position, base)` entries in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (SitePosition, Base)> + '_ {
        self.mutations.iter().copied()
    }

    /// Number of sites differing from the reference.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns `true` when the genome equals the reference.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// The raw sorted mutation list.
    pub fn mutations(&self) -> &[(SitePosition, Base)] {
        &self.mutations
    }

    /// Computes the minimal mutation set of the edge between `parent` and
    /// `child`.
    ///
    /// For each position in the union of the two genomes' sites, the parent
    /// and child bases are resolved (defaulting to the reference) and an
    /// entry `(parent_base, child_base)` is emitted wherever they differ.
    ///
    /// # Errors
    ///
    /// [`CompactGenomeError::PositionOutOfRange`] when either genome stores a
    /// site beyond the reference.
    pub fn to_edge_mutations(
        reference: &ReferenceSequence,
        parent: &Self,
        child: &Self,
    ) -> Result<EdgeMutations, CompactGenomeError> {
        let mut result = EdgeMutations::new();
        for (pos, child_base) in child.iter() {
            let parent_base = match parent.base_at(pos) {
                Some(b) => b,
                None => reference.base_at(pos).ok_or(
                    CompactGenomeError::PositionOutOfRange {
                        pos,
                        reference_len: reference.len(),
                    },
                )?,
            };
            if parent_base != child_base {
                result.insert(pos, parent_base, child_base);
            }
        }
        for (pos, parent_base) in parent.iter() {
            let child_base = match child.base_at(pos) {
                Some(b) => b,
                None => reference.base_at(pos).ok_or(
                    CompactGenomeError::PositionOutOfRange {
                        pos,
                        reference_len: reference.len(),
                    },
                )?,
            };
            if parent_base != child_base {
                result.insert(pos, parent_base, child_base);
            }
        }
        Ok(result)
    }
}

impl fmt::Display for CompactGenome {
    /// Formats as comma-separated `<pos><base>` pairs, e.g. `3G,7C`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (pos, base) in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{pos}{base}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn pos(v: usize) -> SitePosition {
        SitePosition::new(v).expect("valid position")
    }

    fn reference(s: &str) -> ReferenceSequence {
        ReferenceSequence::try_from(s).expect("valid reference")
    }

    fn genome(entries: &[(usize, Base)], r: &ReferenceSequence) -> CompactGenome {
        CompactGenome::try_from_mutations(
            entries.iter().map(|&(p, b)| (pos(p), b)).collect(),
            r,
        )
        .expect("valid genome")
    }

    /// Applying edge mutations inserts, updates and removes entries; a new
    /// base equal to the reference reverts that site.
    #[test]
    fn test_apply_edge_mutations() {
        let r = reference("ACGT");
        let parent = genome(&[(2, Base::T)], &r);
        let muts: EdgeMutations = [
            (pos(1), (Base::A, Base::G)), // insert at a fresh site
            (pos(2), (Base::T, Base::C)), // reference is C at site 2 -> revert
            (pos(4), (Base::T, Base::A)), // insert past existing entries
        ]
        .into_iter()
        .collect();
        let child = CompactGenome::apply(&parent, &muts, &r).expect("apply succeeds");
        assert_eq!(
            child.mutations(),
            &[(pos(1), Base::G), (pos(4), Base::A)]
        );
        assert_eq!(child.base_at(pos(2)), None);
    }

    /// Updating an existing entry to a non-reference base keeps it in place.
    #[test]
    fn test_apply_updates_existing_entry() {
        let r = reference("AAAA");
        let parent = genome(&[(3, Base::C)], &r);
        let muts: EdgeMutations = [(pos(3), (Base::C, Base::G))].into_iter().collect();
        let child = CompactGenome::apply(&parent, &muts, &r).expect("apply succeeds");
        assert_eq!(child.mutations(), &[(pos(3), Base::G)]);
    }

    /// An entry matching the reference is rejected with `InvalidMutation`.
    #[test]
    fn test_invalid_mutation_rejected() {
        let r = reference("ACGT");
        let err = CompactGenome::try_from_mutations(vec![(pos(2), Base::C)], &r)
            .expect_err("base equals reference");
        assert_eq!(
            err,
            CompactGenomeError::InvalidMutation {
                pos: pos(2),
                base: Base::C
            }
        );
    }

    /// Sites past the reference end and duplicates are rejected.
    #[test]
    fn test_out_of_range_and_duplicates_rejected() {
        let r = reference("ACG");
        let err = CompactGenome::try_from_mutations(vec![(pos(4), Base::A)], &r)
            .expect_err("position out of range");
        assert_eq!(
            err,
            CompactGenomeError::PositionOutOfRange {
                pos: pos(4),
                reference_len: 3
            }
        );
        let err = CompactGenome::try_from_mutations(
            vec![(pos(1), Base::C), (pos(1), Base::G)],
            &r,
        )
        .expect_err("duplicate position");
        assert_eq!(err, CompactGenomeError::DuplicatePosition { pos: pos(1) });
    }

    /// Symmetric difference: bases default to the reference on whichever side
    /// lacks an entry, and equal resolved bases produce no mutation.
    #[test]
    fn test_to_edge_mutations_symmetric_difference() {
        let r = reference("AAAA");
        let parent = genome(&[(1, Base::G), (2, Base::C)], &r);
        let child = genome(&[(2, Base::C), (3, Base::T)], &r);
        let muts = CompactGenome::to_edge_mutations(&r, &parent, &child)
            .expect("diff succeeds");
        let entries: Vec<_> = muts.iter().collect();
        assert_eq!(
            entries,
            vec![
                (pos(1), (Base::G, Base::A)), // parent-only entry reverts
                (pos(3), (Base::A, Base::T)), // child-only entry appears
            ]
        );
    }

    /// Diffing a genome against itself yields no mutations, and applying a
    /// diff to the parent reconstructs the child.
    #[test]
    fn test_diff_apply_round_trip() {
        let r = reference("ACGTACGT");
        let parent = genome(&[(1, Base::T), (5, Base::G)], &r);
        let child = genome(&[(1, Base::T), (4, Base::A), (8, Base::C)], &r);
        assert!(
            CompactGenome::to_edge_mutations(&r, &parent, &parent)
                .expect("diff succeeds")
                .is_empty()
        );
        let muts = CompactGenome::to_edge_mutations(&r, &parent, &child)
            .expect("diff succeeds");
        let rebuilt = CompactGenome::apply(&parent, &muts, &r).expect("apply succeeds");
        assert_eq!(rebuilt, child);
    }

    /// Ordering is by mutation-list content, giving a deterministic total
    /// order independent of construction history.
    #[test]
    fn test_content_ordering() {
        let r = reference("AAAA");
        let a = genome(&[(1, Base::C)], &r);
        let b = genome(&[(1, Base::G)], &r);
        let c = genome(&[(2, Base::C)], &r);
        assert!(a < b);
        assert!(b < c);
        assert!(CompactGenome::new() < a);
    }
}
