//! Per-edge mutation sets.
//!
//! An [`EdgeMutations`] annotates a single DAG edge with the positions at
//! which the child's sequence differs from the parent's, as an ordered map
//! `position -> (parent_base, child_base)`.

use std::collections::BTreeMap;
use std::fmt;

use crate::newtypes::{Base, SitePosition};

/// Ordered mutation set on a single edge.
///
/// Each entry records `(parent_base, child_base)` at a site; entries where
/// the two bases are equal are never stored (they would not be mutations).
/// Iteration is in ascending position order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeMutations {
    mutations: BTreeMap<SitePosition, (Base, Base)>,
}

impl EdgeMutations {
    /// Creates an empty mutation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the mutation at `pos`.
    ///
    /// Returns the previous `(parent, child)` pair if one was present.
    pub fn insert(
        &mut self,
        pos: SitePosition,
        parent: Base,
        child: Base,
    ) -> Option<(Base, Base)> {
        self.mutations.insert(pos, (parent, child))
    }

    /// The `(parent_base, child_base)` pair at `pos`, if present.
    pub fn get(&self, pos: SitePosition) -> Option<(Base, Base)> {
        self.mutations.get(&pos).copied()
    }

    /// Number of mutated sites on this edge.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns `true` when the edge carries no mutations.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Iterates entries as `(position, (parent_base, child_base))` in
    /// ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (SitePosition, (Base, Base))> + '_ {
        self.mutations.iter().map(|(p, bs)| (*p, *bs))
    }
}

impl FromIterator<(SitePosition, (Base, Base))> for EdgeMutations {
    fn from_iter<I: IntoIterator<Item = (SitePosition, (Base, Base))>>(iter: I) -> Self {
        Self {
            mutations: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for EdgeMutations {
    /// Formats as comma-separated `<parent><pos><child>` triples, e.g.
    /// `A3G,T7C`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (pos, (parent, child)) in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{parent}{pos}{child}")?;
            first = false;
        }
        Ok(())
    }
}
