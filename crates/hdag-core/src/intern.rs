//! Concurrent interning of compact genomes and leaf sets.
//!
//! The merge engine deduplicates [`CompactGenome`]s and
//! [`LeafSet`](crate::leaf_set::LeafSet)s across all input DAGs. Interning
//! runs inside rayon-parallel phases, so the id map is a `dashmap`
//! concurrent map with ids allocated from an atomic counter; between
//! phases, [`Interner::finalize`] rebuilds an id-indexed table of the
//! interned values that the following (read-only) phases index directly.
//!
//! Interned ids are only meaningful relative to the interner that produced
//! them; equal values always receive equal ids within one interner.

use std::hash::Hash;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

use crate::compact_genome::CompactGenome;
use crate::leaf_set::LeafSet;

/// Interned id of a [`CompactGenome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CgId(pub u32);

/// Interned id of a [`LeafSet`](crate::leaf_set::LeafSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafSetId(pub u32);

/// A deduplicating value store with stable `u32` ids.
///
/// `intern` may be called concurrently; `finalize`, `get` and `values`
/// require exclusive or quiescent access (they are used between parallel
/// phases).
#[derive(Debug)]
pub struct Interner<T: Eq + Hash + Clone> {
    ids: DashMap<T, u32>,
    next: AtomicU32,
    table: Vec<T>,
}

impl<T: Eq + Hash + Clone + Default> Default for Interner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Interner<T> {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            ids: DashMap::new(),
            next: AtomicU32::new(0),
            table: Vec::new(),
        }
    }

    /// Returns the id of `value`, inserting it when unseen.
    ///
    /// Safe to call from multiple threads; the first inserter of a value
    /// allocates its id and every caller observes that id.
    pub fn intern(&self, value: &T) -> u32 {
        if let Some(id) = self.ids.get(value) {
            return *id;
        }
        *self
            .ids
            .entry(value.clone())
            .or_insert_with(|| self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Looks up the id of `value` without inserting.
    pub fn lookup(&self, value: &T) -> Option<u32> {
        self.ids.get(value).map(|id| *id)
    }

    /// Rebuilds the id-indexed value table after a parallel interning phase.
    pub fn finalize(&mut self)
    where
        T: Default,
    {
        let len = self.next.load(Ordering::Relaxed) as usize;
        let mut table = vec![T::default(); len];
        for entry in self.ids.iter() {
            table[*entry.value() as usize] = entry.key().clone();
        }
        self.table = table;
    }

    /// The value interned under `id`. Valid after [`Interner::finalize`].
    pub fn get(&self, id: u32) -> &T {
        &self.table[id as usize]
    }

    /// The id-indexed table of interned values.
    pub fn values(&self) -> &[T] {
        &self.table
    }

    /// Number of distinct values interned.
    pub fn len(&self) -> usize {
        self.next.load(Ordering::Relaxed) as usize
    }

    /// Returns `true` when nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The process-wide deduplicating set of compact genomes for one merge.
#[derive(Debug, Default)]
pub struct GenomeInterner {
    inner: Interner<CompactGenome>,
}

impl GenomeInterner {
    /// Creates an empty genome interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a genome, returning its stable id.
    pub fn intern(&self, genome: &CompactGenome) -> CgId {
        CgId(self.inner.intern(genome))
    }

    /// Rebuilds the id-indexed genome table.
    pub fn finalize(&mut self) {
        self.inner.finalize();
    }

    /// The genome interned under `id`.
    pub fn get(&self, id: CgId) -> &CompactGenome {
        self.inner.get(id.0)
    }

    /// The id-indexed genome table.
    pub fn values(&self) -> &[CompactGenome] {
        self.inner.values()
    }

    /// Number of distinct genomes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` when no genome has been interned.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// The deduplicating set of leaf sets for one merge.
#[derive(Debug, Default)]
pub struct LeafSetInterner {
    inner: Interner<LeafSet>,
}

impl LeafSetInterner {
    /// Creates an empty leaf-set interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a leaf set, returning its stable id.
    pub fn intern(&self, leaf_set: &LeafSet) -> LeafSetId {
        LeafSetId(self.inner.intern(leaf_set))
    }

    /// Looks up a leaf set without inserting.
    pub fn lookup(&self, leaf_set: &LeafSet) -> Option<LeafSetId> {
        self.inner.lookup(leaf_set).map(LeafSetId)
    }

    /// Rebuilds the id-indexed leaf-set table.
    pub fn finalize(&mut self) {
        self.inner.finalize();
    }

    /// The leaf set interned under `id`.
    pub fn get(&self, id: LeafSetId) -> &LeafSet {
        self.inner.get(id.0)
    }

    /// Number of distinct leaf sets.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` when no leaf set has been interned.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use rayon::prelude::*;

    use super::*;
    use crate::newtypes::{Base, SitePosition};

    fn genome(entries: &[(usize, Base)]) -> CompactGenome {
        CompactGenome::from_raw(
            entries
                .iter()
                .map(|&(p, b)| (SitePosition::new(p).expect("valid position"), b))
                .collect(),
        )
    }

    /// Equal values intern to equal ids; distinct values to distinct ids.
    #[test]
    fn test_dedup_ids() {
        let mut interner = GenomeInterner::new();
        let a = genome(&[(1, Base::G)]);
        let b = genome(&[(2, Base::C)]);
        let id_a = interner.intern(&a);
        let id_b = interner.intern(&b);
        assert_ne!(id_a, id_b);
        assert_eq!(interner.intern(&a), id_a);
        assert_eq!(interner.len(), 2);
        interner.finalize();
        assert_eq!(interner.get(id_a), &a);
        assert_eq!(interner.get(id_b), &b);
    }

    /// Parallel interning of overlapping values converges on one id per
    /// value.
    #[test]
    fn test_parallel_intern_converges() {
        let interner = GenomeInterner::new();
        let genomes: Vec<CompactGenome> =
            (1..=8).map(|p| genome(&[(p, Base::T)])).collect();
        let ids: Vec<Vec<CgId>> = (0..16)
            .into_par_iter()
            .map(|_| genomes.iter().map(|g| interner.intern(g)).collect())
            .collect();
        assert_eq!(interner.len(), genomes.len());
        for worker_ids in &ids {
            assert_eq!(worker_ids, &ids[0]);
        }
    }
}
