#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod compact_genome;
pub mod dag;
pub mod edge_mutations;
pub mod intern;
pub mod json;
pub mod labels;
pub mod leaf_set;
pub mod madag;
pub mod merge;
pub mod newtypes;
pub mod subtree_weight;
pub mod weights;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use compact_genome::{CompactGenome, CompactGenomeError};
pub use dag::{ConnectError, Dag, EdgeEndpoints};
pub use edge_mutations::EdgeMutations;
pub use intern::{CgId, GenomeInterner, Interner, LeafSetId, LeafSetInterner};
pub use json::{JsonError, from_json, to_json};
pub use labels::{EdgeLabel, NodeLabel};
pub use leaf_set::{LeafSet, compute_leaf_sets};
pub use madag::{Madag, MadagError};
pub use merge::{Merge, MergeError};
pub use newtypes::{
    Base, CladeIdx, EdgeId, NewtypeError, NodeId, ReferenceSequence, SampleId, SitePosition,
};
pub use subtree_weight::{SubtreeWeight, WeightError};
pub use weights::{
    MaxRfDistance, MaxSumRfDistance, ParsimonyScore, RfDistance, RfError, SumRfDistance,
    TreeCount, WeightAccumulator, WeightCounter, WeightOps,
};

/// Returns the current version of the hdag-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
