//! JSON interchange for MADAGs.
//!
//! A deliberately small schema used by the CLI and the integration tests:
//!
//! ```json
//! {
//!   "reference_sequence": "ACGT",
//!   "nodes": [
//!     {"compact_genome": [[1, "G"]], "sample_id": "leaf_1"},
//!     {"compact_genome": []}
//!   ],
//!   "edges": [
//!     {"parent": 1, "child": 0, "clade": 0, "mutations": [[1, "A", "G"]]}
//!   ]
//! }
//! ```
//!
//! Compact genomes and mutations are optional per the MADAG model, but
//! must be present on either all nodes/edges or none. Bases, positions and
//! graph structure are validated on load; no attempt is made to reproduce
//! any external tool's schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compact_genome::{CompactGenome, CompactGenomeError};
use crate::dag::ConnectError;
use crate::edge_mutations::EdgeMutations;
use crate::madag::{Madag, MadagError};
use crate::newtypes::{
    Base, CladeIdx, NewtypeError, NodeId, ReferenceSequence, SampleId, SitePosition,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced when reading or writing the JSON MADAG format.
#[derive(Debug)]
pub enum JsonError {
    /// The document is not valid JSON for the schema.
    Parse(serde_json::Error),
    /// A base or position failed validation.
    Newtype(NewtypeError),
    /// A compact genome failed validation against the reference.
    Genome(CompactGenomeError),
    /// The loaded topology is malformed.
    Connect(ConnectError),
    /// An annotation was present on some elements but not all.
    MixedAnnotations {
        /// Which annotation is partially present.
        kind: &'static str,
    },
    /// A MADAG-level computation failed during load.
    Madag(MadagError),
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "JSON parse error: {e}"),
            Self::Newtype(e) => write!(f, "invalid value: {e}"),
            Self::Genome(e) => write!(f, "invalid compact genome: {e}"),
            Self::Connect(e) => write!(f, "malformed topology: {e}"),
            Self::MixedAnnotations { kind } => {
                write!(f, "{kind} must be present on all elements or none")
            }
            Self::Madag(e) => write!(f, "annotation error: {e}"),
        }
    }
}

impl std::error::Error for JsonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Newtype(e) => Some(e),
            Self::Genome(e) => Some(e),
            Self::Connect(e) => Some(e),
            Self::Madag(e) => Some(e),
            Self::MixedAnnotations { .. } => None,
        }
    }
}

impl From<serde_json::Error> for JsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<NewtypeError> for JsonError {
    fn from(e: NewtypeError) -> Self {
        Self::Newtype(e)
    }
}

impl From<CompactGenomeError> for JsonError {
    fn from(e: CompactGenomeError) -> Self {
        Self::Genome(e)
    }
}

impl From<MadagError> for JsonError {
    fn from(e: MadagError) -> Self {
        Self::Madag(e)
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// One node: optional genome (as `(position, base)` pairs) and optional
/// sample id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compact_genome: Option<Vec<(SitePosition, Base)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sample_id: Option<SampleId>,
}

/// One edge: endpoints, clade index and optional mutation triples
/// `(position, parent_base, child_base)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeJson {
    parent: NodeId,
    child: NodeId,
    clade: CladeIdx,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mutations: Option<Vec<(SitePosition, Base, Base)>>,
}

/// The document root.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MadagJson {
    reference_sequence: ReferenceSequence,
    nodes: Vec<NodeJson>,
    edges: Vec<EdgeJson>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Serializes a MADAG to pretty-printed JSON.
pub fn to_json(madag: &Madag) -> Result<String, JsonError> {
    let nodes = (0..madag.node_count())
        .map(|n| NodeJson {
            compact_genome: madag
                .compact_genome(NodeId(n))
                .map(|g| g.iter().collect()),
            sample_id: madag.sample_id(NodeId(n)).cloned(),
        })
        .collect();
    let edges = madag
        .dag()
        .edge_ids()
        .map(|e| {
            let endpoints = madag.dag().edge(e);
            EdgeJson {
                parent: endpoints.parent,
                child: endpoints.child,
                clade: endpoints.clade,
                mutations: madag.edge_mutation(e).map(|m| {
                    m.iter()
                        .map(|(pos, (parent, child))| (pos, parent, child))
                        .collect()
                }),
            }
        })
        .collect();
    let doc = MadagJson {
        reference_sequence: madag.reference_sequence().clone(),
        nodes,
        edges,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parses and validates a MADAG from JSON.
///
/// Connections are built on load, so the returned MADAG has a discovered
/// root and leaf list.
pub fn from_json(text: &str) -> Result<Madag, JsonError> {
    let doc: MadagJson = serde_json::from_str(text)?;
    let mut madag = Madag::new(doc.reference_sequence.clone());

    let with_genomes = doc.nodes.iter().filter(|n| n.compact_genome.is_some()).count();
    if with_genomes != 0 && with_genomes != doc.nodes.len() {
        return Err(JsonError::MixedAnnotations {
            kind: "compact genomes",
        });
    }
    let with_mutations = doc.edges.iter().filter(|e| e.mutations.is_some()).count();
    if with_mutations != 0 && with_mutations != doc.edges.len() {
        return Err(JsonError::MixedAnnotations {
            kind: "edge mutations",
        });
    }

    let mut genomes = Vec::new();
    for node in &doc.nodes {
        let id = madag.append_node();
        if let Some(entries) = &node.compact_genome {
            genomes.push(CompactGenome::try_from_mutations(
                entries.clone(),
                &doc.reference_sequence,
            )?);
        }
        if let Some(sample_id) = &node.sample_id {
            madag.set_sample_id(id, Some(sample_id.clone()));
        }
    }
    let mut mutations = Vec::new();
    for edge in &doc.edges {
        madag.append_edge(edge.parent, edge.child, edge.clade);
        if let Some(entries) = &edge.mutations {
            mutations.push(
                entries
                    .iter()
                    .map(|&(pos, parent, child)| (pos, (parent, child)))
                    .collect::<EdgeMutations>(),
            );
        }
    }
    if with_genomes != 0 {
        madag.set_compact_genomes(genomes);
    }
    if with_mutations != 0 {
        madag.set_edge_mutations(mutations);
    }
    match madag.build_connections() {
        Ok(()) => Ok(madag),
        Err(MadagError::Connect(e)) => Err(JsonError::Connect(e)),
        Err(other) => Err(JsonError::Madag(other)),
    }
}
