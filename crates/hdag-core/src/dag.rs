//! Index-based arena for history-DAG topology.
//!
//! A [`Dag`] stores nodes and edges in flat vectors addressed by [`NodeId`]
//! and [`EdgeId`]. Edges carry their endpoints and a clade index; per-node
//! adjacency (parent edge lists and clade lists) is derived from the flat
//! edge list by [`Dag::build_connections`], which also discovers the root
//! and the leaves and fails fast on structural defects.
//!
//! Nodes and edges are append-only; ids are never invalidated by later
//! appends. [`Dag::reindex_preorder`] is the one renumbering operation, and
//! it returns the old-to-new id map so callers can carry annotations along.

use std::collections::BTreeMap;
use std::fmt;

use crate::newtypes::{CladeIdx, EdgeId, NodeId};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Structural defects detected by [`Dag::build_connections`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// An edge connects a node to itself.
    SelfLoop {
        /// The offending edge.
        edge: EdgeId,
    },
    /// An edge references a node id beyond the node arena.
    MissingEndpoint {
        /// The offending edge.
        edge: EdgeId,
        /// The out-of-range node id.
        node: NodeId,
    },
    /// Two nodes have no parents; a well-formed DAG has exactly one root.
    DuplicateRoot {
        /// The first parentless node found.
        first: NodeId,
        /// The second parentless node found.
        second: NodeId,
    },
    /// No node is parentless; the edge set contains a cycle or is empty of
    /// nodes.
    MissingRoot,
    /// A node's clade list has a clade with no edges.
    EmptyClade {
        /// The node owning the empty clade.
        node: NodeId,
        /// The empty clade's index.
        clade: CladeIdx,
    },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { edge } => write!(f, "edge {edge} is a self-loop"),
            Self::MissingEndpoint { edge, node } => {
                write!(f, "edge {edge} references nonexistent node {node}")
            }
            Self::DuplicateRoot { first, second } => {
                write!(f, "nodes {first} and {second} are both parentless")
            }
            Self::MissingRoot => f.write_str("no parentless node exists"),
            Self::EmptyClade { node, clade } => {
                write!(f, "node {node} has no edges in clade {clade}")
            }
        }
    }
}

impl std::error::Error for ConnectError {}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Endpoints and clade index of a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEndpoints {
    /// The parent (source) node.
    pub parent: NodeId,
    /// The child (target) node.
    pub child: NodeId,
    /// Position of this edge in the parent's clade list.
    pub clade: CladeIdx,
}

#[derive(Debug, Clone, Default)]
struct NodeStorage {
    parents: Vec<EdgeId>,
    clades: Vec<Vec<EdgeId>>,
}

/// An arena-backed rooted DAG.
///
/// Adjacency accessors ([`Dag::parents`], [`Dag::clades`], [`Dag::root`],
/// [`Dag::leafs`]) reflect the edge list as of the last successful
/// [`Dag::build_connections`]; edges appended since then are only visible
/// through [`Dag::edge`] until connections are rebuilt.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    nodes: Vec<NodeStorage>,
    edges: Vec<EdgeEndpoints>,
    root: Option<NodeId>,
    leafs: Vec<NodeId>,
}

impl Dag {
    /// Creates an empty DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a DAG with pre-allocated node and edge capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
            root: None,
            leafs: Vec::new(),
        }
    }

    /// Appends a fresh node and returns its id.
    pub fn append_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeStorage::default());
        id
    }

    /// Grows the node arena to at least `count` nodes.
    pub fn initialize_nodes(&mut self, count: usize) {
        if count > self.nodes.len() {
            self.nodes.resize_with(count, NodeStorage::default);
        }
    }

    /// Appends an edge `parent -> child` in the parent's clade `clade`.
    ///
    /// The edge is recorded in the flat edge list only; call
    /// [`Dag::build_connections`] to update adjacency.
    pub fn append_edge(&mut self, parent: NodeId, child: NodeId, clade: CladeIdx) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(EdgeEndpoints { parent, child, clade });
        id
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges in the arena.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The endpoints of an edge.
    pub fn edge(&self, id: EdgeId) -> EdgeEndpoints {
        self.edges[id.0]
    }

    /// Iterates all node ids.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Iterates all edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    /// The parent edges of `node`.
    pub fn parents(&self, node: NodeId) -> &[EdgeId] {
        &self.nodes[node.0].parents
    }

    /// The clade lists of `node`: one ordered list of child edges per clade.
    pub fn clades(&self, node: NodeId) -> &[Vec<EdgeId>] {
        &self.nodes[node.0].clades
    }

    /// The edges in one clade of `node`.
    pub fn clade(&self, node: NodeId, clade: CladeIdx) -> &[EdgeId] {
        &self.nodes[node.0].clades[clade.0]
    }

    /// Number of clades below `node`.
    pub fn clade_count(&self, node: NodeId) -> usize {
        self.nodes[node.0].clades.len()
    }

    /// Returns `true` when `node` has no child clades.
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node.0].clades.is_empty()
    }

    /// The unique parentless node, once discovered by
    /// [`Dag::build_connections`].
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The leaves, in node-id order, as of the last
    /// [`Dag::build_connections`].
    pub fn leafs(&self) -> &[NodeId] {
        &self.leafs
    }

    /// Returns `true` when the DAG is a single tree
    /// (`node_count == edge_count + 1`).
    pub fn is_tree(&self) -> bool {
        self.nodes.len() == self.edges.len() + 1
    }

    /// Iterates the child edges of `node` across all clades, in clade order.
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.nodes[node.0].clades.iter().flatten().copied()
    }

    /// Rebuilds per-node adjacency from the flat edge list.
    ///
    /// Clade lists are keyed by each edge's stored clade index; within a
    /// clade, edges keep their arena insertion order. On success exactly one
    /// root exists, no clade is empty, and every edge appears in both of its
    /// endpoints' adjacency.
    ///
    /// # Errors
    ///
    /// Fails fast with the first structural defect found; see
    /// [`ConnectError`]. On failure the adjacency state is left cleared.
    pub fn build_connections(&mut self) -> Result<(), ConnectError> {
        self.root = None;
        self.leafs.clear();
        for node in &mut self.nodes {
            node.parents.clear();
            node.clades.clear();
        }
        for (i, edge) in self.edges.iter().enumerate() {
            let id = EdgeId(i);
            if edge.parent == edge.child {
                return Err(ConnectError::SelfLoop { edge: id });
            }
            for endpoint in [edge.parent, edge.child] {
                if endpoint.0 >= self.nodes.len() {
                    return Err(ConnectError::MissingEndpoint { edge: id, node: endpoint });
                }
            }
            let parent = &mut self.nodes[edge.parent.0];
            if edge.clade.0 >= parent.clades.len() {
                parent.clades.resize_with(edge.clade.0 + 1, Vec::new);
            }
            parent.clades[edge.clade.0].push(id);
            self.nodes[edge.child.0].parents.push(id);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            for (c, clade) in node.clades.iter().enumerate() {
                if clade.is_empty() {
                    return Err(ConnectError::EmptyClade {
                        node: NodeId(i),
                        clade: CladeIdx(c),
                    });
                }
            }
            if node.parents.is_empty() {
                if let Some(first) = self.root {
                    return Err(ConnectError::DuplicateRoot { first, second: NodeId(i) });
                }
                self.root = Some(NodeId(i));
            }
            if node.clades.is_empty() {
                self.leafs.push(NodeId(i));
            }
        }
        if self.root.is_none() && !self.nodes.is_empty() {
            return Err(ConnectError::MissingRoot);
        }
        Ok(())
    }

    /// Renumbers nodes in depth-first preorder from the root, rewrites edge
    /// endpoints and rebuilds connections.
    ///
    /// Returns the old-to-new node id map. Edge ids are unchanged.
    ///
    /// # Errors
    ///
    /// [`ConnectError::MissingRoot`] when connections have not been built (or
    /// the DAG has no root); otherwise whatever the final
    /// [`Dag::build_connections`] reports.
    pub fn reindex_preorder(&mut self) -> Result<BTreeMap<NodeId, NodeId>, ConnectError> {
        let root = self.root.ok_or(ConnectError::MissingRoot)?;
        let mut index = BTreeMap::new();
        let mut next = 0usize;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if index.contains_key(&node) {
                continue;
            }
            index.insert(node, NodeId(next));
            next += 1;
            // Reversed so the first clade's first child is visited first.
            let children: Vec<NodeId> = self
                .children(node)
                .map(|e| self.edges[e.0].child)
                .collect();
            for child in children.into_iter().rev() {
                if !index.contains_key(&child) {
                    stack.push(child);
                }
            }
        }
        for edge in &mut self.edges {
            edge.parent = index[&edge.parent];
            edge.child = index[&edge.child];
        }
        self.build_connections()?;
        Ok(index)
    }
}
