//! Graph model: the authoritative in-memory store of nodes and edges.
//!
//! [`GraphModel`] owns node identity allocation (`"<kind>-<n>"` with per-kind
//! monotonic counters), controlled mutation, and the cascade rules around
//! deletion: removing a node also removes every edge touching it and the
//! variable it published. Validation is a separate concern
//! ([`crate::validate`]); the model itself accepts duplicate and cyclic
//! edges.
//!
//! # Examples
//!
//! ```rust
//! use flowcanvas::graph::{Edge, GraphModel};
//! use flowcanvas::node::Node;
//! use flowcanvas::types::NodeKind;
//! use flowcanvas::vars::VariableStore;
//!
//! let mut graph = GraphModel::new();
//! let mut vars = VariableStore::new();
//!
//! let a = graph.allocate_id(&NodeKind::Input);
//! assert_eq!(a, "input-1");
//! graph.add_node(Node::new(a.clone(), NodeKind::Input));
//!
//! let b = graph.allocate_id(&NodeKind::Output);
//! graph.add_node(Node::new(b.clone(), NodeKind::Output));
//! graph.connect(Edge::between(&a, &b));
//!
//! graph.delete_node(&a, &mut vars);
//! assert!(graph.node(&a).is_none());
//! assert!(graph.edges().is_empty());
//!
//! // Counters never roll back, even across deletions.
//! assert_eq!(graph.allocate_id(&NodeKind::Input), "input-2");
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::{Node, NodeDataPatch};
use crate::types::{NodeKind, NodeStatus};
use crate::vars::VariableStore;

/// A directed connection from one node's output to another node's input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Port on the source node, for multi-port nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Port on the target node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    /// Creates an edge with a fresh id and no port handles.
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: format!("edge-{}", Uuid::new_v4()),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    #[must_use]
    pub fn with_handles(
        mut self,
        source_handle: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        self.source_handle = Some(source_handle.into());
        self.target_handle = Some(target_handle.into());
        self
    }
}

/// In-memory node/edge collection backing the canvas.
///
/// Mutations are serialized by the caller ([`crate::session`] holds the
/// model behind a mutex); the model itself is plain data.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Per-kind id counters. Monotonic; ids are never reused.
    counters: FxHashMap<String, u64>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `"<kind>-<n>"` where `n` is a per-kind counter starting at 1.
    ///
    /// The counter advances even when nodes are later deleted, so an id is
    /// never issued twice for the same kind.
    pub fn allocate_id(&mut self, kind: &NodeKind) -> String {
        let counter = self.counters.entry(kind.as_str().to_string()).or_insert(0);
        *counter += 1;
        format!("{}-{}", kind.as_str(), counter)
    }

    /// Appends a node. No side effects beyond membership.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Removes the node, every edge touching it, and the variable published
    /// under its `variable_name`. Deleting an absent id is a no-op.
    pub fn delete_node(&mut self, id: &str, vars: &mut VariableStore) {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            return;
        };
        let node = self.nodes.remove(pos);
        self.edges.retain(|e| e.source != id && e.target != id);
        if let Some(name) = &node.data.variable_name {
            vars.remove(name);
        }
        tracing::debug!(node = %id, kind = %node.kind, "deleted node with cascades");
    }

    /// Appends an edge. Duplicate and cyclic edges are accepted here;
    /// runnability is the validator's concern.
    pub fn connect(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Shallow-merges `patch` into the node's data. No-op if `id` is absent.
    pub fn update_node_data(&mut self, id: &str, patch: NodeDataPatch) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.data.apply(patch);
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All nodes of the given kind, in insertion order.
    pub fn nodes_of_kind<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = &'a Node> {
        self.nodes.iter().filter(move |n| &n.kind == kind)
    }

    /// Outgoing edges of `id`, in connection order.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Incoming edges of `id`, in connection order.
    pub fn edges_into<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.target == id)
    }

    /// Bulk node replacement for undo/import. Bypasses cascade invariants;
    /// keeping the collections consistent is the caller's responsibility.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
    }

    /// Bulk edge replacement for undo/import.
    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    /// Workflow reset: drops all nodes, edges, counters, and variables.
    pub fn clear(&mut self, vars: &mut VariableStore) {
        self.nodes.clear();
        self.edges.clear();
        self.counters.clear();
        vars.clear();
    }

    /// Resets every node's status to idle. Cosmetic, scheduled by the
    /// session shortly after a run finishes.
    pub fn reset_statuses(&mut self) {
        for node in &mut self.nodes {
            node.data.status = NodeStatus::Idle;
        }
    }
}
