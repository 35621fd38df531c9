//! Runnability checks for workflow graphs.
//!
//! [`validate`] is the gate the engine consults before every run: a pure,
//! total function that returns the first failing rule's human-readable
//! message. It checks necessary conditions only (required kinds exist and
//! touch at least one edge), which is cheap and matches what the editor
//! surfaces as an actionable checklist.
//!
//! [`validate_strict`] layers full input → output reachability on top, as a
//! backward-compatible stricter policy: everything `validate` accepts and a
//! directed path from every input node to some output node.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::graph::GraphModel;
use crate::types::NodeKind;

/// Outcome of a validation pass: never an error, always a verdict plus the
/// message the editor shows the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
        }
    }

    fn ready() -> Self {
        Self {
            valid: true,
            message: "Pipeline is ready.".to_string(),
        }
    }
}

/// Minimal runnability policy. Rules are checked in order and the first
/// failure short-circuits.
pub fn validate(graph: &GraphModel) -> Validation {
    let nodes = graph.nodes();
    if nodes.is_empty() {
        return Validation::invalid("Drop some nodes to create a pipeline.");
    }
    if !nodes.iter().any(|n| n.kind == NodeKind::Input) {
        return Validation::invalid("Add an Input node to receive user messages.");
    }
    if !nodes.iter().any(|n| n.kind == NodeKind::Generator) {
        return Validation::invalid("Add a Generator node to process messages.");
    }
    if !nodes.iter().any(|n| n.kind == NodeKind::Output) {
        return Validation::invalid("Add an Output node to send responses.");
    }
    if graph.edges().is_empty() {
        return Validation::invalid("Connect your nodes to define the flow.");
    }

    let connected: FxHashSet<&str> = graph
        .edges()
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();

    for node in graph.nodes_of_kind(&NodeKind::Input) {
        if !connected.contains(node.id.as_str()) {
            return Validation::invalid("Connect the input node.");
        }
    }
    for node in graph.nodes_of_kind(&NodeKind::Output) {
        if !connected.contains(node.id.as_str()) {
            return Validation::invalid("Connect the output node.");
        }
    }

    Validation::ready()
}

/// Strict policy: everything [`validate`] requires, plus a directed path
/// from every input node to some output node.
pub fn validate_strict(graph: &GraphModel) -> Validation {
    let base = validate(graph);
    if !base.valid {
        return base;
    }
    for input in graph.nodes_of_kind(&NodeKind::Input) {
        let reaches_output = graph
            .nodes_of_kind(&NodeKind::Output)
            .any(|output| path_exists(graph, &input.id, &output.id));
        if !reaches_output {
            return Validation::invalid("Connect the input node to an output node.");
        }
    }
    Validation::ready()
}

/// Depth-first reachability along edge direction. Cycle-safe via a visited
/// set.
fn path_exists(graph: &GraphModel, source: &str, target: &str) -> bool {
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut stack = vec![source];
    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        for edge in graph.edges_from(current) {
            stack.push(edge.target.as_str());
        }
    }
    false
}
