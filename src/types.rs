//! Core types for the flowcanvas workflow graph.
//!
//! This module defines the closed set of node kinds the editor understands,
//! the per-node execution status, and the deterministic text transform
//! operations. These are the core domain concepts that define what a
//! workflow *is*; the data carried by each node lives in [`crate::node`].
//!
//! # Examples
//!
//! ```rust
//! use flowcanvas::types::{NodeKind, NodeStatus};
//!
//! let kind = NodeKind::Generator;
//! assert_eq!(kind.as_str(), "generator");
//! assert_eq!(NodeKind::from("generator"), NodeKind::Generator);
//!
//! // Unknown type strings survive as Other for forward compatibility.
//! assert_eq!(NodeKind::from("hologram"), NodeKind::Other("hologram".into()));
//!
//! assert_eq!(NodeStatus::default(), NodeStatus::Idle);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the type of a node within a workflow graph.
///
/// The set is closed for the kinds the engine dispatches on; type strings it
/// does not recognize are preserved in [`Other`](Self::Other) so that graphs
/// authored against a newer palette still load and execute (unknown kinds
/// pass their input through unchanged).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Entry point seeded with the user-supplied input on each run.
    Input,
    /// LLM call against the external text-generation service.
    Generator,
    /// Publishes guideline text into the variable store; passes input through.
    Condition,
    /// Deterministic string transform (uppercase, lowercase, refine).
    TextTransform,
    /// Terminal node holding the final value of a branch.
    Output,
    /// Unrecognized node type, kept verbatim for forward compatibility.
    Other(String),
}

impl NodeKind {
    /// The wire/id-prefix string form of this kind.
    ///
    /// Node ids are allocated as `"<kind>-<n>"`, so this string doubles as
    /// the id prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Input => "input",
            NodeKind::Generator => "generator",
            NodeKind::Condition => "condition",
            NodeKind::TextTransform => "textTransform",
            NodeKind::Output => "output",
            NodeKind::Other(s) => s,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        match s {
            "input" => NodeKind::Input,
            "generator" => NodeKind::Generator,
            "condition" => NodeKind::Condition,
            "textTransform" => NodeKind::TextTransform,
            "output" => NodeKind::Output,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        NodeKind::from(s.as_str())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Per-node execution status surfaced to the editor UI.
///
/// Statuses are written by the engine as it traverses and reset to
/// [`Idle`](Self::Idle) shortly after a run completes. They are diagnostic
/// only; the engine never branches on them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Processing => write!(f, "processing"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Deterministic operation applied by a text transform node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOp {
    Uppercase,
    Lowercase,
    /// Rewrites the input through the node's template, with `{{input}}`
    /// bound to the upstream value.
    #[default]
    Refine,
}
