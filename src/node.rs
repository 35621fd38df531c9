//! Node data model for the flowcanvas graph.
//!
//! A [`Node`] pairs an opaque id and a [`NodeKind`] with an open per-kind
//! attribute bag, [`NodeData`]. The bag is deliberately loose: the editor
//! mutates individual fields as the user types, and the engine reads only
//! the fields relevant to the node's kind. [`NodeDataPatch`] carries the
//! shallow-merge updates coming from the UI surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{NodeKind, NodeStatus, TextOp};

/// A typed unit of work in the workflow graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque unique identifier, `"<kind>-<n>"` when allocated through
    /// [`GraphModel::allocate_id`](crate::graph::GraphModel::allocate_id).
    pub id: String,
    /// The node's kind, driving engine dispatch.
    pub kind: NodeKind,
    /// Per-kind attribute bag.
    pub data: NodeData,
}

impl Node {
    /// Creates a node with default data.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            data: NodeData::default(),
        }
    }

    /// Creates a node with the given data bag.
    pub fn with_data(id: impl Into<String>, kind: NodeKind, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
        }
    }
}

/// Open attribute bag attached to every node.
///
/// Fields the engine reads per kind:
///
/// - `input`: `value` (seeded with the user input on each run)
/// - `generator`: `prompt`, `use_conditions`, `condition_guidelines`,
///   `personal_api_key`
/// - `condition`: `instructions`, `is_active`
/// - `textTransform`: `text_op`, `template`, `is_active`
///
/// `variable_name`, `status`, `output` and `last_updated` apply to all kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    /// Name under which this node's result is published to the variable
    /// store. `None` means the node publishes nothing.
    pub variable_name: Option<String>,
    /// Inactive nodes are pass-through (condition, text transform).
    pub is_active: bool,
    /// Execution status written by the engine.
    pub status: NodeStatus,
    /// Timestamp of the last engine or editor write.
    pub last_updated: Option<DateTime<Utc>>,
    /// Configured default value; overridden by the run input on input nodes.
    pub value: Option<String>,
    /// Generator prompt, interpolated against the variable store.
    pub prompt: Option<String>,
    /// Whether the generator appends its condition guidelines to the prompt.
    pub use_conditions: bool,
    /// Guideline text appended to the generator prompt when enabled.
    pub condition_guidelines: Option<String>,
    /// Condition node instructions, published under `variable_name`.
    pub instructions: Option<String>,
    /// Text transform template (`{{input}}` binds to the upstream value).
    pub template: Option<String>,
    /// Which deterministic transform a text transform node applies.
    pub text_op: TextOp,
    /// Caller-supplied credential overriding the server-side default.
    pub personal_api_key: Option<String>,
    /// Last value this node produced, for display in the editor.
    pub output: Option<String>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            variable_name: None,
            is_active: true,
            status: NodeStatus::Idle,
            last_updated: None,
            value: None,
            prompt: None,
            use_conditions: false,
            condition_guidelines: None,
            instructions: None,
            template: None,
            text_op: TextOp::default(),
            personal_api_key: None,
            output: None,
        }
    }
}

impl NodeData {
    /// Applies a shallow-merge patch: only fields present in the patch are
    /// written, everything else is left untouched.
    pub fn apply(&mut self, patch: NodeDataPatch) {
        if let Some(v) = patch.variable_name {
            self.variable_name = v;
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.value {
            self.value = v;
        }
        if let Some(v) = patch.prompt {
            self.prompt = v;
        }
        if let Some(v) = patch.use_conditions {
            self.use_conditions = v;
        }
        if let Some(v) = patch.condition_guidelines {
            self.condition_guidelines = v;
        }
        if let Some(v) = patch.instructions {
            self.instructions = v;
        }
        if let Some(v) = patch.template {
            self.template = v;
        }
        if let Some(v) = patch.text_op {
            self.text_op = v;
        }
        if let Some(v) = patch.personal_api_key {
            self.personal_api_key = v;
        }
        if let Some(v) = patch.output {
            self.output = v;
        }
        self.last_updated = Some(Utc::now());
    }
}

/// Shallow-merge patch for [`NodeData`].
///
/// The outer `Option` distinguishes "leave unchanged" from "set" (including
/// setting an optional field back to `None`).
///
/// # Examples
///
/// ```rust
/// use flowcanvas::node::NodeDataPatch;
///
/// let patch = NodeDataPatch::new()
///     .prompt("Summarize {{notes}}")
///     .variable_name("summary");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeDataPatch {
    pub variable_name: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub status: Option<NodeStatus>,
    pub value: Option<Option<String>>,
    pub prompt: Option<Option<String>>,
    pub use_conditions: Option<bool>,
    pub condition_guidelines: Option<Option<String>>,
    pub instructions: Option<Option<String>>,
    pub template: Option<Option<String>>,
    pub text_op: Option<TextOp>,
    pub personal_api_key: Option<Option<String>>,
    pub output: Option<Option<String>>,
}

impl NodeDataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn variable_name(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(Some(name.into()));
        self
    }

    #[must_use]
    pub fn is_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }

    #[must_use]
    pub fn status(mut self, status: NodeStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(Some(value.into()));
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(Some(prompt.into()));
        self
    }

    #[must_use]
    pub fn use_conditions(mut self, enabled: bool) -> Self {
        self.use_conditions = Some(enabled);
        self
    }

    #[must_use]
    pub fn condition_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.condition_guidelines = Some(Some(guidelines.into()));
        self
    }

    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(Some(instructions.into()));
        self
    }

    #[must_use]
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(Some(template.into()));
        self
    }

    #[must_use]
    pub fn text_op(mut self, op: TextOp) -> Self {
        self.text_op = Some(op);
        self
    }

    #[must_use]
    pub fn personal_api_key(mut self, key: impl Into<String>) -> Self {
        self.personal_api_key = Some(Some(key.into()));
        self
    }

    #[must_use]
    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(Some(output.into()));
        self
    }
}
