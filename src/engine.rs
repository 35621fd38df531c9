//! Execution engine: depth-first graph traversal with fail-fast errors.
//!
//! Given a validated graph and a user-supplied input string, the engine
//! seeds every input node, walks outward along edges depth-first, dispatches
//! per-node side effects (including the generation service call), publishes
//! results into the variable store, and records per-node status on the graph
//! model.
//!
//! Two properties anchor the design:
//!
//! - **At-most-once execution**: a per-run visited set keyed by node id makes
//!   traversal cycle-safe; a node reachable again through a cycle is a dead
//!   end, its contribution was already applied.
//! - **Publish-before-read**: a node's result lands in the variable store
//!   immediately after it is computed and before any downstream node
//!   interpolates. Traversal is depth-first on a single task, so the
//!   ordering holds by construction; executing nodes in parallel would break
//!   it and is therefore not offered.
//!
//! Any node-level failure aborts the whole run. Statuses already written
//! stay on the graph for diagnostics; nothing is rolled back.

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::client::{GenerationClient, GenerationError, GenerationRequest};
use crate::config::EngineConfig;
use crate::graph::GraphModel;
use crate::node::Node;
use crate::types::{NodeKind, NodeStatus, TextOp};
use crate::validate::validate;
use crate::vars::VariableStore;

/// Instruction suffix appended to a generator prompt when its condition
/// guidelines are enabled.
const GUIDELINE_SUFFIX: &str = "Please follow these guidelines strictly:";

/// Classified failure of a workflow run.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// The graph failed validation; no network call was made.
    #[error("workflow not runnable: {message}")]
    #[diagnostic(
        code(flowcanvas::engine::invalid),
        help("Fix the pipeline as described and re-run.")
    )]
    Invalid { message: String },

    /// A generator node's prompt was empty after interpolation.
    #[error("empty prompt on node {node}")]
    #[diagnostic(
        code(flowcanvas::engine::empty_prompt),
        help("Configure a prompt on the generator node or wire an upstream value into it.")
    )]
    EmptyPrompt { node: String },

    /// The generation service rejected a node's request.
    #[error("generation failed on node {node}: {source}")]
    #[diagnostic(code(flowcanvas::engine::generation))]
    Generation {
        node: String,
        #[source]
        #[diagnostic_source]
        source: GenerationError,
    },

    /// A node referenced by an edge vanished from the graph mid-run.
    #[error("node {node} was removed while the run was in flight")]
    #[diagnostic(code(flowcanvas::engine::node_removed))]
    NodeRemoved { node: String },

    /// The run was cancelled by a newer request while still queued.
    #[error("run superseded by a newer request")]
    #[diagnostic(code(flowcanvas::engine::superseded))]
    Superseded,
}

/// Traverses the graph model, reading and writing the variable store and
/// calling out to the generation client per generator node.
///
/// The engine is stateless between runs; everything per-run lives on the
/// stack of [`run`](Self::run).
pub struct ExecutionEngine {
    client: Arc<dyn GenerationClient>,
    config: EngineConfig,
}

impl ExecutionEngine {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(client: Arc<dyn GenerationClient>, config: EngineConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Executes one run: validates, seeds input nodes with `input`, walks
    /// the graph, and returns the output of the last visited node that
    /// produced a non-empty value.
    #[instrument(skip_all, fields(input_len = input.len()))]
    pub async fn run(
        &self,
        graph: &mut GraphModel,
        vars: &mut VariableStore,
        input: &str,
    ) -> Result<String, EngineError> {
        let verdict = validate(graph);
        if !verdict.valid {
            return Err(EngineError::Invalid {
                message: verdict.message,
            });
        }

        let seeds: Vec<String> = graph
            .nodes_of_kind(&NodeKind::Input)
            .map(|n| n.id.clone())
            .collect();

        // The run input overrides any configured default on input nodes.
        for id in &seeds {
            if let Some(node) = graph.node_mut(id) {
                node.data.value = Some(input.to_string());
                node.data.status = NodeStatus::Processing;
            }
        }

        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut outputs: FxHashMap<String, String> = FxHashMap::default();
        let mut final_output = input.to_string();

        for seed in seeds {
            self.traverse(
                graph,
                vars,
                seed,
                input,
                &mut visited,
                &mut outputs,
                &mut final_output,
            )
            .await?;
        }

        debug!(nodes_run = visited.len(), "run complete");
        Ok(final_output)
    }

    /// Depth-first walk from one seed. Children are pushed in reverse so
    /// they pop in connection order, matching recursive pre-order.
    #[allow(clippy::too_many_arguments)]
    async fn traverse(
        &self,
        graph: &mut GraphModel,
        vars: &mut VariableStore,
        seed: String,
        run_input: &str,
        visited: &mut FxHashSet<String>,
        outputs: &mut FxHashMap<String, String>,
        final_output: &mut String,
    ) -> Result<(), EngineError> {
        let mut stack: Vec<(String, String)> = vec![(seed, run_input.to_string())];

        while let Some((id, carried)) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }

            let Some(node) = graph.node(&id).cloned() else {
                return Err(EngineError::NodeRemoved { node: id });
            };

            debug!(node = %id, kind = %node.kind, "executing node");
            if let Some(live) = graph.node_mut(&id) {
                live.data.status = NodeStatus::Processing;
            }

            let processed = match self.dispatch(&node, &carried, vars, outputs, graph).await {
                Ok(value) => value,
                Err(err) => {
                    if let Some(live) = graph.node_mut(&id) {
                        live.data.status = NodeStatus::Error;
                        live.data.output = Some(err.to_string());
                        live.data.last_updated = Some(chrono::Utc::now());
                    }
                    return Err(err);
                }
            };

            // Publish before any downstream node can interpolate.
            if let Some(name) = node.data.variable_name.as_deref() {
                match node.kind {
                    NodeKind::Condition => {
                        let instructions = node
                            .data
                            .instructions
                            .as_deref()
                            .filter(|_| node.data.is_active)
                            .unwrap_or("");
                        vars.set(name, instructions);
                    }
                    _ => vars.set(name, processed.clone()),
                }
            }

            if let Some(live) = graph.node_mut(&id) {
                live.data.status = NodeStatus::Success;
                live.data.output = Some(processed.clone());
                live.data.last_updated = Some(chrono::Utc::now());
            }

            if !processed.is_empty() {
                *final_output = processed.clone();
            }
            outputs.insert(id.clone(), processed.clone());

            let children: Vec<String> = graph
                .edges_from(&id)
                .map(|e| e.target.clone())
                .collect();
            for target in children.into_iter().rev() {
                if !visited.contains(&target) {
                    stack.push((target, processed.clone()));
                }
            }
        }
        Ok(())
    }

    /// Per-kind side effects, producing the value this node forwards along
    /// its outgoing edges.
    async fn dispatch(
        &self,
        node: &Node,
        carried: &str,
        vars: &VariableStore,
        outputs: &FxHashMap<String, String>,
        graph: &GraphModel,
    ) -> Result<String, EngineError> {
        match &node.kind {
            NodeKind::Input => Ok(node
                .data
                .value
                .clone()
                .unwrap_or_else(|| carried.to_string())),

            // Conditions influence sibling nodes through the variable store;
            // their own edge output is the upstream input unchanged.
            NodeKind::Condition => Ok(carried.to_string()),

            NodeKind::Generator => self.run_generator(node, carried, vars).await,

            NodeKind::TextTransform => {
                if !node.data.is_active {
                    return Ok(carried.to_string());
                }
                Ok(match node.data.text_op {
                    TextOp::Uppercase => carried.to_uppercase(),
                    TextOp::Lowercase => carried.to_lowercase(),
                    TextOp::Refine => {
                        let template = node.data.template.as_deref().unwrap_or("{{input}}");
                        vars.interpolate_scoped(template, &[("input", carried)])
                    }
                })
            }

            NodeKind::Output => {
                let upstream: Vec<&str> = graph
                    .edges_into(&node.id)
                    .filter_map(|e| outputs.get(&e.source))
                    .map(String::as_str)
                    .collect();
                let last_non_empty = upstream.iter().rev().find(|v| !v.is_empty()).copied();
                Ok(last_non_empty
                    .map(str::to_string)
                    .or_else(|| {
                        // Documented fallback: latest generator-convention
                        // variable when no upstream value reached us.
                        vars.latest_with_prefix("generator")
                            .or_else(|| vars.latest_with_prefix("refined"))
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| carried.to_string()))
            }

            NodeKind::Other(kind) => {
                warn!(node = %node.id, kind = %kind, "unknown node kind, passing input through");
                Ok(carried.to_string())
            }
        }
    }

    /// Builds the generator prompt, invokes the generation client, and
    /// cleans up the reply.
    async fn run_generator(
        &self,
        node: &Node,
        carried: &str,
        vars: &VariableStore,
    ) -> Result<String, EngineError> {
        let configured = node
            .data
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let mut prompt = match configured {
            Some(text) => vars.interpolate_scoped(text, &[("input", carried)]),
            None => carried.to_string(),
        };

        if node.data.use_conditions {
            if let Some(guidelines) = node
                .data
                .condition_guidelines
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
            {
                let guidelines = vars.interpolate(guidelines);
                prompt = format!(
                    "{prompt}\n\n{GUIDELINE_SUFFIX}\n{guidelines}\n\n\
                     Ensure your response adheres to all the above guidelines \
                     while providing a helpful and informative answer."
                );
            }
        }

        if prompt.trim().is_empty() {
            return Err(EngineError::EmptyPrompt {
                node: node.id.clone(),
            });
        }

        let request = GenerationRequest {
            prompt,
            personal_api_key: node
                .data
                .personal_api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            model: self.config.model.clone(),
        };

        let reply = self
            .client
            .generate(request)
            .await
            .map_err(|source| EngineError::Generation {
                node: node.id.clone(),
                source,
            })?;

        if self.config.cleanup_replies {
            Ok(strip_markup(&reply))
        } else {
            Ok(reply)
        }
    }
}

/// Removes lightweight markup from a generation reply: bold/italic asterisk
/// markers, leading heading markers, and runs of blank lines.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_blank = false;

    for line in text.lines() {
        let line: String = line.chars().filter(|c| *c != '*').collect();
        let trimmed = line.trim_start();
        let line = if trimmed.starts_with('#') {
            let hashes = trimmed.chars().take_while(|c| *c == '#').count();
            let rest = &trimmed[hashes..];
            if hashes <= 6 && rest.starts_with(' ') {
                rest.trim_start().to_string()
            } else {
                line
            }
        } else {
            line
        };

        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&line);
        previous_blank = blank;
    }

    out.trim().to_string()
}
