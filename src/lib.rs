//! # Flowcanvas: Workflow Graph Execution Core
//!
//! Flowcanvas is the execution core behind a visual pipeline editor: a typed
//! node/edge graph, a shared variable namespace with `{{name}}` interpolation,
//! a validation gate, and a depth-first execution engine that calls an
//! external text-generation service per generator node and propagates results
//! downstream.
//!
//! ## Core Concepts
//!
//! - **Nodes**: Typed units of work (input, generator, condition, text
//!   transform, output) carrying a per-kind data bag
//! - **Edges**: Directed connections between node outputs and inputs
//! - **Variable Store**: Global name → value table nodes publish to and
//!   templates read from
//! - **Engine**: Cycle-safe depth-first traversal with fail-fast error
//!   propagation
//! - **Session**: Chat-style orchestration that serializes run requests
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use flowcanvas::client::HttpGenerationClient;
//! use flowcanvas::config::ClientConfig;
//! use flowcanvas::engine::ExecutionEngine;
//! use flowcanvas::graph::{Edge, GraphModel};
//! use flowcanvas::node::Node;
//! use flowcanvas::session::WorkflowSession;
//! use flowcanvas::types::NodeKind;
//! use flowcanvas::vars::VariableStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = GraphModel::new();
//! let mut vars = VariableStore::new();
//!
//! let input = graph.allocate_id(&NodeKind::Input);
//! graph.add_node(Node::new(input.clone(), NodeKind::Input));
//! let generator = graph.allocate_id(&NodeKind::Generator);
//! graph.add_node(Node::new(generator.clone(), NodeKind::Generator));
//! let output = graph.allocate_id(&NodeKind::Output);
//! graph.add_node(Node::new(output.clone(), NodeKind::Output));
//!
//! graph.connect(Edge::between(&input, &generator));
//! graph.connect(Edge::between(&generator, &output));
//!
//! let client = Arc::new(HttpGenerationClient::new(ClientConfig::from_env()));
//! let engine = ExecutionEngine::new(client);
//! let session = WorkflowSession::with_state(graph, vars, engine);
//!
//! let reply = session.send("Summarize the launch notes").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`types`] - Node kinds, statuses, and text transform operations
//! - [`node`] - Node data model and shallow-merge patches
//! - [`graph`] - Graph model with id allocation and cascade deletion
//! - [`vars`] - Variable store and template interpolation
//! - [`validate`] - Runnability checks (minimal and strict policies)
//! - [`client`] - Generation service contract and HTTP adapter
//! - [`engine`] - Depth-first execution engine
//! - [`session`] - Run serialization and chat transcript
//! - [`config`] - Environment-driven configuration
//! - [`telemetry`] - Tracing subscriber setup

pub mod client;
pub mod config;
pub mod engine;
pub mod graph;
pub mod node;
pub mod session;
pub mod telemetry;
pub mod types;
pub mod validate;
pub mod vars;
