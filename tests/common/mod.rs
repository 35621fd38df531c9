//! Shared fixtures for integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use flowcanvas::client::{GenerationClient, GenerationError, GenerationRequest};
use flowcanvas::graph::{Edge, GraphModel};
use flowcanvas::node::{Node, NodeDataPatch};
use flowcanvas::types::NodeKind;

/// Scripted generation client: pops one scripted result per call, falling
/// back to a canned reply when the script runs out. Records every prompt it
/// receives and counts calls.
pub struct MockGenerationClient {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

#[allow(dead_code)]
impl MockGenerationClient {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(reply.into())])
    }

    pub fn failing(error: GenerationError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    pub fn scripted(script: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            latency: None,
        }
    }

    /// Adds artificial latency per call, for queueing tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("mock reply".to_string()))
    }
}

/// Adds a node of the given kind with a freshly allocated id, applying the
/// patch to its data. Returns the id.
#[allow(dead_code)]
pub fn add_node(graph: &mut GraphModel, kind: NodeKind, patch: NodeDataPatch) -> String {
    let id = graph.allocate_id(&kind);
    graph.add_node(Node::new(id.clone(), kind));
    graph.update_node_data(&id, patch);
    id
}

/// Minimal runnable pipeline: input -> generator -> output.
/// Returns (graph, input id, generator id, output id).
#[allow(dead_code)]
pub fn linear_graph() -> (GraphModel, String, String, String) {
    let mut graph = GraphModel::new();
    let input = add_node(&mut graph, NodeKind::Input, NodeDataPatch::new());
    let generator = add_node(&mut graph, NodeKind::Generator, NodeDataPatch::new());
    let output = add_node(&mut graph, NodeKind::Output, NodeDataPatch::new());
    graph.connect(Edge::between(&input, &generator));
    graph.connect(Edge::between(&generator, &output));
    (graph, input, generator, output)
}
