//! Run session: chat-style orchestration over the execution engine.
//!
//! [`WorkflowSession`] is the one public entry point UI collaborators call:
//! `send(input)` validates the graph, executes it through a run queue, and
//! records the turn in a transcript. The queue has concurrency 1 with a
//! supersede rule: a request arriving while another is queued-but-not-started
//! replaces it (the displaced future resolves to
//! [`EngineError::Superseded`]); a request arriving while a run is executing
//! queues behind it. In-flight generation calls are never aborted.
//!
//! The graph model and variable store live behind async mutexes so editor
//! mutations and run execution stay serialized even on a multi-threaded
//! runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify, oneshot};
use tracing::{debug, info};

use crate::engine::{EngineError, ExecutionEngine};
use crate::graph::GraphModel;
use crate::validate::{Validation, validate};
use crate::vars::VariableStore;

/// Who produced a transcript turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
    /// Error bubbles and other non-chat notices.
    System,
}

/// One entry in the chat transcript.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: Sender,
    pub text: String,
    pub when: DateTime<Utc>,
}

impl ChatTurn {
    fn now(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            when: Utc::now(),
        }
    }
}

struct QueuedRun {
    input: String,
    reply: oneshot::Sender<Result<String, EngineError>>,
}

/// Orchestrates one user turn: send message → execute graph → record result.
///
/// At most one run executes at a time; see the module docs for the queue
/// semantics.
pub struct WorkflowSession {
    graph: Arc<Mutex<GraphModel>>,
    vars: Arc<Mutex<VariableStore>>,
    transcript: Arc<Mutex<Vec<ChatTurn>>>,
    pending: Arc<Mutex<Option<QueuedRun>>>,
    wake: Arc<Notify>,
    worker: tokio::task::JoinHandle<()>,
}

impl WorkflowSession {
    /// Creates a session over a fresh graph and variable store.
    pub fn new(engine: ExecutionEngine) -> Self {
        Self::with_state(GraphModel::new(), VariableStore::new(), engine)
    }

    /// Creates a session over existing state, e.g. a graph restored from an
    /// editor import.
    pub fn with_state(graph: GraphModel, vars: VariableStore, engine: ExecutionEngine) -> Self {
        let graph = Arc::new(Mutex::new(graph));
        let vars = Arc::new(Mutex::new(vars));
        let pending: Arc<Mutex<Option<QueuedRun>>> = Arc::new(Mutex::new(None));
        let wake = Arc::new(Notify::new());

        let worker = tokio::spawn(run_worker(
            engine,
            graph.clone(),
            vars.clone(),
            pending.clone(),
            wake.clone(),
        ));

        Self {
            graph,
            vars,
            transcript: Arc::new(Mutex::new(Vec::new())),
            pending,
            wake,
            worker,
        }
    }

    /// Shared handle to the graph model, for editor mutations.
    pub fn graph(&self) -> Arc<Mutex<GraphModel>> {
        self.graph.clone()
    }

    /// Shared handle to the variable store.
    pub fn vars(&self) -> Arc<Mutex<VariableStore>> {
        self.vars.clone()
    }

    /// Current validation verdict, for the editor's readiness checklist.
    pub async fn validation(&self) -> Validation {
        let graph = self.graph.lock().await;
        validate(&graph)
    }

    /// Snapshot of the chat transcript.
    pub async fn transcript(&self) -> Vec<ChatTurn> {
        self.transcript.lock().await.clone()
    }

    /// One user turn: record the message, gate on validation, execute the
    /// graph through the run queue, and record the reply or error.
    ///
    /// Validation failures never start a run and never touch the network.
    pub async fn send(&self, input: impl Into<String>) -> Result<String, EngineError> {
        let input = input.into();
        self.push_turn(ChatTurn::now(Sender::User, input.clone())).await;

        let verdict = self.validation().await;
        if !verdict.valid {
            self.push_turn(ChatTurn::now(Sender::System, verdict.message.clone()))
                .await;
            return Err(EngineError::Invalid {
                message: verdict.message,
            });
        }

        let (tx, rx) = oneshot::channel();
        {
            let mut slot = self.pending.lock().await;
            if let Some(displaced) = slot.take() {
                debug!("superseding queued run");
                let _ = displaced.reply.send(Err(EngineError::Superseded));
            }
            *slot = Some(QueuedRun { input, reply: tx });
        }
        self.wake.notify_one();

        let result = match rx.await {
            Ok(result) => result,
            // Worker gone; treat like a displaced queue entry.
            Err(_) => Err(EngineError::Superseded),
        };

        match &result {
            Ok(text) => {
                self.push_turn(ChatTurn::now(Sender::Bot, text.clone())).await;
            }
            Err(err) => {
                self.push_turn(ChatTurn::now(Sender::System, format!("Error: {err}")))
                    .await;
            }
        }
        result
    }

    async fn push_turn(&self, turn: ChatTurn) {
        self.transcript.lock().await.push(turn);
    }
}

impl Drop for WorkflowSession {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// Single-consumer run loop. Drains the one-slot queue after each wakeup so
/// a request that arrived during execution runs next rather than waiting for
/// another notification.
async fn run_worker(
    engine: ExecutionEngine,
    graph: Arc<Mutex<GraphModel>>,
    vars: Arc<Mutex<VariableStore>>,
    pending: Arc<Mutex<Option<QueuedRun>>>,
    wake: Arc<Notify>,
) {
    loop {
        wake.notified().await;
        loop {
            let Some(job) = pending.lock().await.take() else {
                break;
            };

            info!(run_id = %uuid::Uuid::new_v4(), "starting workflow run");
            let result = {
                let mut graph = graph.lock().await;
                let mut vars = vars.lock().await;
                engine.run(&mut graph, &mut vars, &job.input).await
            };
            let _ = job.reply.send(result);

            // Cosmetic: statuses drift back to idle after a short delay.
            let graph = graph.clone();
            let delay = engine.config().status_reset_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                graph.lock().await.reset_statuses();
            });
        }
    }
}
