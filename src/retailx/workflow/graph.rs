// SPDX-License-Identifier: MIT

//! Workflow graph executor
//!
//! The graph is fixed, so it is expressed as an exhaustive `match` over
//! [`NodeId`] rather than a runtime edge map:
//!
//! ```text
//! assess_answerability --route--> yes: explain_failure --> END
//!                               \-> no:  compose_query --> run_query --> compose_answer --> END
//! ```

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::nodes::{self, Route};
use super::state::{StateUpdate, WorkflowState};
use crate::adk::agent::{Agent, AgentEvent};
use crate::adk::gateway::LlmGateway;
use crate::retailx::data::QueryExecutor;

/// Answer used if a traversal somehow ends without one
pub const FALLBACK_ANSWER: &str =
    "Sorry, I was unable to produce an answer to your question. Please try again later.";

/// Upper bound on node visits per traversal; the longest path has four
const MAX_STEPS: usize = 8;

/// Nodes of the workflow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    AssessAnswerability,
    ComposeQuery,
    RunQuery,
    ComposeAnswer,
    ExplainFailure,
}

impl NodeId {
    pub const ENTRY: NodeId = NodeId::AssessAnswerability;

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::AssessAnswerability => "assess_answerability",
            NodeId::ComposeQuery => "compose_query",
            NodeId::RunQuery => "run_query",
            NodeId::ComposeAnswer => "compose_answer",
            NodeId::ExplainFailure => "explain_failure",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing edge of a node
#[derive(Clone, Copy)]
pub enum Edge {
    To(NodeId),
    Branch {
        route: fn(&WorkflowState) -> Route,
        yes: NodeId,
        no: NodeId,
    },
    End,
}

impl Edge {
    /// Resolve the edge against the current state
    pub fn next(&self, state: &WorkflowState) -> Option<NodeId> {
        match *self {
            Edge::To(node) => Some(node),
            Edge::Branch { route, yes, no } => match route(state) {
                Route::Yes => Some(yes),
                Route::No => Some(no),
            },
            Edge::End => None,
        }
    }
}

/// The question-answering workflow
pub struct AnswerWorkflow {
    name: String,
    gateway: LlmGateway,
    executor: Arc<dyn QueryExecutor>,
}

impl AnswerWorkflow {
    pub fn new(gateway: LlmGateway, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            name: "retailx-assistant".to_string(),
            gateway,
            executor,
        }
    }

    /// Transition table
    pub fn edge(node: NodeId) -> Edge {
        match node {
            NodeId::AssessAnswerability => Edge::Branch {
                route: nodes::route,
                yes: NodeId::ExplainFailure,
                no: NodeId::ComposeQuery,
            },
            NodeId::ComposeQuery => Edge::To(NodeId::RunQuery),
            NodeId::RunQuery => Edge::To(NodeId::ComposeAnswer),
            NodeId::ComposeAnswer => Edge::End,
            NodeId::ExplainFailure => Edge::End,
        }
    }

    /// Execute a single node and return its update
    async fn execute_node(&self, node: NodeId, state: &WorkflowState) -> StateUpdate {
        match node {
            NodeId::AssessAnswerability => nodes::assess_answerability(&self.gateway, state).await,
            NodeId::ComposeQuery => nodes::compose_query(&self.gateway, state).await,
            NodeId::RunQuery => nodes::run_query(self.executor.as_ref(), state).await,
            NodeId::ComposeAnswer => nodes::compose_answer(&self.gateway, state).await,
            NodeId::ExplainFailure => nodes::explain_failure(&self.gateway, state).await,
        }
    }

    /// Run the graph from the entry node and return the final state
    pub async fn invoke(&self, question: impl Into<String>) -> WorkflowState {
        self.traverse(WorkflowState::new(question), None).await
    }

    /// Run the graph and return only the answer
    pub async fn run_workflow(&self, question: impl Into<String>) -> String {
        self.invoke(question).await.answer.unwrap_or_default()
    }

    async fn traverse(
        &self,
        mut state: WorkflowState,
        tx: Option<&mpsc::Sender<AgentEvent>>,
    ) -> WorkflowState {
        let run_id = Uuid::new_v4();
        log::info!("[{}] Workflow started: {:?}", run_id, state.question);

        let mut current = Some(NodeId::ENTRY);
        let mut steps = 0;

        while let Some(node) = current {
            steps += 1;
            if steps > MAX_STEPS {
                log::error!("[{}] Workflow exceeded {} steps", run_id, MAX_STEPS);
                break;
            }

            log::info!("[{}] Executing node: {}", run_id, node);
            emit(
                tx,
                AgentEvent::NodeStarted {
                    node: node.to_string(),
                },
            )
            .await;

            let update = self.execute_node(node, &state).await;
            emit(
                tx,
                AgentEvent::NodeCompleted {
                    node: node.to_string(),
                    update: update.to_json(),
                },
            )
            .await;
            state.apply(update);

            current = Self::edge(node).next(&state);
            match current {
                Some(next) => log::debug!("[{}] {} -> {}", run_id, node, next),
                None => log::info!("[{}] Node {} completed, workflow finished", run_id, node),
            }
        }

        if state.answer.as_deref().map_or(true, str::is_empty) {
            log::error!("[{}] Workflow ended without an answer", run_id);
            state.answer = Some(FALLBACK_ANSWER.to_string());
        }

        state
    }
}

async fn emit(tx: Option<&mpsc::Sender<AgentEvent>>, event: AgentEvent) {
    if let Some(tx) = tx {
        // A dropped receiver only means nobody is listening any more
        let _ = tx.send(event).await;
    }
}

#[async_trait]
impl Agent for AnswerWorkflow {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: String) -> Result<String, Box<dyn Error + Send + Sync>> {
        Ok(self.run_workflow(input).await)
    }

    async fn run_stream(
        &self,
        input: String,
        tx: mpsc::Sender<AgentEvent>,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let state = self.traverse(WorkflowState::new(input), Some(&tx)).await;
        let answer = state.answer.unwrap_or_default();
        let _ = tx.send(AgentEvent::Answer(answer.clone())).await;
        Ok(answer)
    }
}
