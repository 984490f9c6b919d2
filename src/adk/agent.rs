// SPDX-License-Identifier: MIT

//! Agent module - the runnable surface presentation layers talk to

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use tokio::sync::mpsc;

/// Progress events emitted while an agent runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AgentEvent {
    NodeStarted {
        node: String,
    },
    NodeCompleted {
        node: String,
        update: serde_json::Value,
    },
    Answer(String),
    Error(String),
}

/// Core agent trait
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name
    fn name(&self) -> &str;

    /// Run the agent with the given input
    async fn run(&self, input: String) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// Run the agent with streaming events
    async fn run_stream(
        &self,
        input: String,
        tx: mpsc::Sender<AgentEvent>,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        // Default implementation falls back to run()
        match self.run(input).await {
            Ok(res) => {
                let _ = tx.send(AgentEvent::Answer(res.clone())).await;
                Ok(res)
            }
            Err(e) => {
                let _ = tx.send(AgentEvent::Error(e.to_string())).await;
                Err(e)
            }
        }
    }
}
