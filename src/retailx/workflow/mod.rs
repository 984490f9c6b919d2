// SPDX-License-Identifier: MIT

//! Question-answering workflow
//!
//! This module provides:
//! - `WorkflowState` / `StateUpdate` - the state threaded through the graph
//! - the step functions and routing predicate
//! - `AnswerWorkflow` - the graph executor

pub mod graph;
pub mod nodes;
mod state;

pub use graph::{AnswerWorkflow, Edge, NodeId, FALLBACK_ANSWER};
pub use nodes::{route, Assessment, Route};
pub use state::{StateUpdate, WorkflowState};
