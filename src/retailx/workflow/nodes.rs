// SPDX-License-Identifier: MIT

//! Step functions of the workflow graph
//!
//! Every step is total: gateway, parse and query failures are logged and
//! turned into text in the step's own output field.

use serde::Deserialize;

use super::state::{StateUpdate, WorkflowState};
use crate::adk::gateway::{strip_query_quoting, LlmGateway};
use crate::retailx::data::{QueryExecutor, DATA_DESCRIPTION};
use crate::retailx::prompts::{
    AssessPrompt, ComposeAnswerPrompt, ComposeQueryPrompt, ExplainFailurePrompt,
};

/// Structured output of the answerability check
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Assessment {
    pub reasoning: String,
    pub can_answer: bool,
}

/// Outcome of the routing predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Skip the data pipeline
    Yes,
    No,
}

/// Skip the data pipeline iff the question was judged unanswerable
pub fn route(state: &WorkflowState) -> Route {
    if state.can_answer.unwrap_or(false) {
        Route::No
    } else {
        Route::Yes
    }
}

pub async fn assess_answerability(gateway: &LlmGateway, state: &WorkflowState) -> StateUpdate {
    let prompt = AssessPrompt {
        data_description: DATA_DESCRIPTION,
        question: &state.question,
    };

    match gateway.complete_structured::<Assessment>(&prompt).await {
        Ok(assessment) => StateUpdate::default()
            .plan(assessment.reasoning)
            .can_answer(assessment.can_answer),
        Err(e) => {
            if e.is_parse_error() {
                log::warn!("Error in assess_answerability (parse): {}", e);
            } else {
                log::error!("Error in assess_answerability: {}", e);
            }
            StateUpdate::default().plan(e.to_string()).can_answer(false)
        }
    }
}

pub async fn compose_query(gateway: &LlmGateway, state: &WorkflowState) -> StateUpdate {
    let prompt = ComposeQueryPrompt {
        data_description: DATA_DESCRIPTION,
        question: &state.question,
        plan: state.plan_text(),
    };

    match gateway.complete_text(&prompt).await {
        Ok(text) => StateUpdate::default().sql_query(strip_query_quoting(&text)),
        Err(e) => {
            log::error!("Error in compose_query: {}", e);
            StateUpdate::default().sql_query(e.to_string())
        }
    }
}

pub async fn run_query(executor: &dyn QueryExecutor, state: &WorkflowState) -> StateUpdate {
    let query = state.sql_query.as_deref().unwrap_or_default();

    match executor.execute(query).await {
        Ok(table) => StateUpdate::default().sql_result(table),
        Err(e) => StateUpdate::default().sql_result(e.to_string()),
    }
}

pub async fn compose_answer(gateway: &LlmGateway, state: &WorkflowState) -> StateUpdate {
    let prompt = ComposeAnswerPrompt {
        question: &state.question,
        plan: state.plan_text(),
        sql_query: state.sql_query.as_deref().unwrap_or_default(),
        sql_result: state.sql_result.as_deref().unwrap_or_default(),
    };

    match gateway.complete_text(&prompt).await {
        Ok(text) => StateUpdate::default().answer(text),
        Err(e) => {
            log::error!("Error in compose_answer: {}", e);
            StateUpdate::default().answer(e.to_string())
        }
    }
}

pub async fn explain_failure(gateway: &LlmGateway, state: &WorkflowState) -> StateUpdate {
    let prompt = ExplainFailurePrompt {
        question: &state.question,
        problem: state.plan_text(),
    };

    match gateway.complete_text(&prompt).await {
        Ok(text) => StateUpdate::default().answer(text),
        Err(e) => {
            log::error!("Error in explain_failure: {}", e);
            StateUpdate::default().answer(e.to_string())
        }
    }
}
