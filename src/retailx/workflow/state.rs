// SPDX-License-Identifier: MIT

//! Runtime state threaded through the workflow graph

use serde::{Deserialize, Serialize};

/// The single record a traversal accumulates
///
/// Created fresh per question and discarded once `answer` is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_answer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// Partial update returned by a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_answer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl WorkflowState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    /// Merge an update; only `Some` fields overwrite, nothing is cleared
    pub fn apply(&mut self, update: StateUpdate) {
        let StateUpdate {
            plan,
            can_answer,
            sql_query,
            sql_result,
            answer,
        } = update;

        if plan.is_some() {
            self.plan = plan;
        }
        if can_answer.is_some() {
            self.can_answer = can_answer;
        }
        if sql_query.is_some() {
            self.sql_query = sql_query;
        }
        if sql_result.is_some() {
            self.sql_result = sql_result;
        }
        if answer.is_some() {
            self.answer = answer;
        }
    }

    /// `plan` or an empty string
    pub fn plan_text(&self) -> &str {
        self.plan.as_deref().unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl StateUpdate {
    pub fn plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn can_answer(mut self, can_answer: bool) -> Self {
        self.can_answer = Some(can_answer);
        self
    }

    pub fn sql_query(mut self, sql_query: impl Into<String>) -> Self {
        self.sql_query = Some(sql_query.into());
        self
    }

    pub fn sql_result(mut self, sql_result: impl Into<String>) -> Self {
        self.sql_result = Some(sql_result.into());
        self
    }

    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
