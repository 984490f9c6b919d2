// SPDX-License-Identifier: MIT

//! Typed prompts for the question-answering workflow
//!
//! Each prompting step has its own parameter struct, so a missing slot is
//! a compile error rather than a runtime template failure.

use crate::adk::gateway::Prompt;

const PERSONA: &str = "You are a database reading bot that can answer users' questions using information from a database.";

fn user_message(question: &str) -> String {
    format!("Question: {}", question)
}

/// Decide whether the dataset can answer the question (structured mode)
pub struct AssessPrompt<'a> {
    pub data_description: &'a str,
    pub question: &'a str,
}

impl Prompt for AssessPrompt<'_> {
    fn name(&self) -> &'static str {
        "assess_answerability"
    }

    fn system(&self) -> String {
        format!(
            r#"{PERSONA}

{description}

Given the user's question, decide whether the question can be answered using the information in the database.

Return a JSON object with two keys, "reasoning" and "can_answer", and no preamble or explanation.
Examples of valid responses:

{{"reasoning": "I can find the average total spent by customers in California by averaging the Total_Spent column in the Retail table filtered by State = 'CA'", "can_answer": true}}
{{"reasoning": "I can find the total quantity of products sold in the Electronics category using the Quantity column in the Retail table filtered by Category = 'Electronics'", "can_answer": true}}
{{"reasoning": "I can't answer how many customers purchased products last year because the Retail table doesn't contain a year column", "can_answer": false}}"#,
            description = self.data_description.trim_end(),
        )
    }

    fn user(&self) -> String {
        user_message(self.question)
    }
}

/// Translate the question into SQL (plain-text mode)
pub struct ComposeQueryPrompt<'a> {
    pub data_description: &'a str,
    pub question: &'a str,
    pub plan: &'a str,
}

impl Prompt for ComposeQueryPrompt<'_> {
    fn name(&self) -> &'static str {
        "compose_query"
    }

    fn system(&self) -> String {
        format!(
            "{PERSONA}

{description}

In the previous step, you have prepared the following plan: {plan}

Return a single SQLite SELECT query with no preamble or explanation. Don't include any markdown characters or quotation marks around the query.",
            description = self.data_description.trim_end(),
            plan = self.plan,
        )
    }

    fn user(&self) -> String {
        user_message(self.question)
    }
}

/// Synthesize the answer from the query result (plain-text mode)
pub struct ComposeAnswerPrompt<'a> {
    pub question: &'a str,
    pub plan: &'a str,
    pub sql_query: &'a str,
    pub sql_result: &'a str,
}

impl Prompt for ComposeAnswerPrompt<'_> {
    fn name(&self) -> &'static str {
        "compose_answer"
    }

    fn system(&self) -> String {
        format!(
            "{PERSONA}

In the previous step, you have planned the query as follows: {plan},
generated the query {sql_query}
and retrieved the following data:
{sql_result}

Return a text answering the user's question using the provided data. If the data is an error message, explain what went wrong instead of inventing numbers.",
            plan = self.plan,
            sql_query = self.sql_query,
            sql_result = self.sql_result,
        )
    }

    fn user(&self) -> String {
        user_message(self.question)
    }
}

/// Explain why no answer is possible (plain-text mode)
pub struct ExplainFailurePrompt<'a> {
    pub question: &'a str,
    pub problem: &'a str,
}

impl Prompt for ExplainFailurePrompt<'_> {
    fn name(&self) -> &'static str {
        "explain_failure"
    }

    fn system(&self) -> String {
        format!(
            "{PERSONA}

You cannot answer the user's question because of the following problem: {problem}.

Explain the issue to the user and apologize for the inconvenience.",
            problem = self.problem,
        )
    }

    fn user(&self) -> String {
        user_message(self.question)
    }
}
