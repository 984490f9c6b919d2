// SPDX-License-Identifier: MIT

//! Typed error handling for retailx-rs
//!
//! Every fallible layer has its own enum; the workflow nodes turn any of
//! them into text with `Display`, so none of these ever reaches the caller
//! of the question-answering workflow.

use thiserror::Error;

/// Top-level error type for retailx-rs
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Configuration errors (missing env vars, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised by the LLM gateway or a model client
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Errors raised by the query executor
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// SQLite errors outside of query execution (opening, seeding)
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-success status from the model endpoint
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The call did not finish within the configured bound
    #[error("Model call timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// Transport-level failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Invalid response from model (no choices, empty text)
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// Structured output was not JSON at all
    #[error("Model output is not valid JSON: {0}")]
    MalformedJson(String),

    /// Structured output was JSON, but not the requested shape
    #[error("Model output has unexpected shape: {0}")]
    UnexpectedShape(String),
}

impl ModelError {
    /// True for the two structured-mode decode failures
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::MalformedJson(_) | Self::UnexpectedShape(_))
    }
}

/// Query executor errors
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query failed the read-only guardrail
    #[error("Query rejected: {0}")]
    Rejected(String),

    /// SQLite could not prepare, run, or decode the query
    #[error("SQL error: {0}")]
    Sql(String),

    /// The query ran but matched nothing
    #[error("Query returned no rows")]
    EmptyResult,
}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sql(err.to_string())
    }
}

impl AssistantError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;
