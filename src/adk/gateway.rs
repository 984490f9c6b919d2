// SPDX-License-Identifier: MIT

//! LLM gateway - one bounded call per prompt, two output modes
//!
//! - [`LlmGateway::complete_text`] returns the model's text, trimmed but
//!   otherwise untouched
//! - [`LlmGateway::complete_structured`] decodes a single JSON object into
//!   a typed value, reporting non-JSON and wrong-shape output separately
//!
//! Calls are attempted exactly once. Callers decide what a failure means.

use crate::adk::error::ModelError;
use crate::adk::model::{Content, GenerationConfig, Model};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// A fully typed prompt, rendered into a system and a user message
pub trait Prompt: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Instruction text sent as the system message
    fn system(&self) -> String;

    /// Text sent as the user message
    fn user(&self) -> String;

    fn to_history(&self) -> Vec<Content> {
        vec![Content::system(self.system()), Content::user(self.user())]
    }
}

/// Capability wrapper around a hosted model
#[derive(Clone)]
pub struct LlmGateway {
    model: Arc<dyn Model>,
    timeout: Duration,
    config: Option<GenerationConfig>,
}

impl LlmGateway {
    pub fn new(model: Arc<dyn Model>, timeout: Duration) -> Self {
        Self {
            model,
            timeout,
            config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Plain-text mode
    pub async fn complete_text(&self, prompt: &dyn Prompt) -> Result<String, ModelError> {
        let history = prompt.to_history();
        let call = self.model.generate_content(&history, self.config.as_ref());

        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ModelError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        let text = response.text().trim().to_string();
        if text.is_empty() {
            return Err(ModelError::InvalidResponse(format!(
                "empty completion for prompt '{}'",
                prompt.name()
            )));
        }

        log::debug!(
            "Prompt {} completed (length: {}, preview: '{}')",
            prompt.name(),
            text.len(),
            preview(&text, 100)
        );
        Ok(text)
    }

    /// Structured mode: the output must be exactly one JSON value of type `T`
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        prompt: &dyn Prompt,
    ) -> Result<T, ModelError> {
        let text = self.complete_text(prompt).await?;
        decode_structured(&text)
    }
}

/// Strict two-stage decode: JSON syntax first, then shape
pub fn decode_structured<T: DeserializeOwned>(text: &str) -> Result<T, ModelError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(text.trim()))
        .map_err(|e| ModelError::MalformedJson(format!("{} in '{}'", e, preview(text, 200))))?;

    serde_json::from_value(value).map_err(|e| ModelError::UnexpectedShape(e.to_string()))
}

/// Info strings a model puts after an opening fence
const FENCE_LANGUAGE_TAGS: &[&str] = &["sql", "sqlite", "json", "text", "plaintext", "txt"];

/// Remove one markdown code fence enclosing the whole text, if present
pub fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.trim_end().strip_suffix("```") else {
        return text;
    };

    // The opening line is dropped only when it is a language tag
    match body.split_once('\n') {
        Some((info, code)) if is_fence_language_tag(info) => code.trim(),
        _ => body.trim(),
    }
}

fn is_fence_language_tag(info: &str) -> bool {
    let info = info.trim();
    info.is_empty()
        || FENCE_LANGUAGE_TAGS
            .iter()
            .any(|tag| info.eq_ignore_ascii_case(tag))
}

/// Clean a generated query of the wrapping models like to add
pub fn strip_query_quoting(text: &str) -> String {
    let mut query = strip_code_fence(text.trim()).trim();

    for label in ["SQL:", "sql:", "Query:", "query:"] {
        if let Some(rest) = query.strip_prefix(label) {
            query = rest.trim_start();
        }
    }

    for quote in ['`', '"', '\''] {
        if query.len() >= 2 && query.starts_with(quote) && query.ends_with(quote) {
            query = query[1..query.len() - 1].trim();
        }
    }

    query.to_string()
}

fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
