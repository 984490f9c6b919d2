// SPDX-License-Identifier: MIT

//! Process-wide settings, resolved once at startup from the environment

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::adk::error::{AssistantError, Result};
use crate::retailx::data::executor::DEFAULT_ROW_CAP;

pub const DEFAULT_BASE_URL: &str = "https://api.llama-api.com";
pub const DEFAULT_MODEL: &str = "llama3-70b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the model endpoint and the dataset
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub db_path: Option<PathBuf>,
    pub row_cap: usize,
}

/// Dataset settings; unlike [`Settings`] these need no model credentials
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSettings {
    pub db_path: Option<PathBuf>,
    pub row_cap: usize,
}

impl DatasetSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(&lookup, key);

        let row_cap = match get("QUERY_ROW_CAP") {
            Some(v) => parse_number::<usize>("QUERY_ROW_CAP", &v)?,
            None => DEFAULT_ROW_CAP,
        };

        Ok(Self {
            db_path: get("RETAIL_DB_PATH").map(PathBuf::from),
            row_cap,
        })
    }
}

impl Settings {
    /// Read settings from the process environment
    ///
    /// Requires `LLM_API_KEY` (or the older `LLAMA_API`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(&lookup, key);

        let api_key = get("LLM_API_KEY")
            .or_else(|| get("LLAMA_API"))
            .ok_or_else(|| AssistantError::config("LLM_API_KEY must be set"))?;

        let base_url = get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| {
            AssistantError::config(format!("LLM_BASE_URL '{}' is invalid: {}", base_url, e))
        })?;

        let timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(v) => parse_number::<u64>("LLM_TIMEOUT_SECS", &v)?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(AssistantError::config("LLM_TIMEOUT_SECS must be positive"));
        }

        let temperature = get("LLM_TEMPERATURE")
            .map(|v| parse_number::<f32>("LLM_TEMPERATURE", &v))
            .transpose()?;

        let dataset = DatasetSettings::from_lookup(&lookup)?;

        Ok(Self {
            api_key,
            base_url,
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            temperature,
            db_path: dataset.db_path,
            row_cap: dataset.row_cap,
        })
    }

    pub fn dataset(&self) -> DatasetSettings {
        DatasetSettings {
            db_path: self.db_path.clone(),
            row_cap: self.row_cap,
        }
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AssistantError::config(format!("{} must be a number, got '{}'", key, value)))
}
