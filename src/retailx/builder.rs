// SPDX-License-Identifier: MIT

//! Wires settings into a ready-to-run workflow

use std::sync::Arc;

use crate::adk::error::Result;
use crate::adk::gateway::LlmGateway;
use crate::adk::model::openai::OpenAIModel;
use crate::adk::model::{GenerationConfig, Model};
use crate::retailx::config::{DatasetSettings, Settings};
use crate::retailx::data::{QueryExecutor, SqliteExecutor};
use crate::retailx::workflow::AnswerWorkflow;

pub struct Builder {
    settings: Settings,
}

impl Builder {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Model client for the configured endpoint
    pub fn build_model(&self) -> Result<Arc<dyn Model>> {
        let model = OpenAIModel::new(
            self.settings.model.clone(),
            self.settings.api_key.clone(),
            self.settings.base_url.as_str(),
            self.settings.timeout,
        )?;
        log::info!(
            "Using model {} at {}",
            model.model_name(),
            self.settings.base_url
        );
        Ok(Arc::new(model))
    }

    pub fn build_gateway(&self, model: Arc<dyn Model>) -> LlmGateway {
        let gateway = LlmGateway::new(model, self.settings.timeout);
        match self.settings.temperature {
            Some(temperature) => gateway.with_config(GenerationConfig {
                temperature: Some(temperature),
                ..Default::default()
            }),
            None => gateway,
        }
    }

    pub fn build_executor(&self) -> Result<SqliteExecutor> {
        open_dataset(&self.settings.dataset())
    }

    pub fn build_workflow(&self) -> Result<AnswerWorkflow> {
        let gateway = self.build_gateway(self.build_model()?);
        let executor: Arc<dyn QueryExecutor> = Arc::new(self.build_executor()?);
        Ok(AnswerWorkflow::new(gateway, executor))
    }
}

/// Executor over the configured database, or the bundled dataset
pub fn open_dataset(dataset: &DatasetSettings) -> Result<SqliteExecutor> {
    let executor = match &dataset.db_path {
        Some(path) => {
            log::info!("Using dataset at {}", path.display());
            SqliteExecutor::open(path)?
        }
        None => {
            log::info!("Using bundled sample dataset");
            SqliteExecutor::in_memory()?
        }
    };
    Ok(executor.with_row_cap(dataset.row_cap))
}
