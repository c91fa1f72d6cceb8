use anyhow::{ensure, Context, Result};
use async_openai::{config::OpenAIConfig, types::CreateCompletionRequestArgs, Client};
use tracing::{debug, info};

use super::{strip_prompt, DeviceSet, Generator};
use crate::types::GenerationParams;

/// Where the critique model is served and how it is placed.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Checkpoint path; also the model id the server registered it under.
    pub model_path: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub devices: DeviceSet,
}

/// Generator backed by an OpenAI-compatible `/completions` endpoint
/// (vLLM, TGI and friends), which keeps the raw chat template intact.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
    devices: DeviceSet,
}

impl CompletionClient {
    pub fn new(cfg: ModelConfig) -> Self {
        let mut oai = OpenAIConfig::default().with_api_base(cfg.base_url);
        if let Some(key) = cfg.api_key { oai = oai.with_api_key(key); }
        Self { client: Client::with_config(oai), model: cfg.model_path, devices: cfg.devices }
    }

    /// Build the client and confirm the server actually hosts the model.
    pub async fn load(cfg: ModelConfig) -> Result<Self> {
        let this = Self::new(cfg);
        let served = this.client.models().retrieve(&this.model).await
            .with_context(|| format!("model `{}` is not available on the inference server", this.model))?;
        info!(model = %served.id, devices = %this.devices, "critique model loaded");
        Ok(this)
    }

    pub fn devices(&self) -> &DeviceSet {
        &self.devices
    }
}

#[async_trait::async_trait]
impl Generator for CompletionClient {
    async fn generate(&self, prompts: &[String], params: &GenerationParams) -> Result<Vec<String>> {
        if prompts.is_empty() {
            return Ok(Vec::new());
        }
        let req = CreateCompletionRequestArgs::default()
            .model(self.model.clone())
            .prompt(prompts.to_vec())
            .max_tokens(params.max_new_tokens)
            .temperature(params.temperature)
            .build()?;
        let resp = self.client.completions().create(req).await
            .context("completion request failed")?;
        debug!(choices = resp.choices.len(), "completion batch returned");

        let mut choices = resp.choices;
        ensure!(
            choices.len() == prompts.len(),
            "server returned {} completions for {} prompts", choices.len(), prompts.len()
        );
        choices.sort_by_key(|c| c.index);
        Ok(choices.into_iter()
            .zip(prompts)
            .map(|(c, p)| strip_prompt(p, &c.text))
            .collect())
    }
}
