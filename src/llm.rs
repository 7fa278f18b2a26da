//! Completion gateway: one request/response exchange with the configured
//! LLM provider. No retry, no streaming, no caching; timeouts are whatever
//! the HTTP client defaults to.

use anyhow::{Result, anyhow, bail};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{ConfigError, Provider, Settings};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GOOGLE_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Which of the two pre-built model profiles a completion should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    HtmlReduction,
    ActionGeneration,
}

/// Model identifier plus sampling knobs, fixed at startup from Settings.
#[derive(Debug, Clone)]
pub struct ModelProfile {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Text-completion capability behind the reducer and generator. A trait so
/// orchestration code can be exercised with a scripted backend in tests.
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, prompt: &str, purpose: Purpose) -> Result<String>;
}

/// Gateway over the hosted chat-completion APIs.
pub struct LlmClient {
    client: Client,
    provider: Provider,
    api_key: String,
    reduction: ModelProfile,
    generation: ModelProfile,
}

impl LlmClient {
    /// Build the client and both profiles. Fails fast when the selected
    /// provider has no credential configured; callers run this at startup
    /// so a bad configuration never serves traffic.
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let provider = settings.llm_provider;
        let api_key = settings
            .api_key(provider)
            .ok_or(ConfigError::MissingApiKey(provider))?
            .to_string();

        Ok(Self {
            client: Client::new(),
            provider,
            api_key,
            reduction: ModelProfile {
                model: settings.html_reduction_model.clone(),
                temperature: settings.html_reduction_temperature,
                max_tokens: settings.html_reduction_max_tokens,
            },
            generation: ModelProfile {
                model: settings.action_generation_model.clone(),
                temperature: settings.action_generation_temperature,
                max_tokens: settings.action_generation_max_tokens,
            },
        })
    }

    pub fn profile(&self, purpose: Purpose) -> &ModelProfile {
        match purpose {
            Purpose::HtmlReduction => &self.reduction,
            Purpose::ActionGeneration => &self.generation,
        }
    }

    /// Chat-completions exchange for OpenAI and for Google's
    /// OpenAI-compatible endpoint.
    async fn complete_chat(&self, base_url: &str, prompt: &str, profile: &ModelProfile) -> Result<String> {
        let response = self
            .client
            .post(format!("{base_url}/chat/completions"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": profile.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": profile.temperature,
                "max_tokens": profile.max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown API error");
            bail!("{} API error ({status}): {message}", self.provider);
        }

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no content in LLM response: {body}"))
    }

    async fn complete_anthropic(&self, prompt: &str, profile: &ModelProfile) -> Result<String> {
        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": profile.model,
                "max_tokens": profile.max_tokens,
                "temperature": profile.temperature,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown API error");
            bail!("anthropic API error ({status}): {message}");
        }

        body["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("no content in LLM response: {body}"))
    }
}

#[async_trait::async_trait]
impl CompletionGateway for LlmClient {
    async fn complete(&self, prompt: &str, purpose: Purpose) -> Result<String> {
        let profile = self.profile(purpose);
        debug!(
            "completion call provider={} model={} purpose={purpose:?} prompt_len={}",
            self.provider,
            profile.model,
            prompt.len()
        );

        match self.provider {
            Provider::OpenAi => self.complete_chat(OPENAI_BASE_URL, prompt, profile).await,
            Provider::Google => {
                self.complete_chat(GOOGLE_OPENAI_BASE_URL, prompt, profile)
                    .await
            }
            Provider::Anthropic => self.complete_anthropic(prompt, profile).await,
        }
    }
}
