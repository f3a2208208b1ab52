use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::settings::ServerSettings;
use crate::engine::errors::ProviderError;
use crate::model::llm_decode::{decode_generated_text, decode_model_count};

/// Sampling configuration for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// The external text-generation call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, config: GenerationConfig)
        -> Result<String, ProviderError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfigBody,
}

#[derive(Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<TextPart>,
}

#[derive(Serialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfigBody {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfigBody {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        }
    }
}

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ProviderError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey)?;

        Self::new(
            settings.provider_base_url.clone(),
            settings.model.clone(),
            api_key,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Lists the models visible to the key; used to verify credentials.
    pub async fn check_connection(&self) -> Result<String, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let body = read_success_body(resp).await?;
        let count = decode_model_count(&body)?;

        Ok(format!("Connected ({} models available)", count))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<String, ProviderError> {
        let req = GenerateContentRequest::new(prompt, config);

        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            max_output_tokens = config.max_output_tokens,
            "calling generateContent"
        );

        let resp = self
            .http
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;

        let body = read_success_body(resp).await?;
        decode_generated_text(&body)
    }
}

async fn read_success_body(resp: reqwest::Response) -> Result<String, ProviderError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}
