//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::{Candidate, ContentGenerator, ContentPart, GenerationResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// `None` or empty makes every call fail with [`ProviderError::NotConfigured`].
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// HTTP client for the Gemini REST API.
///
/// No request timeout is set: a provider that never answers leaves the call
/// pending.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, ProviderError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::NotConfigured)?;

        let body = WireRequest {
            contents: vec![WireContentOut {
                parts: vec![WirePartOut { text: prompt }],
            }],
            generation_config: WireGenerationConfig {
                temperature: self.config.temperature,
            },
        };

        debug!(model = %self.config.model, "calling generateContent");
        let res = self
            .http
            .post(self.endpoint())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&message),
            });
        }

        let wire: WireResponse = res
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.without_url().to_string()))?;
        Ok(wire.into())
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContentOut<'a>>,
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct WireContentOut<'a> {
    parts: Vec<WirePartOut<'a>>,
}

#[derive(Serialize)]
struct WirePartOut<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct WireGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WirePart {
    text: Option<String>,
}

impl From<WireResponse> for GenerationResponse {
    fn from(wire: WireResponse) -> Self {
        GenerationResponse {
            candidates: wire
                .candidates
                .into_iter()
                .map(|c| Candidate {
                    parts: c
                        .content
                        .map(|content| {
                            content
                                .parts
                                .into_iter()
                                .map(|p| match p.text {
                                    Some(t) => ContentPart::Text(t),
                                    None => ContentPart::Other,
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}
