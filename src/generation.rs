//! Gemini `generateContent` client.

use crate::error::ComposeError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Prompt sent when checking whether a key is accepted
pub const KEY_CHECK_PROMPT: &str = "Test connection";

/// Where generation requests go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl GeminiConfig {
    /// Point the client at another host, e.g. a local stub
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Anything that can turn a prompt into a comment
#[async_trait]
pub trait CommentGenerator: Send + Sync {
    /// One request, no retry. Returns the trimmed generated text.
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, ComposeError>;

    /// Whether the service accepts `api_key`.
    ///
    /// Any success status counts, whatever the body holds. A non-success
    /// status means the key does not work; transport failures are errors.
    async fn verify_key(&self, api_key: &str) -> Result<bool, ComposeError> {
        match self.generate(KEY_CHECK_PROMPT, api_key).await {
            Ok(_) | Err(ComposeError::EmptyGeneration) | Err(ComposeError::Decode(_)) => Ok(true),
            Err(ComposeError::RequestFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// HTTP client for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(GeminiConfig::default())
    }
}

#[async_trait]
impl CommentGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, ComposeError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!("Gemini generateContent: model={}", self.config.model);

        let response = self
            .http
            .post(self.config.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ComposeError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)?;
        let text = parsed.into_text().ok_or(ComposeError::EmptyGeneration)?;
        Ok(text.trim().to_string())
    }
}
