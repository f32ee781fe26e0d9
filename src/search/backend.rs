use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::search::error::SearchError;
use crate::search::provider::Provider;

/// One provider's request/response contract: answer a text query given a key.
///
/// Implementations return the raw extracted text (possibly empty); mapping an
/// empty answer or an error to display text is the dispatcher's job.
#[async_trait]
pub trait Backend: Send + Sync {
    fn provider(&self) -> Provider;

    async fn answer(
        &self,
        client: &Client,
        query: &str,
        key: Option<&str>,
    ) -> Result<String, SearchError>;
}

/// Build the backend for an enabled provider. Disabled placeholders have none.
pub fn backend_for(provider: Provider, config: &Config) -> Option<Box<dyn Backend>> {
    let s = &config.search;
    match provider {
        Provider::OpenRouter => Some(Box::new(OpenRouterBackend {
            endpoint: config.endpoints.openrouter.clone(),
            model: config.models.openrouter.clone(),
            temperature: s.temperature,
            max_tokens: s.max_tokens,
            timeout: s.timeout(),
        })),
        Provider::Gemini => Some(Box::new(GeminiBackend {
            endpoint: config.endpoints.gemini.clone(),
            temperature: s.temperature,
            max_tokens: s.max_tokens,
            timeout: s.timeout(),
        })),
        Provider::Ollama => Some(Box::new(OllamaBackend {
            endpoint: config.endpoints.ollama.clone(),
            base_url: config.endpoints.ollama_base_url(),
            model: config.models.ollama.clone(),
            temperature: s.temperature,
            timeout: s.local_timeout(),
        })),
        Provider::ChatGpt | Provider::Claude => None,
    }
}

async fn send_checked(
    provider: Provider,
    req: RequestBuilder,
) -> Result<Response, SearchError> {
    let resp = req
        .send()
        .await
        .map_err(|e| SearchError::transport(provider, e))?;
    let status = resp.status();
    tracing::debug!(provider = provider.id(), status = %status, "provider responded");
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(provider = provider.id(), status = %status, "provider returned an error status");
    Err(SearchError::from_status(provider, status, &body))
}

fn require_key(provider: Provider, key: Option<&str>) -> Result<&str, SearchError> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(SearchError::MissingCredential { provider }),
    }
}

// ── OpenRouter ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenRouterBackend {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[async_trait]
impl Backend for OpenRouterBackend {
    fn provider(&self) -> Provider {
        Provider::OpenRouter
    }

    async fn answer(
        &self,
        client: &Client,
        query: &str,
        key: Option<&str>,
    ) -> Result<String, SearchError> {
        let provider = self.provider();
        let key = require_key(provider, key)?;
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: query }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let req = client
            .post(&self.endpoint)
            .bearer_auth(key)
            .timeout(self.timeout)
            .json(&body);
        let resp = send_checked(provider, req).await?;
        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::transport(provider, e))?;
        Ok(data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

// ── Gemini ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiBackend {
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[async_trait]
impl Backend for GeminiBackend {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn answer(
        &self,
        client: &Client,
        query: &str,
        key: Option<&str>,
    ) -> Result<String, SearchError> {
        let provider = self.provider();
        let key = require_key(provider, key)?;
        // The key travels in the query string; never log this URL.
        let url = reqwest::Url::parse_with_params(&self.endpoint, &[("key", key)]).map_err(|e| {
            SearchError::Unavailable {
                provider,
                reason: format!("bad endpoint URL: {e}"),
            }
        })?;
        let body = GenerateRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: query }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };
        let req = client.post(url).timeout(self.timeout).json(&body);
        let resp = send_checked(provider, req).await?;
        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::transport(provider, e))?;
        let parts: Vec<String> = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(parts.join("\n"))
    }
}

// ── Local daemon (Ollama) ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct LocalGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: LocalOptions,
}

#[derive(Debug, Serialize)]
struct LocalOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct LocalGenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaBackend {
    pub endpoint: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl OllamaBackend {
    fn unreachable(&self, reason: impl ToString) -> SearchError {
        SearchError::LocalUnavailable {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn provider(&self) -> Provider {
        Provider::Ollama
    }

    async fn answer(
        &self,
        client: &Client,
        query: &str,
        _key: Option<&str>,
    ) -> Result<String, SearchError> {
        let body = LocalGenerateRequest {
            model: &self.model,
            prompt: query,
            stream: false,
            options: LocalOptions { temperature: self.temperature },
        };
        let mut req = client.post(&self.endpoint).json(&body);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await.map_err(|e| self.unreachable(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.unreachable(format!("HTTP {status}")));
        }
        let data: LocalGenerateResponse = resp.json().await.map_err(|e| self.unreachable(e))?;
        Ok(data.response)
    }
}
