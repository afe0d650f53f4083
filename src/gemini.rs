//! Gemini `generateContent` backend.
//!
//! Sends one prompt per request and classifies failures so the client's
//! retry loop can decide between backoff, rate-limit wait and giving up.

use crate::client::CompletionBackend;
use crate::config::{ApiConfig, seconds};
use crate::error::{RemoteError, TranslationError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Connect timeout, separate from the per-request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
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

/// Successful response from `generateContent`.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Classifies a non-success HTTP response.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> RemoteError {
    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.trim().to_string(), String::new()),
    };
    let description = if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, message)
    };

    let lower = message.to_lowercase();
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || api_status == "RESOURCE_EXHAUSTED"
        || lower.contains("quota")
        || lower.contains("rate limit")
        || lower.contains("resource exhausted");

    if rate_limited {
        RemoteError::RateLimited(description)
    } else if status.is_server_error() {
        RemoteError::Transient(description)
    } else {
        RemoteError::Fatal(description)
    }
}

/// Classifies a transport-level failure.
fn classify_transport(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::Transient(format!("request timed out: {}", error))
    } else if error.is_connect() || error.is_request() {
        RemoteError::Transient(format!("connection failed: {}", error))
    } else if error.is_body() || error.is_decode() {
        RemoteError::Transient(format!("failed to read response: {}", error))
    } else {
        RemoteError::Fatal(format!("request failed: {}", error))
    }
}

/// Client for the Gemini text generation endpoint.
pub struct GeminiBackend {
    /// HTTP client with per-attempt timeout.
    client: Client,
    /// Fully built `...:generateContent` URL.
    endpoint: Url,
    /// API key, sent as a header.
    api_key: String,
}

impl GeminiBackend {
    /// Create a new backend for the configured model.
    pub fn new(api_key: &str, config: &ApiConfig) -> Result<Self, TranslationError> {
        let timeout = seconds("api.request_timeout_sec", config.request_timeout_sec)
            .map_err(|e| TranslationError::InvalidConfig(e.to_string()))?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TranslationError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: Self::endpoint(&config.base_url, &config.model)?,
            api_key: api_key.to_string(),
        })
    }

    /// Builds `{base_url}/models/{model}:generateContent`.
    fn endpoint(base_url: &str, model: &str) -> Result<Url, TranslationError> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|url| url.join(&format!("models/{}:generateContent", model)))
            .map_err(|e| TranslationError::InvalidConfig(format!("invalid base URL: {}", e)))
    }
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, RemoteError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Fatal(format!("Failed to parse API response: {}", e)))?;

        let text = parsed.text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RemoteError::Transient("API returned empty response".to_string()));
        }

        Ok(trimmed.to_string())
    }
}
