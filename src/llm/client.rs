//! Core `ModelClient` trait and `OpenAiClient` implementation.
//!
//! `OpenAiClient` calls any OpenAI-compatible provider:
//! `/v1/chat/completions` for drafting and `/v1/audio/transcriptions` for
//! speech-to-text.  All connection details come from [`LlmConfig`] and
//! [`TranscriptionConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{LlmConfig, TranscriptionConfig};

/// Longest provider error body carried into an [`LlmError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Content type for audio parts whose declared type is absent or unparseable.
pub const OCTET_STREAM: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors raised by a model provider call.  None of them are retried.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No credential was configured; nothing was sent.
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("model request timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The HTTP response body was not the expected JSON envelope.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// The provider envelope carried no text content.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ModelClient trait
// ---------------------------------------------------------------------------

/// The two provider capabilities the backend depends on.
///
/// Implementors must be `Send + Sync` so a single instance can be shared by
/// every request handler (`Arc<dyn ModelClient>`).
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one chat completion and return the raw assistant text.
    async fn complete(&self, system: &str, user: &str, temperature: f32)
        -> Result<String, LlmError>;

    /// Transcribe an audio payload and return the provider's raw text.
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

/// Speaks the OpenAI REST wire format over `reqwest`.
///
/// The HTTP client is built once with the configured timeout and reused for
/// every call; the credential is resolved once, when the client is built.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: LlmConfig,
    transcription_model: String,
}

impl OpenAiClient {
    /// Build an `OpenAiClient` from application config.
    ///
    /// A default client is used as a last-resort fallback if the builder
    /// fails (TLS backend initialisation).
    pub fn from_config(llm: &LlmConfig, transcription: &TranscriptionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client ({e}); using defaults");
                reqwest::Client::new()
            });

        Self {
            client,
            config: llm.clone(),
            transcription_model: transcription.model.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(LlmError::MissingApiKey),
        }
    }

    /// Turn a response into JSON, surfacing non-2xx statuses with the
    /// provider's own message where one is present.
    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, LlmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                message: provider_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let key = self.api_key()?;

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user",   "content": user   }
            ],
            "stream":      false,
            "temperature": temperature,
            "max_tokens":  self.config.max_tokens
        });

        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let json = Self::read_json(response).await?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }

    async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<String, LlmError> {
        let key = self.api_key()?;

        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str(usable_content_type(content_type))?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .text("response_format", "json")
            .part("file", file_part);

        let response = self
            .client
            .post(self.endpoint("/v1/audio/transcriptions"))
            .bearer_auth(key)
            .multipart(form)
            .send()
            .await?;

        let json = Self::read_json(response).await?;

        // An inaudible clip legitimately transcribes to "" (or no field).
        Ok(json["text"].as_str().unwrap_or_default().to_string())
    }
}

/// The browser-declared content type if it parses as a MIME type,
/// otherwise [`OCTET_STREAM`].  The provider sniffs the audio itself.
fn usable_content_type(content_type: &str) -> &str {
    if reqwest::multipart::Part::text("").mime_str(content_type).is_ok() {
        content_type
    } else {
        log::warn!("Ignoring unparseable audio content type {content_type:?}");
        OCTET_STREAM
    }
}

/// Extract `error.message` from an OpenAI error body, falling back to the
/// (truncated) body itself.
fn provider_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    if let Some(message) = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str())
    {
        return message.to_string();
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
