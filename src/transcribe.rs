//! Speech-to-text adapter.
//!
//! [`Transcriber`] forwards an uploaded clip to the provider, then runs the
//! returned text through the [`Normalizer`].  Both the raw and the cleaned
//! text are returned so the client can show what was corrected.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::llm::{LlmError, ModelClient};
use crate::normalize::{Change, Normalizer};

/// Content type sent when the upload did not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = crate::llm::client::OCTET_STREAM;

/// Filename sent when the upload did not declare one.
pub const DEFAULT_FILENAME: &str = "audio";

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("audio payload is empty")]
    EmptyPayload,

    #[error("transcription failed: {0}")]
    Provider(#[from] LlmError),
}

/// Response body of `POST /transcribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    /// Normalised text.
    pub text: String,
    /// Provider output before normalisation.
    pub raw_text: String,
    pub normalization_changes: Vec<Change>,
}

pub struct Transcriber {
    client: Arc<dyn ModelClient>,
    normalizer: Normalizer,
}

impl Transcriber {
    pub fn new(client: Arc<dyn ModelClient>, normalizer: Normalizer) -> Self {
        Self { client, normalizer }
    }

    /// Transcribe `audio` and normalise the result.
    ///
    /// `filename` and `content_type` fall back to [`DEFAULT_FILENAME`] and
    /// [`DEFAULT_CONTENT_TYPE`] when absent or blank.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<Transcript, TranscribeError> {
        if audio.is_empty() {
            return Err(TranscribeError::EmptyPayload);
        }

        let filename = filename.filter(|f| !f.trim().is_empty()).unwrap_or(DEFAULT_FILENAME);
        let content_type = content_type
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        log::debug!(
            "Transcribing {} bytes ({filename}, {content_type})",
            audio.len()
        );

        let raw_text = self
            .client
            .transcribe(audio, filename, content_type)
            .await
            .map_err(|e| {
                log::warn!("Transcription call failed: {e}");
                e
            })?;

        let normalized = self.normalizer.normalize(&raw_text);
        if !normalized.changes.is_empty() {
            log::info!("Transcript normalised ({} rule(s) applied)", normalized.changes.len());
        }

        Ok(Transcript {
            text: normalized.clean_text,
            raw_text,
            normalization_changes: normalized.changes,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
