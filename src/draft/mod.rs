//! Email reply drafting.
//!
//! This module provides:
//! * [`DraftRequest`] / [`DraftResponse`]: the wire contract.
//! * [`DraftJob`] / [`DraftMode`]: a validated request; edit-only fields
//!   live on the `Edit` variant.
//! * [`PromptBuilder`]: system framing, style controls and mode preambles.
//! * [`extract_json`]: strict-then-lenient JSON object parsing.
//! * [`DraftEngine`]: validate → prompt → complete → extract → project.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use robotalk::config::AppConfig;
//! use robotalk::draft::{DraftEngine, DraftRequest};
//! use robotalk::llm::OpenAiClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = Arc::new(OpenAiClient::from_config(&config.llm, &config.transcription));
//!     let engine = DraftEngine::new(client, &config.drafting);
//!
//!     let request = DraftRequest::new(
//!         "Customer complains window is stiff.",
//!         "Apologise and offer a service visit.",
//!     );
//!     let draft = engine.generate(request).await.unwrap();
//!     println!("{}\n\n{}", draft.subject_suggestion, draft.reply_draft);
//! }
//! ```

pub mod engine;
pub mod extract;
pub mod prompt;
pub mod request;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::{project_response, DraftEngine, DraftError, DRAFT_TEMPERATURE};
pub use extract::{extract_json, MalformedModelOutput};
pub use prompt::PromptBuilder;
pub use request::{
    Detail, DraftJob, DraftMode, DraftRequest, DraftResponse, EditTarget, Length, ModeKind,
    StyleControls, Tone, ValidationError,
};
