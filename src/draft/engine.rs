//! Draft generation: validate, prompt, call the model, project the result.
//!
//! One [`DraftEngine`] is built at startup and shared by every request.  It
//! holds no per-request state; each call to [`DraftEngine::generate`] makes
//! exactly one completion call and either returns a fully populated
//! [`DraftResponse`] or an error.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::DraftingConfig;
use crate::draft::extract::{extract_json, MalformedModelOutput};
use crate::draft::prompt::PromptBuilder;
use crate::draft::request::{DraftRequest, DraftResponse, ValidationError};
use crate::llm::{LlmError, ModelClient};

/// Sampling temperature for every drafting call.
pub const DRAFT_TEMPERATURE: f32 = 0.0;

// ---------------------------------------------------------------------------
// DraftError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DraftError {
    /// The request is incomplete for its mode; the model was not called.
    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),

    /// The model answered, but not with a usable JSON object.
    #[error("model returned invalid JSON")]
    MalformedModelOutput { raw: String },

    /// The provider call itself failed.
    #[error(transparent)]
    Upstream(#[from] LlmError),
}

impl From<MalformedModelOutput> for DraftError {
    fn from(e: MalformedModelOutput) -> Self {
        DraftError::MalformedModelOutput { raw: e.raw }
    }
}

// ---------------------------------------------------------------------------
// DraftEngine
// ---------------------------------------------------------------------------

pub struct DraftEngine {
    client: Arc<dyn ModelClient>,
    prompt_builder: PromptBuilder,
    default_company: String,
    fallback_subject: String,
}

impl DraftEngine {
    pub fn new(client: Arc<dyn ModelClient>, config: &DraftingConfig) -> Self {
        Self {
            client,
            prompt_builder: PromptBuilder::new(config),
            default_company: config.default_company_name.clone(),
            fallback_subject: config.fallback_subject.clone(),
        }
    }

    /// Produce a reply draft for `request`.
    pub async fn generate(&self, request: DraftRequest) -> Result<DraftResponse, DraftError> {
        let job = request.into_job(&self.default_company)?;

        log::debug!(
            "Drafting (mode={:?}, context_len={}, instruction_len={})",
            job.mode().kind(),
            job.email_context().len(),
            job.instruction().len()
        );

        let (system_msg, user_msg) = self.prompt_builder.build_chat(&job);

        let raw = self
            .client
            .complete(&system_msg, &user_msg, DRAFT_TEMPERATURE)
            .await
            .map_err(|e| {
                log::warn!("Draft completion failed: {e}");
                e
            })?;

        let parsed = extract_json(&raw).map_err(|e| {
            log::warn!("Model output was not a JSON object (len={})", raw.len());
            e
        })?;

        project_response(&parsed, &self.fallback_subject).ok_or_else(|| {
            log::warn!("Model output had a non-string reply_draft (len={})", raw.len());
            DraftError::MalformedModelOutput { raw }
        })
    }
}

// ---------------------------------------------------------------------------
// Field projection
// ---------------------------------------------------------------------------

/// Map a parsed model object onto [`DraftResponse`], filling defaults.
///
/// * `subject_suggestion`: string if non-empty, else `fallback_subject`.
/// * `reply_draft`: string, or `""` when absent/null.  Any other shape
///   returns `None`: a draft body we cannot render is a failure, not a
///   default.
/// * list fields: see [`string_list`].
pub fn project_response(parsed: &Map<String, Value>, fallback_subject: &str) -> Option<DraftResponse> {
    let subject_suggestion = match parsed.get("subject_suggestion") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => fallback_subject.to_string(),
    };

    let reply_draft = match parsed.get("reply_draft") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return None,
    };

    Some(DraftResponse {
        subject_suggestion,
        reply_draft,
        assumptions: string_list(parsed.get("assumptions")),
        questions_to_confirm: string_list(parsed.get("questions_to_confirm")),
    })
}

/// Coerce a list-of-strings field.
///
/// Arrays keep their string items and render numbers/booleans as text;
/// nested arrays, objects and nulls inside are dropped.  A bare non-blank
/// string becomes a one-item list.  Anything else is empty.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::draft::request::{ModeKind, Tone};

    // -----------------------------------------------------------------------
    // Test double
    // -----------------------------------------------------------------------

    /// Returns a scripted completion and records what it was sent.
    struct ScriptedClient {
        reply: Result<String, fn() -> LlmError>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<(String, String, f32)>>,
    }

    impl ScriptedClient {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn failing(make: fn() -> LlmError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(make),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(
            &self,
            system: &str,
            user: &str,
            temperature: f32,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() =
                Some((system.to_string(), user.to_string(), temperature));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }

        async fn transcribe(&self, _: Vec<u8>, _: &str, _: &str) -> Result<String, LlmError> {
            unreachable!("drafting never transcribes")
        }
    }

    fn engine(client: Arc<ScriptedClient>) -> DraftEngine {
        DraftEngine::new(client, &DraftingConfig::default())
    }

    fn window_request() -> DraftRequest {
        DraftRequest {
            tone: Tone::Friendly,
            ..DraftRequest::new(
                "Customer complains window is stiff.",
                "Apologise and offer a service visit.",
            )
        }
    }

    // -----------------------------------------------------------------------
    // Engine
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn end_to_end_draft_returns_model_fields() {
        let reply = json!({
            "subject_suggestion": "Re: Stiff window",
            "reply_draft": "Dear customer, sorry to hear about the window.",
            "assumptions": ["The window is under warranty"],
            "questions_to_confirm": ["Which room is the window in?"]
        })
        .to_string();
        let client = ScriptedClient::ok(&reply);

        let response = engine(client.clone()).generate(window_request()).await.unwrap();

        assert_eq!(response.subject_suggestion, "Re: Stiff window");
        assert_eq!(response.reply_draft, "Dear customer, sorry to hear about the window.");
        assert_eq!(response.assumptions, vec!["The window is under warranty"]);
        assert_eq!(response.questions_to_confirm, vec!["Which room is the window in?"]);

        let (system, user, temperature) = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(system.contains("Return ONLY valid JSON"));
        assert!(user.contains("Customer complains window is stiff."));
        assert!(user.contains("Apologise and offer a service visit."));
        assert!(user.contains("Tone: friendly"));
        assert_eq!(temperature, 0.0);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn edit_without_selection_never_calls_model() {
        let client = ScriptedClient::ok("{}");
        let request = DraftRequest {
            mode: ModeKind::Edit,
            selected_text: None,
            current_draft: Some("Dear Sam, thanks.".into()),
            ..window_request()
        };

        let err = engine(client.clone()).generate(request).await.unwrap_err();

        assert!(matches!(
            err,
            DraftError::InvalidRequest(ValidationError::MissingSelectedText)
        ));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn edit_without_current_draft_never_calls_model() {
        let client = ScriptedClient::ok("{}");
        let request = DraftRequest {
            mode: ModeKind::Edit,
            selected_text: Some("thanks".into()),
            current_draft: None,
            ..window_request()
        };

        let err = engine(client.clone()).generate(request).await.unwrap_err();

        assert!(matches!(
            err,
            DraftError::InvalidRequest(ValidationError::MissingCurrentDraft)
        ));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn missing_fields_are_defaulted() {
        let client = ScriptedClient::ok(r#"{"reply_draft": "Hello"}"#);

        let response = engine(client).generate(window_request()).await.unwrap();

        assert_eq!(
            response,
            DraftResponse {
                subject_suggestion: "Re: Your email".into(),
                reply_draft: "Hello".into(),
                assumptions: vec![],
                questions_to_confirm: vec![],
            }
        );
    }

    #[tokio::test]
    async fn wrapped_output_is_recovered() {
        let client = ScriptedClient::ok(
            "Here you go:\n```json\n{\"subject_suggestion\": \"Re: Visit\", \"reply_draft\": \"Hi\"}\n```",
        );

        let response = engine(client).generate(window_request()).await.unwrap();
        assert_eq!(response.subject_suggestion, "Re: Visit");
        assert_eq!(response.reply_draft, "Hi");
    }

    #[tokio::test]
    async fn unparseable_output_surfaces_raw_text() {
        let client = ScriptedClient::ok("I'm sorry, I can't help with that.");

        let err = engine(client).generate(window_request()).await.unwrap_err();

        match err {
            DraftError::MalformedModelOutput { raw } => {
                assert_eq!(raw, "I'm sorry, I can't help with that.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_string_reply_draft_is_malformed() {
        let client = ScriptedClient::ok(r#"{"reply_draft": {"body": "Hi"}}"#);

        let err = engine(client).generate(window_request()).await.unwrap_err();
        assert!(matches!(err, DraftError::MalformedModelOutput { .. }));
    }

    #[tokio::test]
    async fn provider_failure_is_upstream_error() {
        let client = ScriptedClient::failing(|| LlmError::Timeout);

        let err = engine(client.clone()).generate(window_request()).await.unwrap_err();

        assert!(matches!(err, DraftError::Upstream(LlmError::Timeout)));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn configured_fallback_subject_is_used() {
        let client = ScriptedClient::ok(r#"{"subject_suggestion": ""}"#);
        let config = DraftingConfig {
            fallback_subject: "Re: Your enquiry".into(),
            ..DraftingConfig::default()
        };

        let response = DraftEngine::new(client, &config)
            .generate(window_request())
            .await
            .unwrap();
        assert_eq!(response.subject_suggestion, "Re: Your enquiry");
        assert_eq!(response.reply_draft, "");
    }

    // -----------------------------------------------------------------------
    // Projection
    // -----------------------------------------------------------------------

    fn project(value: Value) -> Option<DraftResponse> {
        match value {
            Value::Object(map) => project_response(&map, "Re: Your email"),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn null_fields_take_defaults() {
        let response = project(json!({
            "subject_suggestion": null,
            "reply_draft": null,
            "assumptions": null,
            "questions_to_confirm": null
        }))
        .unwrap();

        assert_eq!(response.subject_suggestion, "Re: Your email");
        assert_eq!(response.reply_draft, "");
        assert!(response.assumptions.is_empty());
        assert!(response.questions_to_confirm.is_empty());
    }

    #[test]
    fn list_fields_are_coerced_to_strings() {
        let response = project(json!({
            "reply_draft": "Hi",
            "assumptions": ["Installed 2019", 3, true, null, {"k": "v"}, ["nested"]],
            "questions_to_confirm": "Is Tuesday convenient?"
        }))
        .unwrap();

        assert_eq!(response.assumptions, vec!["Installed 2019", "3", "true"]);
        assert_eq!(response.questions_to_confirm, vec!["Is Tuesday convenient?"]);
    }

    #[test]
    fn object_list_field_becomes_empty() {
        let response = project(json!({"assumptions": {"a": 1}, "questions_to_confirm": ""})).unwrap();
        assert!(response.assumptions.is_empty());
        assert!(response.questions_to_confirm.is_empty());
    }

    #[test]
    fn non_string_subject_falls_back() {
        let response = project(json!({"subject_suggestion": 42})).unwrap();
        assert_eq!(response.subject_suggestion, "Re: Your email");
    }

    #[test]
    fn empty_subject_falls_back_but_whitespace_is_kept() {
        let response = project(json!({"subject_suggestion": ""})).unwrap();
        assert_eq!(response.subject_suggestion, "Re: Your email");

        let response = project(json!({"subject_suggestion": "  "})).unwrap();
        assert_eq!(response.subject_suggestion, "  ");
    }

    #[test]
    fn array_reply_draft_is_rejected() {
        assert!(project(json!({"reply_draft": ["Hi"]})).is_none());
    }
}
