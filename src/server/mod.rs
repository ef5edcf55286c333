//! HTTP surface.
//!
//! ```text
//! POST /draft         JSON DraftRequest      → DraftResponse   (auth)
//! POST /draft_form    form DraftRequest      → DraftResponse   (auth)
//! POST /transcribe    multipart `audio`      → Transcript      (auth)
//! GET  /health                               → {ok, name}
//! GET  /debug/routes                         → [path, ...]
//! ```
//!
//! Handlers share one [`AppState`]; nothing in it is mutable, so requests
//! never contend with each other.

pub mod auth;
pub mod error;

use std::any::Any;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::AppConfig;
use crate::draft::{DraftEngine, DraftRequest, DraftResponse};
use crate::llm::{ModelClient, OpenAiClient};
use crate::normalize::Normalizer;
use crate::transcribe::{Transcriber, Transcript};

pub use auth::{Authenticator, Principal, TokenAuthenticator};
pub use error::{ApiError, ErrorBody};

/// Every routed path, as reported by `GET /debug/routes`.
pub const ROUTES: &[&str] = &["/debug/routes", "/draft", "/draft_form", "/health", "/transcribe"];

/// Multipart field carrying the audio clip.
const AUDIO_FIELD: &str = "audio";

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DraftEngine>,
    pub transcriber: Arc<Transcriber>,
    pub authenticator: Arc<dyn Authenticator>,
    pub service_name: Arc<str>,
}

impl AppState {
    /// Wire the engine and adapter around one shared model client.
    pub fn new(
        config: &AppConfig,
        client: Arc<dyn ModelClient>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let normalizer = Normalizer::with_extra_rules(config.normalization.extra_rules.clone());

        Self {
            engine: Arc::new(DraftEngine::new(Arc::clone(&client), &config.drafting)),
            transcriber: Arc::new(Transcriber::new(client, normalizer)),
            authenticator,
            service_name: Arc::from(config.server.service_name.as_str()),
        }
    }

    /// Production wiring: OpenAI client and token authenticator from config.
    pub fn from_config(config: &AppConfig) -> Self {
        let client: Arc<dyn ModelClient> =
            Arc::new(OpenAiClient::from_config(&config.llm, &config.transcription));
        let authenticator: Arc<dyn Authenticator> =
            Arc::new(TokenAuthenticator::from_config(&config.auth));
        Self::new(config, client, authenticator)
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/debug/routes", get(debug_routes))
        .route("/draft", post(draft))
        .route("/draft_form", post(draft_form))
        .route("/transcribe", post(transcribe))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // Inside `log_failures`, so a panic still reaches the route logger
        // as a 500.
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn(log_failures))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    if config.llm.api_key.is_none() {
        log::warn!("OPENAI_API_KEY is not set; drafting and transcription will return 503");
    }
    if config.auth.required && config.auth.tokens.is_empty() {
        log::warn!("auth.required is set but no tokens are configured; protected routes will reject every request");
    }

    let state = AppState::from_config(&config);
    let app = router(state, config.transcription.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    log::info!("{} listening on {}", config.server.service_name, listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

/// Log every server-side failure with the route that produced it.
async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    if let Some(level) = failure_level(status) {
        let verb = if status.is_server_error() { "failed" } else { "rejected" };
        log::log!(level, "{method} {path} {verb} with {status}");
    }
    response
}

fn failure_level(status: StatusCode) -> Option<log::Level> {
    if status.is_server_error() {
        Some(log::Level::Error)
    } else if status.is_client_error() {
        Some(log::Level::Debug)
    } else {
        None
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".into());
    ApiError::Internal(format!("handler panicked: {message}")).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "name": &*state.service_name }))
}

async fn debug_routes() -> Json<Vec<&'static str>> {
    let mut routes = ROUTES.to_vec();
    routes.sort_unstable();
    Json(routes)
}

async fn draft(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<DraftRequest>, JsonRejection>,
) -> Result<Json<DraftResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
    log::info!("Draft requested by {} (mode={:?})", principal.subject, request.mode);
    Ok(Json(state.engine.generate(request).await?))
}

async fn draft_form(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Form<DraftRequest>, FormRejection>,
) -> Result<Json<DraftResponse>, ApiError> {
    let Form(request) = payload.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;
    log::info!("Form draft requested by {} (mode={:?})", principal.subject, request.mode);
    Ok(Json(state.engine.generate(request).await?))
}

async fn transcribe(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Transcript>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let audio = field
            .bytes()
            .await
            .map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

        log::info!("Transcription requested by {} ({} bytes)", principal.subject, audio.len());

        let transcript = state
            .transcriber
            .transcribe(audio.to_vec(), filename.as_deref(), content_type.as_deref())
            .await?;
        return Ok(Json(transcript));
    }

    Err(ApiError::rejected(
        StatusCode::BAD_REQUEST,
        format!("missing multipart file field '{AUDIO_FIELD}'"),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
