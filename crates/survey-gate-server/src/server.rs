// crates/survey-gate-server/src/server.rs
// ============================================================================
// Module: Survey Gate HTTP Server
// Description: Forward-auth HTTP endpoint around the access gate.
// Purpose: Map gate outcomes to HTTP responses for a reverse proxy.
// Dependencies: survey-gate-core, survey-gate-config, axum, tokio
// ============================================================================

//! ## Overview
//! [`SurveyGateServer`] validates configuration, activates every enabled
//! survey, and serves `GET /gate/{survey_id}` plus `GET /healthz`. Gate
//! evaluation touches the token store and a bounded identity session, so it
//! runs on the blocking pool. Responses:
//!
//! - passthrough and proceed: 200 with the outcome in [`GATE_OUTCOME_HEADER`]
//! - login and survey redirects: 302 with `Location`
//! - denial: 403 with the rendered HTML page
//!
//! Start-up refuses to serve when any enabled survey fails activation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::LOCATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use serde::Deserialize;
use survey_gate_config::ActivationError;
use survey_gate_config::SurveyGateConfig;
use survey_gate_config::activate_enabled_surveys;
use survey_gate_core::AccessGate;
use survey_gate_core::AccessGateConfig;
use survey_gate_core::BoundedIdentitySession;
use survey_gate_core::GateRequest;
use survey_gate_core::GateResponse;
use survey_gate_core::ParticipantTokenManager;
use survey_gate_core::RandomTokenGenerator;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyLinkBuilder;
use thiserror::Error;
use url::Url;

use crate::audit::SharedAuditSink;
use crate::audit::build_audit_sink;
use crate::directory::ConfigSurveyDirectory;
use crate::render::HtmlDenialRenderer;
use crate::session::HeaderIdentitySession;
use crate::session::HeaderSessionReader;
use crate::store::SharedTokenStore;
use crate::store::build_token_store;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Response header carrying the gate outcome label on 200 responses.
pub const GATE_OUTCOME_HEADER: &str = "x-survey-gate-outcome";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Access gate wired to the server's backends.
type ServerGate = AccessGate<
    ConfigSurveyDirectory,
    SharedTokenStore,
    RandomTokenGenerator,
    HtmlDenialRenderer,
    SharedAuditSink,
>;

/// Shared state for request handlers.
struct GateState {
    /// Access gate.
    gate: ServerGate,
    /// Identity header reader.
    sessions: HeaderSessionReader,
    /// Survey link builder for default return addresses.
    links: SurveyLinkBuilder,
    /// Identity session time budget.
    session_timeout: Duration,
}

/// Query parameters accepted by the gate endpoint.
#[derive(Debug, Default, Deserialize)]
struct GateQuery {
    /// Token parameter carried by the survey request.
    token: Option<String>,
    /// Requested display language.
    lang: Option<String>,
    /// Address to return to after login.
    return_to: Option<String>,
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Survey gate HTTP server.
pub struct SurveyGateServer {
    /// Listener address.
    bind: SocketAddr,
    /// Maximum request body size.
    max_body_bytes: usize,
    /// Shared handler state.
    state: Arc<GateState>,
}

impl SurveyGateServer {
    /// Builds the server: opens the token store, activates every enabled
    /// survey, and wires the gate.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid, a backend cannot
    /// be opened, or a survey fails activation.
    pub fn from_config(config: &SurveyGateConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let links =
            config.server.link_builder().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = build_token_store(&config.token_store)?;
        activate_enabled_surveys(config, &store)?;
        let audit = build_audit_sink(&config.audit)
            .map_err(|err| ServerError::Init(format!("audit sink: {err}")))?;
        let tokens = ParticipantTokenManager::new(
            store,
            RandomTokenGenerator::new(config.tokens.length),
        )
        .with_max_create_attempts(config.tokens.max_create_attempts);
        let gate = AccessGate::new(
            AccessGateConfig {
                mapping: config.identity.mapping.clone(),
                empty_attributes: config.identity.empty_attributes,
            },
            ConfigSurveyDirectory::from_config(config),
            tokens,
            links.clone(),
            HtmlDenialRenderer::default(),
            audit,
        );
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            state: Arc::new(GateState {
                gate,
                sessions: HeaderSessionReader::from_config(config),
                links,
                session_timeout: config.identity.timeout(),
            }),
        })
    }

    /// Returns the configured listener address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Returns the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/gate/{survey_id}", get(handle_gate))
            .route("/healthz", get(handle_health))
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .with_state(Arc::clone(&self.state))
    }

    /// Binds the configured address and serves until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        self.serve_on(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when serving fails.
    pub async fn serve_on(self, listener: tokio::net::TcpListener) -> Result<(), ServerError> {
        axum::serve(listener, self.router())
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles one forward-auth gate request.
async fn handle_gate(
    State(state): State<Arc<GateState>>,
    Path(survey_id): Path<String>,
    Query(query): Query<GateQuery>,
    headers: HeaderMap,
) -> Response {
    let survey_id = SurveyId::new(survey_id);
    let return_to = state.return_to(&survey_id, &query);
    let fallback = state.sessions.login_url(&return_to);
    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || {
        worker.evaluate(survey_id, query, &headers, &return_to)
    })
    .await;
    match outcome {
        Ok(response) => gate_response(response),
        Err(_) => redirect(fallback),
    }
}

/// Liveness check.
async fn handle_health() -> &'static str {
    "ok"
}

impl GateState {
    /// Runs the gate for one request.
    fn evaluate(
        &self,
        survey_id: SurveyId,
        query: GateQuery,
        headers: &HeaderMap,
        return_to: &str,
    ) -> GateResponse {
        let session = BoundedIdentitySession::new(
            HeaderIdentitySession::from_headers(headers, &self.sessions, return_to),
            self.session_timeout,
        );
        let mut request = GateRequest::new(survey_id);
        if let Some(lang) = query.lang {
            request = request.with_language(lang);
        }
        if let Some(token) = query.token {
            request = request.with_token(token);
        }
        self.gate.handle(&request, &session)
    }

    /// Resolves the post-login return address.
    ///
    /// An explicit `return_to` is honored only when it shares the survey URL's
    /// origin (scheme, host, port); otherwise the survey entry URL is used.
    fn return_to(&self, survey_id: &SurveyId, query: &GateQuery) -> String {
        let Ok(mut survey_url) = self.links.survey_url(survey_id) else {
            return String::from("/");
        };
        if let Some(explicit) = query.return_to.as_deref()
            && let Ok(url) = Url::parse(explicit)
            && url.origin() == survey_url.origin()
        {
            return url.into();
        }
        if let Some(lang) = query.lang.as_deref().filter(|lang| !lang.trim().is_empty()) {
            survey_url.query_pairs_mut().append_pair("lang", lang.trim());
        }
        survey_url.into()
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Maps a gate outcome to an HTTP response.
fn gate_response(response: GateResponse) -> Response {
    match response {
        GateResponse::Passthrough => outcome(StatusCode::OK, "passthrough"),
        GateResponse::Proceed => outcome(StatusCode::OK, "proceed"),
        GateResponse::RedirectToLogin {
            url,
        }
        | GateResponse::RedirectToSurvey {
            url, ..
        } => redirect(url),
        GateResponse::Denied {
            content, ..
        } => (
            StatusCode::FORBIDDEN,
            [(CONTENT_TYPE, "text/html; charset=utf-8"), (CACHE_CONTROL, "no-store")],
            content,
        )
            .into_response(),
    }
}

/// Builds a 200 response labeled with the gate outcome.
fn outcome(status: StatusCode, label: &'static str) -> Response {
    (status, [(GATE_OUTCOME_HEADER, label)]).into_response()
}

/// Builds a non-cacheable 302 redirect.
fn redirect(location: String) -> Response {
    (StatusCode::FOUND, [(LOCATION, location), (CACHE_CONTROL, String::from("no-store"))])
        .into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server construction and transport errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Survey activation failed.
    #[error("activation error: {0}")]
    Activation(#[from] ActivationError),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
