// crates/survey-gate-server/src/lib.rs
// ============================================================================
// Module: Survey Gate Server Library
// Description: HTTP forward-auth surface for the survey access gate.
// Purpose: Wire config, stores, sessions, and rendering around `AccessGate`.
// Dependencies: survey-gate-core, survey-gate-config, axum, tokio
// ============================================================================

//! ## Overview
//! `survey-gate-server` exposes the access gate to a reverse proxy. The proxy
//! forwards each survey request to `GET /gate/{survey_id}` together with the
//! identity headers it obtained from the identity provider, and acts on the
//! answer: 200 serves the survey, 302 follows `Location`, and 403 shows the
//! returned denial page.
//!
//! Security posture: identity headers are trusted only because the proxy
//! strips client-supplied copies; the gate fails closed on every error.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod directory;
pub mod render;
pub mod server;
pub mod session;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::SharedAuditSink;
pub use audit::StderrAuditSink;
pub use audit::build_audit_sink;
pub use directory::ConfigSurveyDirectory;
pub use render::HtmlDenialRenderer;
pub use server::GATE_OUTCOME_HEADER;
pub use server::ServerError;
pub use server::SurveyGateServer;
pub use session::HeaderIdentitySession;
pub use session::HeaderSessionReader;
pub use store::SharedTokenStore;
pub use store::build_token_store;
