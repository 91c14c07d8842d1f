// crates/survey-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Survey Gate Runtime
// Description: Decision engine, token lifecycle, and request orchestration.
// Purpose: Execute the access gate against external collaborators.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement attribute evaluation, participant token
//! issuance, and the request-scoped access gate. Every surface (HTTP, CLI,
//! tests) calls into the same [`AccessGate`] to keep outcomes consistent.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod gate;
pub mod link;
pub mod session;
pub mod store;
pub mod tokens;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::AccessDecisionEngine;
pub use gate::AccessGate;
pub use gate::AccessGateConfig;
pub use gate::GateRequest;
pub use gate::GateResponse;
pub use link::LinkError;
pub use link::SurveyLinkBuilder;
pub use session::BoundedIdentitySession;
pub use store::InMemoryParticipantTokenStore;
pub use store::InMemorySurveyDirectory;
pub use tokens::DEFAULT_MAX_CREATE_ATTEMPTS;
pub use tokens::DEFAULT_TOKEN_LENGTH;
pub use tokens::ParticipantTokenManager;
pub use tokens::RandomTokenGenerator;
pub use tokens::TokenDisposition;
pub use tokens::TokenError;
pub use tokens::TokenRequest;
pub use tokens::TokenResult;
