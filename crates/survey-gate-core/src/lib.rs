// crates/survey-gate-core/src/lib.rs
// ============================================================================
// Module: Survey Gate Core Library
// Description: Public API surface for the Survey Gate core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Survey Gate core decides whether a federated-identity visitor may enter a
//! survey and issues the participant access token that admits them. It is
//! backend-agnostic: identity sessions, survey configuration, token
//! persistence, page rendering, and audit logging all integrate through
//! explicit interfaces rather than being embedded in the engine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AdminContact;
pub use interfaces::AuditSink;
pub use interfaces::DenialCause;
pub use interfaces::DenialRenderer;
pub use interfaces::DenialView;
pub use interfaces::DirectoryError;
pub use interfaces::GeneratorError;
pub use interfaces::IdentitySession;
pub use interfaces::NoopAuditSink;
pub use interfaces::ParticipantTokenStore;
pub use interfaces::RenderError;
pub use interfaces::SessionError;
pub use interfaces::StoreError;
pub use interfaces::SurveyDirectory;
pub use interfaces::SurveyRecord;
pub use interfaces::TokenGenerator;
pub use runtime::AccessDecisionEngine;
pub use runtime::AccessGate;
pub use runtime::AccessGateConfig;
pub use runtime::BoundedIdentitySession;
pub use runtime::GateRequest;
pub use runtime::GateResponse;
pub use runtime::InMemoryParticipantTokenStore;
pub use runtime::InMemorySurveyDirectory;
pub use runtime::LinkError;
pub use runtime::ParticipantTokenManager;
pub use runtime::RandomTokenGenerator;
pub use runtime::SurveyLinkBuilder;
pub use runtime::TokenDisposition;
pub use runtime::TokenError;
pub use runtime::TokenRequest;
pub use runtime::TokenResult;
