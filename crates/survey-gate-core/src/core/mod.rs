// crates/survey-gate-core/src/core/mod.rs
// ============================================================================
// Module: Survey Gate Core Types
// Description: Canonical catalog, requirement, identity, and token structures.
// Purpose: Provide stable, serializable types shared by every Survey Gate crate.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Survey Gate core types define the attribute catalog, per-survey
//! requirements, identity attribute snapshots, participant tokens, and access
//! decisions. These types are the canonical source of truth for the config,
//! store, and server crates.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod decision;
pub mod identifiers;
pub mod identity;
pub mod requirement;
pub mod token;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AccessAuditEvent;
pub use audit::AuditOutcome;
pub use audit::AuditReason;
pub use audit::subject_hash;
pub use catalog::AttributeCatalog;
pub use catalog::AttributeCatalogEntry;
pub use catalog::CatalogError;
pub use catalog::RawCatalogEntry;
pub use decision::AccessDecision;
pub use decision::DenialDiagnostics;
pub use decision::EmptyAttributesPolicy;
pub use identifiers::AccessToken;
pub use identifiers::AttributeKey;
pub use identifiers::SurveyId;
pub use identity::IdentityAttributes;
pub use identity::IdentityMapping;
pub use identity::ParticipantIdentity;
pub use requirement::EffectiveRequirements;
pub use requirement::NO_REQUIREMENT;
pub use requirement::RequiredValue;
pub use requirement::RequirementError;
pub use requirement::SurveyRequirement;
pub use token::EmailStatus;
pub use token::NewParticipantToken;
pub use token::ParticipantToken;
pub use token::SurveySchedule;
pub use token::TokenStatus;
