// crates/survey-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Survey Gate Interfaces
// Description: Backend-agnostic interfaces for sessions, stores, and rendering.
// Purpose: Define the contract surfaces used by the Survey Gate runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Survey Gate integrates with its external
//! collaborators: the identity session, the survey configuration directory,
//! the participant token store, the token generator, the denial page
//! renderer, and the audit pipeline. Implementations must fail closed: a
//! session that cannot answer is treated as unauthenticated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::AccessAuditEvent;
use crate::core::AccessToken;
use crate::core::AttributeKey;
use crate::core::IdentityAttributes;
use crate::core::NewParticipantToken;
use crate::core::ParticipantToken;
use crate::core::SurveyId;
use crate::core::SurveyRequirement;
use crate::core::SurveySchedule;

// ============================================================================
// SECTION: Identity Session
// ============================================================================

/// Identity session errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session call exceeded its time budget.
    #[error("identity session timed out")]
    Timeout,
    /// The session backend failed.
    #[error("identity session unavailable: {0}")]
    Unavailable(String),
}

/// External identity session established with an identity provider.
pub trait IdentitySession {
    /// Returns whether the visitor holds an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the session cannot be queried.
    fn is_authenticated(&self) -> Result<bool, SessionError>;

    /// Returns the attributes the provider vouched for.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the attributes cannot be read.
    fn attributes(&self) -> Result<IdentityAttributes, SessionError>;

    /// Returns the URL that starts an identity provider login.
    fn login_url(&self) -> String;
}

impl<T: IdentitySession + ?Sized> IdentitySession for Arc<T> {
    fn is_authenticated(&self) -> Result<bool, SessionError> {
        (**self).is_authenticated()
    }

    fn attributes(&self) -> Result<IdentityAttributes, SessionError> {
        (**self).attributes()
    }

    fn login_url(&self) -> String {
        (**self).login_url()
    }
}

// ============================================================================
// SECTION: Survey Directory
// ============================================================================

/// Survey administrator contact shown on the denial page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminContact {
    /// Administrator display name.
    pub name: String,
    /// Administrator email.
    pub email: String,
}

/// Survey configuration needed by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyRecord {
    /// Access requirement and enablement flag.
    pub requirement: SurveyRequirement,
    /// Survey validity window.
    pub schedule: SurveySchedule,
    /// Administrator contact.
    pub admin: AdminContact,
    /// Default survey language.
    pub language: String,
}

/// Survey directory errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Directory backend failed.
    #[error("survey directory error: {0}")]
    Backend(String),
}

/// Read access to survey configuration.
pub trait SurveyDirectory {
    /// Returns the gate configuration for a survey, if it has one.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the lookup fails.
    fn survey(&self, survey_id: &SurveyId) -> Result<Option<SurveyRecord>, DirectoryError>;
}

impl<T: SurveyDirectory + ?Sized> SurveyDirectory for Arc<T> {
    fn survey(&self, survey_id: &SurveyId) -> Result<Option<SurveyRecord>, DirectoryError> {
        (**self).survey(survey_id)
    }
}

// ============================================================================
// SECTION: Participant Token Store
// ============================================================================

/// Participant token store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A token already exists for the `(survey, email)` pair.
    #[error("participant token already exists for survey {survey_id}")]
    Conflict {
        /// Survey identifier.
        survey_id: String,
    },
    /// The generated token string is already in use.
    #[error("access token collision for survey {survey_id}")]
    TokenCollision {
        /// Survey identifier.
        survey_id: String,
    },
    /// The survey has no prepared token storage.
    #[error("no token storage prepared for survey {0}")]
    MissingSurvey(String),
    /// Store I/O error.
    #[error("participant token store io error: {0}")]
    Io(String),
    /// Store data is corrupt.
    #[error("participant token store corruption: {0}")]
    Corrupt(String),
    /// Store version mismatch.
    #[error("participant token store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("participant token store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("participant token store error: {0}")]
    Store(String),
}

/// Durable participant token storage keyed by `(survey, email)`.
///
/// # Invariants
/// - At most one record exists per `(survey_id, email)`; the store enforces
///   this itself, so concurrent inserts collapse to one winner.
/// - Token strings are unique within a survey.
pub trait ParticipantTokenStore {
    /// Prepares token storage for a survey; idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when preparation fails.
    fn ensure_survey(&self, survey_id: &SurveyId) -> Result<(), StoreError>;

    /// Finds the token for a survey and email (exact match).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find(&self, survey_id: &SurveyId, email: &str)
    -> Result<Option<ParticipantToken>, StoreError>;

    /// Inserts a new token atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a token already exists for the
    /// pair, [`StoreError::TokenCollision`] when the token string is taken, and
    /// other [`StoreError`] variants on backend failure.
    fn insert(&self, record: NewParticipantToken) -> Result<ParticipantToken, StoreError>;
}

impl<T: ParticipantTokenStore + ?Sized> ParticipantTokenStore for Arc<T> {
    fn ensure_survey(&self, survey_id: &SurveyId) -> Result<(), StoreError> {
        (**self).ensure_survey(survey_id)
    }

    fn find(
        &self,
        survey_id: &SurveyId,
        email: &str,
    ) -> Result<Option<ParticipantToken>, StoreError> {
        (**self).find(survey_id, email)
    }

    fn insert(&self, record: NewParticipantToken) -> Result<ParticipantToken, StoreError> {
        (**self).insert(record)
    }
}

// ============================================================================
// SECTION: Token Generator
// ============================================================================

/// Token generation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token generation failed: {0}")]
pub struct GeneratorError(pub String);

/// Source of opaque access token strings.
pub trait TokenGenerator {
    /// Generates a fresh token string for a survey.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] when no entropy is available.
    fn generate(&self, survey_id: &SurveyId) -> Result<AccessToken, GeneratorError>;
}

impl<T: TokenGenerator + ?Sized> TokenGenerator for Arc<T> {
    fn generate(&self, survey_id: &SurveyId) -> Result<AccessToken, GeneratorError> {
        (**self).generate(survey_id)
    }
}

// ============================================================================
// SECTION: Denial Renderer
// ============================================================================

/// Why a visitor is turned away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum DenialCause {
    /// Presented attributes do not satisfy the survey requirement.
    AttributeMismatch,
    /// The identity carries no email to key a participant token.
    MissingEmail {
        /// Attribute expected to carry the email.
        attribute: AttributeKey,
    },
}

/// Fields supplied to the denial page renderer.
///
/// # Invariants
/// - Values are display strings taken as presented; renderers must escape them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialView {
    /// Survey identifier.
    pub survey_id: SurveyId,
    /// Resolved display language.
    pub language: String,
    /// Reason for the denial.
    pub cause: DenialCause,
    /// Every constrained requirement.
    pub required: BTreeMap<AttributeKey, String>,
    /// Presented values for the required keys.
    pub received: BTreeMap<AttributeKey, String>,
    /// Administrator display name.
    pub admin_name: String,
    /// Administrator email.
    pub admin_email: String,
}

/// Denial rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("denial render error: {0}")]
pub struct RenderError(pub String);

/// Renders the denial page content.
pub trait DenialRenderer {
    /// Renders the page for a denied visitor.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the page cannot be produced.
    fn render(&self, view: &DenialView) -> Result<String, RenderError>;
}

impl<T: DenialRenderer + ?Sized> DenialRenderer for Arc<T> {
    fn render(&self, view: &DenialView) -> Result<String, RenderError> {
        (**self).render(view)
    }
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Audit sink for gate outcomes.
pub trait AuditSink {
    /// Records an audit event.
    fn record(&self, event: &AccessAuditEvent);
}

impl<T: AuditSink + ?Sized> AuditSink for Arc<T> {
    fn record(&self, event: &AccessAuditEvent) {
        (**self).record(event);
    }
}

/// No-op audit sink.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AccessAuditEvent) {}
}
