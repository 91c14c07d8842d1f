// crates/survey-gate-core/src/core/audit.rs
// ============================================================================
// Module: Survey Gate Audit Events
// Description: Structured audit payloads for access-gate outcomes.
// Purpose: Record every gate outcome without leaking identity data.
// Dependencies: crate::core::identifiers, serde, sha2
// ============================================================================

//! ## Overview
//! Each gate invocation ends in exactly one observable outcome and records one
//! [`AccessAuditEvent`]. Events carry stable labels for outcome and reason and
//! a SHA-256 digest of the visitor email; raw emails and attribute values are
//! never written to the audit stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::core::identifiers::AttributeKey;
use crate::core::identifiers::SurveyId;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Observable gate outcome.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Survey not gated; request proceeds untouched.
    Passthrough,
    /// Visitor sent to the identity provider.
    LoginRedirect,
    /// Visitor sent to the survey with a token.
    TokenRedirect,
    /// Already-tokened visitor proceeds to the survey.
    Proceed,
    /// Visitor shown the denial page.
    Denied,
}

/// Reason attached to a gate outcome.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditReason {
    /// Survey has no gating record.
    UnknownSurvey,
    /// Survey gating is disabled.
    Disabled,
    /// Identity session is not authenticated.
    Unauthenticated,
    /// Identity session call timed out.
    SessionTimeout,
    /// Identity session call failed.
    SessionFailure,
    /// Attribute requirements were not satisfied.
    AttributeMismatch,
    /// Authenticated identity lacks an email to key a token.
    IdentityIncomplete,
    /// A new token was created.
    TokenCreated,
    /// An existing token was reused.
    TokenReused,
    /// Visitor already carries a token.
    AlreadyTokened,
    /// Survey directory lookup failed.
    DirectoryFailure,
    /// Token store or generator failed.
    StoreFailure,
    /// Survey link could not be built.
    LinkFailure,
    /// Denial page could not be rendered.
    RenderFailure,
}

// ============================================================================
// SECTION: Event
// ============================================================================

/// Access-gate audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Survey identifier.
    pub survey_id: SurveyId,
    /// Gate outcome.
    pub outcome: AuditOutcome,
    /// Outcome reason.
    pub reason: AuditReason,
    /// First failing attribute for denials.
    pub failed_attribute: Option<AttributeKey>,
    /// SHA-256 hex digest of the visitor email, when known.
    pub subject_hash: Option<String>,
}

impl AccessAuditEvent {
    /// Creates a new audit event stamped with the current time.
    #[must_use]
    pub fn new(survey_id: SurveyId, outcome: AuditOutcome, reason: AuditReason) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "survey_access",
            timestamp_ms,
            survey_id,
            outcome,
            reason,
            failed_attribute: None,
            subject_hash: None,
        }
    }

    /// Attaches the failing attribute.
    #[must_use]
    pub fn with_failed_attribute(mut self, key: AttributeKey) -> Self {
        self.failed_attribute = Some(key);
        self
    }

    /// Attaches the hashed subject for a non-empty email.
    #[must_use]
    pub fn with_subject(mut self, email: &str) -> Self {
        if !email.is_empty() {
            self.subject_hash = Some(subject_hash(email));
        }
        self
    }
}

/// Returns the lowercase hex SHA-256 digest of an email.
#[must_use]
pub fn subject_hash(email: &str) -> String {
    let digest = Sha256::digest(email.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
