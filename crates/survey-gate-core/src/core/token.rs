// crates/survey-gate-core/src/core/token.rs
// ============================================================================
// Module: Survey Gate Participant Tokens
// Description: Participant token records and survey validity windows.
// Purpose: Describe what the token store persists for each admitted visitor.
// Dependencies: crate::core::{identifiers, identity}, serde, time
// ============================================================================

//! ## Overview
//! A participant token admits one email address to one survey. Tokens are
//! created at most once per `(survey, email)` pair and reused afterwards; the
//! validity window is copied from the survey schedule at creation time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::AccessToken;
use crate::core::identifiers::SurveyId;
use crate::core::identity::ParticipantIdentity;

// ============================================================================
// SECTION: Schedule
// ============================================================================

/// Survey validity window; absent bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveySchedule {
    /// Survey start date.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    /// Survey expiry date.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
}

// ============================================================================
// SECTION: Status Labels
// ============================================================================

/// Token lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// Token admits the participant.
    #[default]
    Active,
}

impl TokenStatus {
    /// Returns the stable storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
        }
    }

    /// Parses a storage label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "active" => Some(Self::Active),
            _ => None,
        }
    }
}

/// Email deliverability status recorded on the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// Email was vouched for by the identity provider.
    #[default]
    Confirmed,
}

impl EmailStatus {
    /// Returns the stable storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
        }
    }

    /// Parses a storage label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Token Records
// ============================================================================

/// Token record to be inserted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParticipantToken {
    /// Survey identifier.
    pub survey_id: SurveyId,
    /// Participant email (case-sensitive key).
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Preferred language.
    pub language: Option<String>,
    /// Email status.
    pub email_status: EmailStatus,
    /// Start of validity.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub valid_from: Option<OffsetDateTime>,
    /// End of validity.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub valid_until: Option<OffsetDateTime>,
    /// Opaque access token string.
    pub token: AccessToken,
}

impl NewParticipantToken {
    /// Builds a token record from an identity and the survey schedule.
    #[must_use]
    pub fn from_identity(
        survey_id: SurveyId,
        identity: &ParticipantIdentity,
        schedule: &SurveySchedule,
        token: AccessToken,
    ) -> Self {
        Self {
            survey_id,
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            language: identity.language.clone(),
            email_status: EmailStatus::Confirmed,
            valid_from: schedule.start,
            valid_until: schedule.expires,
            token,
        }
    }
}

/// Persisted participant token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantToken {
    /// Store-assigned record identifier.
    pub token_id: u64,
    /// Survey identifier.
    pub survey_id: SurveyId,
    /// Participant email (case-sensitive key).
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Preferred language.
    pub language: Option<String>,
    /// Email status.
    pub email_status: EmailStatus,
    /// Start of validity.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub valid_from: Option<OffsetDateTime>,
    /// End of validity.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub valid_until: Option<OffsetDateTime>,
    /// Opaque access token string.
    pub token: AccessToken,
    /// Token status.
    pub status: TokenStatus,
}

impl ParticipantToken {
    /// Materializes a persisted record from an insert draft.
    #[must_use]
    pub fn from_new(token_id: u64, record: NewParticipantToken) -> Self {
        Self {
            token_id,
            survey_id: record.survey_id,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            language: record.language,
            email_status: record.email_status,
            valid_from: record.valid_from,
            valid_until: record.valid_until,
            token: record.token,
            status: TokenStatus::Active,
        }
    }
}
