// crates/survey-gate-core/src/runtime/link.rs
// ============================================================================
// Module: Survey Gate Link Builder
// Description: Builds survey entry URLs carrying a participant token.
// Purpose: Produce the redirect target for granted visitors.
// Dependencies: crate::core, thiserror, url
// ============================================================================

//! ## Overview
//! [`SurveyLinkBuilder`] expands the configured survey URL template by
//! substituting `{survey_id}` and appends the `token` query parameter for
//! granted visitors. Only absolute http(s) templates are accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use url::Url;

use crate::core::AccessToken;
use crate::core::SurveyId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder replaced by the survey identifier.
pub const SURVEY_ID_PLACEHOLDER: &str = "{survey_id}";
/// Query parameter carrying the participant token.
pub const TOKEN_QUERY_PARAM: &str = "token";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Survey link errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The template lacks the survey id placeholder.
    #[error("survey url template must contain {{survey_id}}")]
    MissingPlaceholder,
    /// The expanded template is not an absolute http(s) URL.
    #[error("invalid survey url: {0}")]
    InvalidUrl(String),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds `survey_url?token=...` redirect targets from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyLinkBuilder {
    /// URL template containing [`SURVEY_ID_PLACEHOLDER`].
    template: String,
}

impl SurveyLinkBuilder {
    /// Creates a builder after checking the template expands to a valid URL.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] when the template is unusable.
    pub fn new(template: impl Into<String>) -> Result<Self, LinkError> {
        let template = template.into();
        if !template.contains(SURVEY_ID_PLACEHOLDER) {
            return Err(LinkError::MissingPlaceholder);
        }
        let builder = Self {
            template,
        };
        builder.survey_url(&SurveyId::new("0"))?;
        Ok(builder)
    }

    /// Returns the configured template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the survey entry URL without a token.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidUrl`] when the expanded URL does not parse.
    pub fn survey_url(&self, survey_id: &SurveyId) -> Result<Url, LinkError> {
        let expanded = self.template.replace(SURVEY_ID_PLACEHOLDER, survey_id.as_str());
        let url = Url::parse(&expanded).map_err(|err| LinkError::InvalidUrl(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(LinkError::InvalidUrl(format!("unsupported scheme {other}"))),
        }
    }

    /// Returns the survey entry URL carrying the participant token.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidUrl`] when the expanded URL does not parse.
    pub fn token_url(&self, survey_id: &SurveyId, token: &AccessToken) -> Result<Url, LinkError> {
        let mut url = self.survey_url(survey_id)?;
        url.query_pairs_mut().append_pair(TOKEN_QUERY_PARAM, token.as_str());
        Ok(url)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
