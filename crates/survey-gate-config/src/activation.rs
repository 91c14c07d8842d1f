// crates/survey-gate-config/src/activation.rs
// ============================================================================
// Module: Survey Activation
// Description: Catalog and requirement checks run before a survey is gated.
// Purpose: Block activation of surveys whose gating data is incomplete.
// Dependencies: survey-gate-core, thiserror
// ============================================================================

//! ## Overview
//! Activation validates the attribute catalog, checks the survey's
//! requirement against it, and prepares token storage for the survey. Any
//! failure leaves the survey inactive and names the offending key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use survey_gate_core::AttributeCatalog;
use survey_gate_core::CatalogError;
use survey_gate_core::ParticipantTokenStore;
use survey_gate_core::RequirementError;
use survey_gate_core::StoreError;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyRecord;
use thiserror::Error;

use crate::config::SurveyGateConfig;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Survey activation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    /// The survey is not configured.
    #[error("survey {0} is not configured")]
    UnknownSurvey(String),
    /// The attribute catalog is incomplete.
    #[error("attribute catalog is invalid: {0}")]
    Catalog(#[from] CatalogError),
    /// The survey requirement disagrees with the catalog.
    #[error(transparent)]
    Requirement(#[from] RequirementError),
    /// Token storage could not be prepared.
    #[error("token storage for survey {survey_id} could not be prepared: {source}")]
    Store {
        /// Survey identifier.
        survey_id: String,
        /// Underlying store error.
        source: StoreError,
    },
}

// ============================================================================
// SECTION: Activation
// ============================================================================

/// Validates the configured attribute catalog.
///
/// # Errors
///
/// Returns [`ActivationError::Catalog`] naming the first incomplete entry in
/// key order.
pub fn validate_catalog(config: &SurveyGateConfig) -> Result<AttributeCatalog, ActivationError> {
    Ok(AttributeCatalog::from_raw(config.catalog_raw())?)
}

/// Activates one survey: validates its requirement against the catalog and,
/// when gating is enabled, prepares token storage.
///
/// # Errors
///
/// Returns [`ActivationError`] when the survey is unknown, the catalog or
/// requirement is invalid, or the store cannot be prepared.
pub fn activate_survey<S: ParticipantTokenStore + ?Sized>(
    config: &SurveyGateConfig,
    survey_id: &SurveyId,
    store: &S,
) -> Result<SurveyRecord, ActivationError> {
    let survey = config
        .survey(survey_id)
        .ok_or_else(|| ActivationError::UnknownSurvey(survey_id.to_string()))?;
    let catalog = validate_catalog(config)?;
    let record = survey.record();
    record.requirement.check_against_catalog(&catalog)?;
    if record.requirement.enabled {
        store.ensure_survey(survey_id).map_err(|source| ActivationError::Store {
            survey_id: survey_id.to_string(),
            source,
        })?;
    }
    Ok(record)
}

/// Activates every enabled survey, stopping at the first failure.
///
/// # Errors
///
/// Returns the first [`ActivationError`] encountered.
pub fn activate_enabled_surveys<S: ParticipantTokenStore + ?Sized>(
    config: &SurveyGateConfig,
    store: &S,
) -> Result<Vec<SurveyRecord>, ActivationError> {
    config
        .surveys
        .iter()
        .filter(|survey| survey.enabled)
        .map(|survey| activate_survey(config, &survey.survey_id(), store))
        .collect()
}
