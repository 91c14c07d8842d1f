// crates/survey-gate-core/src/core/requirement.rs
// ============================================================================
// Module: Survey Gate Survey Requirements
// Description: Per-survey required attribute values and enablement flag.
// Purpose: Model the survey's subset of the catalog as typed configuration.
// Dependencies: crate::core::{catalog, identifiers}, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`SurveyRequirement`] maps catalog keys to a single required value or to
//! the `"none"` sentinel, which means "no constraint". Only the constrained
//! entries take part in access decisions; [`SurveyRequirement::effective`]
//! strips the sentinel before evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::catalog::AttributeCatalog;
use crate::core::identifiers::AttributeKey;
use crate::core::identifiers::SurveyId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel value meaning "no requirement for this key".
pub const NO_REQUIREMENT: &str = "none";

// ============================================================================
// SECTION: Required Values
// ============================================================================

/// Required value for a single attribute key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequiredValue {
    /// The key is not constrained.
    Unconstrained,
    /// The first presented value must equal this value, ignoring case.
    Exactly(String),
}

impl RequiredValue {
    /// Returns the constrained value, if any.
    #[must_use]
    pub fn as_constraint(&self) -> Option<&str> {
        match self {
            Self::Unconstrained => None,
            Self::Exactly(value) => Some(value),
        }
    }
}

impl From<String> for RequiredValue {
    fn from(value: String) -> Self {
        if value == NO_REQUIREMENT { Self::Unconstrained } else { Self::Exactly(value) }
    }
}

impl From<&str> for RequiredValue {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RequiredValue> for String {
    fn from(value: RequiredValue) -> Self {
        match value {
            RequiredValue::Unconstrained => NO_REQUIREMENT.to_string(),
            RequiredValue::Exactly(value) => value,
        }
    }
}

impl fmt::Display for RequiredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => f.write_str(NO_REQUIREMENT),
            Self::Exactly(value) => f.write_str(value),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Requirement consistency errors found at activation time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    /// The requirement references a key the catalog does not define.
    #[error("survey {survey_id} requires attribute '{key}' which is not in the catalog")]
    UnknownAttribute {
        /// Survey identifier.
        survey_id: String,
        /// Offending key.
        key: String,
    },
    /// The required value is not one of the catalog entry's options.
    #[error("survey {survey_id} requires '{key}' = \"{value}\" which is not a catalog option")]
    UnknownOption {
        /// Survey identifier.
        survey_id: String,
        /// Offending key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// The serialized requirement blob could not be decoded.
    #[error("requirement decode error: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Survey Requirement
// ============================================================================

/// Constrained requirements only, ready for evaluation.
pub type EffectiveRequirements = BTreeMap<AttributeKey, String>;

/// Per-survey access requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRequirement {
    /// Survey identifier.
    pub survey_id: SurveyId,
    /// Whether the identity gate is active for the survey.
    pub enabled: bool,
    /// Required value per catalog key.
    #[serde(default)]
    pub required: BTreeMap<AttributeKey, RequiredValue>,
}

impl SurveyRequirement {
    /// Creates a requirement with no constrained keys.
    #[must_use]
    pub fn new(survey_id: SurveyId, enabled: bool) -> Self {
        Self {
            survey_id,
            enabled,
            required: BTreeMap::new(),
        }
    }

    /// Adds or replaces a required value (builder style).
    #[must_use]
    pub fn with(mut self, key: impl Into<AttributeKey>, value: impl Into<RequiredValue>) -> Self {
        self.required.insert(key.into(), value.into());
        self
    }

    /// Decodes a requirement from a stored JSON settings object.
    ///
    /// A `null` or non-object blob yields an empty requirement.
    ///
    /// # Errors
    ///
    /// Returns [`RequirementError::Decode`] when the blob is malformed or a
    /// value is not a string.
    pub fn from_json(
        survey_id: SurveyId,
        enabled: bool,
        json: &str,
    ) -> Result<Self, RequirementError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|err| RequirementError::Decode(err.to_string()))?;
        if !value.is_object() {
            return Ok(Self::new(survey_id, enabled));
        }
        let required: BTreeMap<AttributeKey, RequiredValue> = serde_json::from_value(value)
            .map_err(|err| RequirementError::Decode(err.to_string()))?;
        Ok(Self {
            survey_id,
            enabled,
            required,
        })
    }

    /// Returns the constrained entries, excluding `"none"` values.
    #[must_use]
    pub fn effective(&self) -> EffectiveRequirements {
        self.required
            .iter()
            .filter_map(|(key, value)| {
                value.as_constraint().map(|value| (key.clone(), value.to_string()))
            })
            .collect()
    }

    /// Checks that every key exists in the catalog and every constrained value
    /// is one of the entry's options.
    ///
    /// # Errors
    ///
    /// Returns [`RequirementError`] for the first inconsistent key.
    pub fn check_against_catalog(&self, catalog: &AttributeCatalog) -> Result<(), RequirementError> {
        for (key, value) in &self.required {
            let Some(entry) = catalog.entry(key) else {
                return Err(RequirementError::UnknownAttribute {
                    survey_id: self.survey_id.to_string(),
                    key: key.to_string(),
                });
            };
            if let Some(value) = value.as_constraint()
                && !entry.offers(value)
            {
                return Err(RequirementError::UnknownOption {
                    survey_id: self.survey_id.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
