// crates/survey-gate-server/src/directory.rs
// ============================================================================
// Module: Config Survey Directory
// Description: Survey directory backed by the loaded configuration.
// Purpose: Serve gate records for configured surveys.
// Dependencies: survey-gate-core, survey-gate-config
// ============================================================================

//! ## Overview
//! [`ConfigSurveyDirectory`] snapshots every configured survey into a gate
//! record when the server starts. Surveys missing from the configuration
//! answer `None`, which the gate treats as ungated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use survey_gate_config::SurveyGateConfig;
use survey_gate_core::DirectoryError;
use survey_gate_core::SurveyDirectory;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyRecord;

// ============================================================================
// SECTION: Directory
// ============================================================================

/// Immutable survey directory built from configuration at start-up.
#[derive(Debug, Clone, Default)]
pub struct ConfigSurveyDirectory {
    /// Survey records keyed by id.
    surveys: BTreeMap<SurveyId, SurveyRecord>,
}

impl ConfigSurveyDirectory {
    /// Builds a directory holding every configured survey.
    #[must_use]
    pub fn from_config(config: &SurveyGateConfig) -> Self {
        Self {
            surveys: config
                .surveys
                .iter()
                .map(|survey| (survey.survey_id(), survey.record()))
                .collect(),
        }
    }
}

impl SurveyDirectory for ConfigSurveyDirectory {
    fn survey(&self, survey_id: &SurveyId) -> Result<Option<SurveyRecord>, DirectoryError> {
        Ok(self.surveys.get(survey_id).cloned())
    }
}
