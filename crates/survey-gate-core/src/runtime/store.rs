// crates/survey-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Survey Gate In-Memory Stores
// Description: In-memory participant token store and survey directory.
// Purpose: Provide simple backends for tests and single-process deployments.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The in-memory token store performs the `(survey, email)` existence check
//! and the insert under one mutex, so concurrent creations collapse to one
//! winner exactly as the durable store does with its unique constraint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::AccessToken;
use crate::core::NewParticipantToken;
use crate::core::ParticipantToken;
use crate::core::SurveyId;
use crate::interfaces::DirectoryError;
use crate::interfaces::ParticipantTokenStore;
use crate::interfaces::StoreError;
use crate::interfaces::SurveyDirectory;
use crate::interfaces::SurveyRecord;

// ============================================================================
// SECTION: Token Store
// ============================================================================

/// Token store contents guarded by one lock.
#[derive(Debug, Default)]
struct TokenTable {
    /// Surveys with prepared token storage.
    prepared: BTreeSet<SurveyId>,
    /// Records keyed by `(survey, email)`.
    records: BTreeMap<(SurveyId, String), ParticipantToken>,
    /// Issued token strings per survey.
    issued: BTreeSet<(SurveyId, AccessToken)>,
    /// Last assigned record identifier.
    last_id: u64,
}

/// In-memory participant token store for tests and single-process use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryParticipantTokenStore {
    /// Token table protected by a mutex.
    table: Arc<Mutex<TokenTable>>,
}

impl InMemoryParticipantTokenStore {
    /// Creates an empty store with no prepared surveys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every record for a survey ordered by record id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the store lock is poisoned.
    pub fn tokens_for(&self, survey_id: &SurveyId) -> Result<Vec<ParticipantToken>, StoreError> {
        let guard = self.lock()?;
        let mut tokens: Vec<ParticipantToken> = guard
            .records
            .values()
            .filter(|record| &record.survey_id == survey_id)
            .cloned()
            .collect();
        tokens.sort_by_key(|record| record.token_id);
        Ok(tokens)
    }

    /// Locks the token table.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, TokenTable>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Store("participant token store mutex poisoned".to_string()))
    }
}

impl ParticipantTokenStore for InMemoryParticipantTokenStore {
    fn ensure_survey(&self, survey_id: &SurveyId) -> Result<(), StoreError> {
        self.lock()?.prepared.insert(survey_id.clone());
        Ok(())
    }

    fn find(
        &self,
        survey_id: &SurveyId,
        email: &str,
    ) -> Result<Option<ParticipantToken>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.records.get(&(survey_id.clone(), email.to_string())).cloned())
    }

    fn insert(&self, record: NewParticipantToken) -> Result<ParticipantToken, StoreError> {
        let mut guard = self.lock()?;
        if !guard.prepared.contains(&record.survey_id) {
            return Err(StoreError::MissingSurvey(record.survey_id.to_string()));
        }
        let pair = (record.survey_id.clone(), record.email.clone());
        if guard.records.contains_key(&pair) {
            return Err(StoreError::Conflict {
                survey_id: record.survey_id.to_string(),
            });
        }
        let issued = (record.survey_id.clone(), record.token.clone());
        if guard.issued.contains(&issued) {
            return Err(StoreError::TokenCollision {
                survey_id: record.survey_id.to_string(),
            });
        }
        guard.last_id = guard.last_id.saturating_add(1);
        let token = ParticipantToken::from_new(guard.last_id, record);
        guard.issued.insert(issued);
        guard.records.insert(pair, token.clone());
        Ok(token)
    }
}

// ============================================================================
// SECTION: Survey Directory
// ============================================================================

/// In-memory survey directory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySurveyDirectory {
    /// Survey records keyed by id.
    surveys: Arc<Mutex<BTreeMap<SurveyId, SurveyRecord>>>,
}

impl InMemorySurveyDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a survey record.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Backend`] when the directory lock is poisoned.
    pub fn upsert(&self, record: SurveyRecord) -> Result<(), DirectoryError> {
        self.surveys
            .lock()
            .map_err(|_| DirectoryError::Backend("survey directory mutex poisoned".to_string()))?
            .insert(record.requirement.survey_id.clone(), record);
        Ok(())
    }
}

impl SurveyDirectory for InMemorySurveyDirectory {
    fn survey(&self, survey_id: &SurveyId) -> Result<Option<SurveyRecord>, DirectoryError> {
        let guard = self
            .surveys
            .lock()
            .map_err(|_| DirectoryError::Backend("survey directory mutex poisoned".to_string()))?;
        Ok(guard.get(survey_id).cloned())
    }
}
