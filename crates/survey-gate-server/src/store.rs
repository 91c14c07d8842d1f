// crates/survey-gate-server/src/store.rs
// ============================================================================
// Module: Token Store Wiring
// Description: Builds the configured participant token store.
// Purpose: Select the in-memory or SQLite backend from configuration.
// Dependencies: survey-gate-core, survey-gate-config, survey-gate-store-sqlite
// ============================================================================

//! ## Overview
//! Chooses the participant token backend named by `[token_store]`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use survey_gate_config::TokenStoreConfig;
use survey_gate_config::TokenStoreType;
use survey_gate_core::InMemoryParticipantTokenStore;
use survey_gate_core::ParticipantTokenStore;
use survey_gate_store_sqlite::SqliteParticipantTokenStore;

use crate::server::ServerError;

/// Shared participant token store handle.
pub type SharedTokenStore = Arc<dyn ParticipantTokenStore + Send + Sync>;

/// Builds the participant token store from configuration.
///
/// # Errors
///
/// Returns [`ServerError`] when the sqlite path is missing or the database
/// cannot be opened.
pub fn build_token_store(config: &TokenStoreConfig) -> Result<SharedTokenStore, ServerError> {
    match config.store_type {
        TokenStoreType::Memory => Ok(Arc::new(InMemoryParticipantTokenStore::new())),
        TokenStoreType::Sqlite => {
            let sqlite_config = config.sqlite_config().ok_or_else(|| {
                ServerError::Config("sqlite token_store requires path".to_string())
            })?;
            let store = SqliteParticipantTokenStore::new(&sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok(Arc::new(store))
        }
    }
}
