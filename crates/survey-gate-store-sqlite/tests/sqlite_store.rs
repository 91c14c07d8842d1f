// crates/survey-gate-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite ParticipantTokenStore behavior.
// Purpose: Ensure durable persistence and database-enforced uniqueness.
// Dependencies: survey-gate-store-sqlite, survey-gate-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed participant token store.
//! Exercises durability, uniqueness, survey preparation, corrupt rows, and a
//! 100-way race across independent connections to one database file.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;
use std::sync::Barrier;
use std::thread;

use rusqlite::Connection;
use rusqlite::params;
use survey_gate_core::AccessToken;
use survey_gate_core::EmailStatus;
use survey_gate_core::NewParticipantToken;
use survey_gate_core::ParticipantIdentity;
use survey_gate_core::ParticipantTokenManager;
use survey_gate_core::ParticipantTokenStore;
use survey_gate_core::RandomTokenGenerator;
use survey_gate_core::StoreError;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveySchedule;
use survey_gate_core::TokenRequest;
use survey_gate_core::TokenStatus;
use survey_gate_store_sqlite::SqliteParticipantTokenStore;
use survey_gate_store_sqlite::SqliteStoreConfig;
use survey_gate_store_sqlite::SqliteStoreError;
use tempfile::TempDir;
use time::macros::datetime;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Opens a store on `path` with default settings.
fn store_for(path: &Path) -> SqliteParticipantTokenStore {
    let mut config = SqliteStoreConfig::new(path);
    config.busy_timeout_ms = 10_000;
    SqliteParticipantTokenStore::new(&config).expect("store init")
}

/// Builds a participant identity for `email`.
fn identity(email: &str) -> ParticipantIdentity {
    ParticipantIdentity {
        email: email.to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        language: Some("en".to_string()),
    }
}

/// Builds an unsaved token record.
fn draft(survey: &str, email: &str, token: &str, schedule: &SurveySchedule) -> NewParticipantToken {
    NewParticipantToken::from_identity(
        SurveyId::new(survey),
        &identity(email),
        schedule,
        AccessToken::new(token),
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn sqlite_store_roundtrip() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("tokens.sqlite"));
    let survey_id = SurveyId::new("42");
    store.ensure_survey(&survey_id).unwrap();
    let schedule = SurveySchedule {
        start: Some(datetime!(2026-03-01 09:00 UTC)),
        expires: Some(datetime!(2026-03-31 17:30 +01:00)),
    };

    let created = store.insert(draft("42", "grace@example.org", "tok00000000001", &schedule)).unwrap();
    let loaded = store.find(&survey_id, "grace@example.org").unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.valid_from, schedule.start);
    assert_eq!(loaded.valid_until, schedule.expires);
    assert_eq!(loaded.email_status, EmailStatus::Confirmed);
    assert_eq!(loaded.status, TokenStatus::Active);
    assert_eq!(loaded.language.as_deref(), Some("en"));
}

#[test]
fn sqlite_store_keeps_open_validity_unset() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("tokens.sqlite"));
    let survey_id = SurveyId::new("42");
    store.ensure_survey(&survey_id).unwrap();
    store
        .insert(draft("42", "grace@example.org", "tok00000000001", &SurveySchedule::default()))
        .unwrap();
    let loaded = store.find(&survey_id, "grace@example.org").unwrap().unwrap();
    assert_eq!(loaded.valid_from, None);
    assert_eq!(loaded.valid_until, None);
}

#[test]
fn sqlite_store_returns_none_for_unknown_email() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("tokens.sqlite"));
    let survey_id = SurveyId::new("42");
    store.ensure_survey(&survey_id).unwrap();
    store
        .insert(draft("42", "grace@example.org", "tok00000000001", &SurveySchedule::default()))
        .unwrap();
    assert!(store.find(&survey_id, "GRACE@example.org").unwrap().is_none());
    assert!(store.find(&SurveyId::new("43"), "grace@example.org").unwrap().is_none());
}

#[test]
fn sqlite_store_rejects_duplicate_email() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("tokens.sqlite"));
    store.ensure_survey(&SurveyId::new("42")).unwrap();
    let schedule = SurveySchedule::default();
    store.insert(draft("42", "grace@example.org", "tok00000000001", &schedule)).unwrap();
    let err = store.insert(draft("42", "grace@example.org", "tok00000000002", &schedule)).unwrap_err();
    assert_eq!(
        err,
        StoreError::Conflict {
            survey_id: "42".to_string()
        }
    );
}

#[test]
fn sqlite_store_rejects_duplicate_token() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("tokens.sqlite"));
    store.ensure_survey(&SurveyId::new("42")).unwrap();
    store.ensure_survey(&SurveyId::new("43")).unwrap();
    let schedule = SurveySchedule::default();
    store.insert(draft("42", "grace@example.org", "tok00000000001", &schedule)).unwrap();
    let err = store.insert(draft("42", "ada@example.org", "tok00000000001", &schedule)).unwrap_err();
    assert_eq!(
        err,
        StoreError::TokenCollision {
            survey_id: "42".to_string()
        }
    );
    store.insert(draft("43", "ada@example.org", "tok00000000001", &schedule)).unwrap();
}

#[test]
fn sqlite_store_requires_prepared_survey() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("tokens.sqlite"));
    let survey_id = SurveyId::new("42");
    assert!(!store.is_prepared(&survey_id).unwrap());
    let err = store
        .insert(draft("42", "grace@example.org", "tok00000000001", &SurveySchedule::default()))
        .unwrap_err();
    assert_eq!(err, StoreError::MissingSurvey("42".to_string()));

    store.ensure_survey(&survey_id).unwrap();
    store.ensure_survey(&survey_id).unwrap();
    assert!(store.is_prepared(&survey_id).unwrap());
}

#[test]
fn sqlite_store_persists_across_instances() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tokens.sqlite");
    {
        let store = store_for(&path);
        store.ensure_survey(&SurveyId::new("42")).unwrap();
        store
            .insert(draft("42", "grace@example.org", "tok00000000001", &SurveySchedule::default()))
            .unwrap();
    }
    let store = store_for(&path);
    let loaded = store.find(&SurveyId::new("42"), "grace@example.org").unwrap().unwrap();
    assert_eq!(loaded.token, AccessToken::new("tok00000000001"));
    assert!(store.is_prepared(&SurveyId::new("42")).unwrap());
}

#[test]
fn sqlite_store_lists_tokens_in_creation_order() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("tokens.sqlite"));
    let survey_id = SurveyId::new("42");
    store.ensure_survey(&survey_id).unwrap();
    let schedule = SurveySchedule::default();
    store.insert(draft("42", "b@example.org", "tok00000000001", &schedule)).unwrap();
    store.insert(draft("42", "a@example.org", "tok00000000002", &schedule)).unwrap();
    let emails: Vec<String> =
        store.list_tokens(&survey_id).unwrap().into_iter().map(|token| token.email).collect();
    assert_eq!(emails, vec!["b@example.org".to_string(), "a@example.org".to_string()]);
}

#[test]
fn sqlite_store_rejects_version_mismatch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tokens.sqlite");
    drop(store_for(&path));
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(connection);

    let Err(err) = SqliteParticipantTokenStore::new(&SqliteStoreConfig::new(&path)) else {
        panic!("expected version mismatch");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
}

#[test]
fn sqlite_store_fails_closed_on_corrupt_status() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tokens.sqlite");
    let store = store_for(&path);
    store.ensure_survey(&SurveyId::new("42")).unwrap();
    store
        .insert(draft("42", "grace@example.org", "tok00000000001", &SurveySchedule::default()))
        .unwrap();
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE participant_tokens SET status = 'revoked'", params![]).unwrap();
    drop(connection);

    let err = store.find(&SurveyId::new("42"), "grace@example.org").unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let Err(err) = SqliteParticipantTokenStore::new(&SqliteStoreConfig::new(temp.path())) else {
        panic!("expected directory path to be rejected");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_path_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("x".repeat(300));
    let Err(err) = SqliteParticipantTokenStore::new(&SqliteStoreConfig::new(path)) else {
        panic!("expected overlong component to be rejected");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_collapses_concurrent_first_visits() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tokens.sqlite");
    let survey_id = SurveyId::new("42");
    store_for(&path).ensure_survey(&survey_id).unwrap();

    let managers: Vec<_> = (0 .. 100)
        .map(|_| ParticipantTokenManager::new(store_for(&path), RandomTokenGenerator::default()))
        .collect();
    let barrier = Arc::new(Barrier::new(managers.len()));
    let handles: Vec<_> = managers
        .into_iter()
        .map(|manager| {
            let barrier = Arc::clone(&barrier);
            let survey_id = survey_id.clone();
            thread::spawn(move || {
                let visitor = identity("grace@example.org");
                let schedule = SurveySchedule::default();
                barrier.wait();
                manager
                    .obtain_token(TokenRequest {
                        survey_id: &survey_id,
                        identity: &visitor,
                        schedule: &schedule,
                        already_carrying_token: false,
                    })
                    .unwrap()
                    .redirect_token
                    .unwrap()
            })
        })
        .collect();
    let tokens: Vec<AccessToken> =
        handles.into_iter().map(|handle| handle.join().unwrap()).collect();

    let records = store_for(&path).list_tokens(&survey_id).unwrap();
    assert_eq!(records.len(), 1);
    assert!(tokens.iter().all(|token| token == &records[0].token));
}
