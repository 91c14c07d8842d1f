// crates/survey-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Participant Token Store
// Description: Durable ParticipantTokenStore backend using SQLite WAL.
// Purpose: Provide production persistence for Survey Gate participant tokens.
// Dependencies: survey-gate-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ParticipantTokenStore`]. The
//! `(survey_id, email)` and `(survey_id, token)` pairs are unique in the
//! schema itself, and creation runs as an immediate transaction, so
//! concurrent first visits from separate processes collapse to one record.
//!
//! [`ParticipantTokenStore`]: survey_gate_core::ParticipantTokenStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteParticipantTokenStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
