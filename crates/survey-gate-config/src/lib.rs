// crates/survey-gate-config/src/lib.rs
// ============================================================================
// Module: Survey Gate Config Library
// Description: Canonical config model, validation, and survey activation.
// Purpose: Single source of truth for survey-gate.toml semantics.
// Dependencies: survey-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `survey-gate-config` defines the configuration model for Survey Gate. It
//! provides strict, fail-closed validation of `survey-gate.toml`, a canonical
//! example file, and the activation check that blocks a survey whose
//! attribute catalog or requirements are incomplete.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod activation;
pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use activation::ActivationError;
pub use activation::activate_enabled_surveys;
pub use activation::activate_survey;
pub use activation::validate_catalog;
pub use config::*;
pub use examples::config_toml_example;
