// crates/survey-gate-core/src/core/decision.rs
// ============================================================================
// Module: Survey Gate Access Decisions
// Description: Grant/deny outcomes and denial diagnostics.
// Purpose: Provide the request-scoped result of attribute evaluation.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! An [`AccessDecision`] is produced per request by the decision engine. The
//! denial side carries a "required vs received" comparison meant for display;
//! values are shown as presented and are not re-validated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AttributeKey;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Attribute comparison shown to denied visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenialDiagnostics {
    /// Every constrained requirement of the survey.
    pub required: BTreeMap<AttributeKey, String>,
    /// First presented value for each required key the provider returned.
    pub received: BTreeMap<AttributeKey, String>,
    /// First key that failed evaluation.
    pub failed_attribute: AttributeKey,
}

/// Outcome of comparing presented attributes against survey requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// All requirements are satisfied.
    Granted,
    /// At least one requirement is not satisfied.
    Denied(DenialDiagnostics),
}

impl AccessDecision {
    /// Returns true for [`AccessDecision::Granted`].
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

// ============================================================================
// SECTION: Empty Attribute Policy
// ============================================================================

/// Handling of an authenticated session that returned no attributes at all.
///
/// `Grant` only skips requirement evaluation. An admitted visitor still needs
/// an email to key a token, and a session with no attributes has none, so the
/// gate refuses it with the missing-email page. `Deny` evaluates normally, so
/// any constrained requirement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyAttributesPolicy {
    /// Evaluate requirements against the empty set.
    #[default]
    Deny,
    /// Admit without evaluation.
    Grant,
}
