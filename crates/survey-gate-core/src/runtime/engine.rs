// crates/survey-gate-core/src/runtime/engine.rs
// ============================================================================
// Module: Survey Gate Decision Engine
// Description: Pure comparison of presented attributes against requirements.
// Purpose: Produce deterministic, auditable grant/deny decisions.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The decision engine is a pure conjunction: a visitor is granted when, for
//! every constrained key, the first presented value equals the required value
//! ignoring case. Keys are evaluated in key order and evaluation stops at the
//! first failure. An attribute set that is entirely empty is governed by
//! [`EmptyAttributesPolicy`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::AccessDecision;
use crate::core::AttributeKey;
use crate::core::DenialDiagnostics;
use crate::core::EffectiveRequirements;
use crate::core::EmptyAttributesPolicy;
use crate::core::IdentityAttributes;

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Evaluates identity attributes against survey requirements.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessDecisionEngine {
    /// Handling of sessions that returned no attributes.
    empty_attributes: EmptyAttributesPolicy,
}

impl AccessDecisionEngine {
    /// Creates an engine with the given empty-attribute policy.
    #[must_use]
    pub const fn new(empty_attributes: EmptyAttributesPolicy) -> Self {
        Self {
            empty_attributes,
        }
    }

    /// Decides access for the presented attributes.
    ///
    /// `required` must already exclude unconstrained (`"none"`) entries.
    #[must_use]
    pub fn decide(
        &self,
        required: &EffectiveRequirements,
        presented: &IdentityAttributes,
    ) -> AccessDecision {
        if presented.is_empty() && self.empty_attributes == EmptyAttributesPolicy::Grant {
            return AccessDecision::Granted;
        }
        for (key, value) in required {
            if !matches_requirement(presented.first_value(key.as_str()), value) {
                return AccessDecision::Denied(diagnostics(required, presented, key));
            }
        }
        AccessDecision::Granted
    }
}

/// Returns true when a presented first value satisfies a required value.
///
/// Case folding covers ASCII letters only; other characters must match exactly.
fn matches_requirement(presented: Option<&str>, required: &str) -> bool {
    match presented {
        Some(value) if !value.is_empty() => value.eq_ignore_ascii_case(required),
        _ => false,
    }
}

/// Builds the required-vs-received comparison for a denial.
fn diagnostics(
    required: &EffectiveRequirements,
    presented: &IdentityAttributes,
    failed: &AttributeKey,
) -> DenialDiagnostics {
    DenialDiagnostics {
        required: required.clone(),
        received: received_values(required, presented),
        failed_attribute: failed.clone(),
    }
}

/// Returns the presented first values for the required keys.
pub(crate) fn received_values(
    required: &EffectiveRequirements,
    presented: &IdentityAttributes,
) -> BTreeMap<AttributeKey, String> {
    required
        .keys()
        .filter_map(|key| {
            presented
                .values(key.as_str())
                .map(|values| (key.clone(), values.first().cloned().unwrap_or_default()))
        })
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
