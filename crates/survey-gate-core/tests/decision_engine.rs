// crates/survey-gate-core/tests/decision_engine.rs
// ============================================================================
// Module: Access Decision Engine Tests
// Description: Conjunction semantics, diagnostics, and empty-attribute policy.
// Purpose: Pin grant/deny behavior for presented identity attributes.
// Dependencies: survey-gate-core, proptest
// ============================================================================
//! ## Overview
//! Checks the engine against a reference conjunction over generated inputs
//! and covers the diagnostic payload and both empty-attribute policies.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use survey_gate_core::AccessDecision;
use survey_gate_core::AccessDecisionEngine;
use survey_gate_core::AttributeKey;
use survey_gate_core::EffectiveRequirements;
use survey_gate_core::EmptyAttributesPolicy;
use survey_gate_core::IdentityAttributes;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyRequirement;

/// Builds an effective requirement map from pairs.
fn required(pairs: &[(&str, &str)]) -> EffectiveRequirements {
    pairs.iter().map(|(key, value)| (AttributeKey::new(*key), (*value).to_string())).collect()
}

/// Reference model of the conjunction rule.
fn reference_grants(required: &EffectiveRequirements, presented: &IdentityAttributes) -> bool {
    required.iter().all(|(key, value)| {
        presented
            .first_value(key.as_str())
            .is_some_and(|first| !first.is_empty() && first.eq_ignore_ascii_case(value))
    })
}

/// Matching attribute values grant regardless of case.
#[test]
fn matching_department_is_granted() {
    let engine = AccessDecisionEngine::default();
    let presented = IdentityAttributes::new().with("department", ["cs"]);
    let decision = engine.decide(&required(&[("department", "CS")]), &presented);
    assert_eq!(decision, AccessDecision::Granted);
}

/// A mismatch is denied with required-vs-received diagnostics.
#[test]
fn mismatched_department_is_denied_with_diagnostics() {
    let engine = AccessDecisionEngine::default();
    let presented = IdentityAttributes::new()
        .with("department", ["Math"])
        .with("mail", ["ada@example.org"]);
    let decision = engine.decide(&required(&[("department", "CS")]), &presented);
    let AccessDecision::Denied(diagnostics) = decision else {
        panic!("expected denial, got {decision:?}");
    };
    assert_eq!(diagnostics.failed_attribute, AttributeKey::new("department"));
    assert_eq!(diagnostics.required, required(&[("department", "CS")]));
    assert_eq!(diagnostics.received, required(&[("department", "Math")]));
}

/// Received values are limited to the required keys the visitor presented.
#[test]
fn diagnostics_restrict_received_to_required_keys() {
    let engine = AccessDecisionEngine::default();
    let presented = IdentityAttributes::new()
        .with("affiliation", ["student"])
        .with("entitlement", ["urn:example:survey"]);
    let requirements = required(&[("affiliation", "staff"), ("department", "CS")]);
    let AccessDecision::Denied(diagnostics) = engine.decide(&requirements, &presented) else {
        panic!("expected denial");
    };
    assert_eq!(diagnostics.failed_attribute, AttributeKey::new("affiliation"));
    assert_eq!(diagnostics.required, requirements);
    assert_eq!(diagnostics.received, required(&[("affiliation", "student")]));
}

/// Only the first presented value is compared.
#[test]
fn only_first_value_counts() {
    let engine = AccessDecisionEngine::default();
    let presented = IdentityAttributes::new().with("department", ["Math", "CS"]);
    assert!(!engine.decide(&required(&[("department", "CS")]), &presented).is_granted());
}

/// A missing key or an empty first value denies.
#[test]
fn missing_or_empty_values_deny() {
    let engine = AccessDecisionEngine::default();
    let requirements = required(&[("department", "CS")]);
    let other_key = IdentityAttributes::new().with("affiliation", ["staff"]);
    assert!(!engine.decide(&requirements, &other_key).is_granted());
    let empty_value = IdentityAttributes::new().with("department", [""]);
    assert!(!engine.decide(&requirements, &empty_value).is_granted());
}

/// `none` entries never reach the engine and never constrain access.
#[test]
fn unconstrained_keys_are_ignored() {
    let engine = AccessDecisionEngine::default();
    let requirement = SurveyRequirement::new(SurveyId::new("42"), true)
        .with("department", "CS")
        .with("affiliation", "none");
    let presented = IdentityAttributes::new().with("department", ["CS"]);
    assert!(engine.decide(&requirement.effective(), &presented).is_granted());
}

/// With the default policy an empty attribute set is denied.
#[test]
fn empty_attributes_denied_by_default() {
    let engine = AccessDecisionEngine::default();
    let decision = engine.decide(&required(&[("department", "CS")]), &IdentityAttributes::new());
    let AccessDecision::Denied(diagnostics) = decision else {
        panic!("expected denial");
    };
    assert!(diagnostics.received.is_empty());
}

/// The grant policy admits an empty attribute set regardless of requirements.
#[test]
fn empty_attributes_granted_under_grant_policy() {
    let engine = AccessDecisionEngine::new(EmptyAttributesPolicy::Grant);
    let decision = engine.decide(
        &required(&[("department", "CS"), ("affiliation", "staff")]),
        &IdentityAttributes::new(),
    );
    assert_eq!(decision, AccessDecision::Granted);

    let partial = IdentityAttributes::new().with("department", ["Math"]);
    assert!(!engine.decide(&required(&[("department", "CS")]), &partial).is_granted());
}

/// An empty requirement grants any non-empty attribute set.
#[test]
fn empty_requirement_grants() {
    let engine = AccessDecisionEngine::default();
    let presented = IdentityAttributes::new().with("department", ["Math"]);
    assert!(engine.decide(&BTreeMap::new(), &presented).is_granted());
}

/// Attribute names drawn by the property test.
fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["department", "affiliation", "campus"]).prop_map(str::to_string)
}

/// Attribute values drawn by the property test, including case variants.
fn value_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["CS", "cs", "Math", "MATH", "staff", ""]).prop_map(str::to_string)
}

proptest! {
    #[test]
    fn decide_matches_reference_conjunction(
        requirements in prop::collection::btree_map(key_strategy(), value_strategy(), 0 .. 4),
        presented in prop::collection::btree_map(
            key_strategy(),
            prop::collection::vec(value_strategy(), 0 .. 3),
            0 .. 4,
        ),
    ) {
        let requirements: EffectiveRequirements = requirements
            .into_iter()
            .map(|(key, value)| (AttributeKey::new(key), value))
            .collect();
        let presented = IdentityAttributes::from(presented);
        let engine = AccessDecisionEngine::default();
        let decision = engine.decide(&requirements, &presented);
        prop_assert_eq!(decision.is_granted(), reference_grants(&requirements, &presented));
        if let AccessDecision::Denied(diagnostics) = decision {
            prop_assert!(requirements.contains_key(&diagnostics.failed_attribute));
            prop_assert!(diagnostics.received.keys().all(|key| requirements.contains_key(key)));
        }
    }
}
