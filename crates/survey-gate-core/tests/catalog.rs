// crates/survey-gate-core/tests/catalog.rs
// ============================================================================
// Module: Attribute Catalog Tests
// Description: Validation of catalog entries and survey requirements.
// Purpose: Ensure incomplete catalog entries block activation with their key.
// Dependencies: survey-gate-core
// ============================================================================
//! ## Overview
//! Exercises catalog validation order, field checks, JSON decoding, and the
//! consistency check between a survey requirement and the catalog.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeMap;

use survey_gate_core::AttributeCatalog;
use survey_gate_core::AttributeKey;
use survey_gate_core::CatalogError;
use survey_gate_core::RawCatalogEntry;
use survey_gate_core::RequiredValue;
use survey_gate_core::RequirementError;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyRequirement;

/// Builds a fully populated raw entry.
fn complete(label: &str, options: &[&str]) -> RawCatalogEntry {
    RawCatalogEntry {
        label: Some(label.to_string()),
        help: Some(format!("{label} as asserted by the identity provider")),
        options: Some(options.iter().map(|option| (*option).to_string()).collect()),
    }
}

/// Catalog with department and affiliation entries.
fn department_catalog() -> AttributeCatalog {
    let mut raw = BTreeMap::new();
    raw.insert("department".to_string(), complete("Department", &["CS", "Math"]));
    raw.insert("affiliation".to_string(), complete("Affiliation", &["staff", "student"]));
    AttributeCatalog::from_raw(&raw).unwrap()
}

/// A fully populated catalog validates and keeps entries in key order.
#[test]
fn complete_catalog_passes() {
    let catalog = department_catalog();
    assert_eq!(catalog.len(), 2);
    let keys: Vec<&str> = catalog.keys().map(AttributeKey::as_str).collect();
    assert_eq!(keys, vec!["affiliation", "department"]);
    let entry = catalog.entry(&AttributeKey::new("department")).unwrap();
    assert!(entry.offers("CS"));
    assert!(!entry.offers("cs"));
}

/// An entry without options fails and names the entry.
#[test]
fn missing_options_fails_with_key() {
    let mut raw = BTreeMap::new();
    raw.insert("department".to_string(), complete("Department", &["CS"]));
    raw.insert(
        "faculty".to_string(),
        RawCatalogEntry {
            label: Some("Faculty".to_string()),
            help: Some("Faculty membership".to_string()),
            options: None,
        },
    );
    let err = AttributeCatalog::from_raw(&raw).unwrap_err();
    assert_eq!(
        err,
        CatalogError::MissingField {
            key: "faculty".to_string(),
            field: "options",
        }
    );
    assert_eq!(err.key(), Some("faculty"));
    assert!(err.to_string().contains("faculty"));
}

/// Validation stops at the first failing entry in key order.
#[test]
fn first_failing_entry_in_key_order_is_reported() {
    let mut raw = BTreeMap::new();
    raw.insert("zeta".to_string(), RawCatalogEntry::default());
    raw.insert("alpha".to_string(), RawCatalogEntry::default());
    let err = AttributeCatalog::from_raw(&raw).unwrap_err();
    assert_eq!(err.key(), Some("alpha"));
}

/// Present but empty fields are rejected like missing ones.
#[test]
fn empty_fields_are_rejected() {
    let mut raw = BTreeMap::new();
    raw.insert(
        "department".to_string(),
        RawCatalogEntry {
            label: Some("Department".to_string()),
            help: Some("   ".to_string()),
            options: Some(vec!["CS".to_string()]),
        },
    );
    let err = AttributeCatalog::from_raw(&raw).unwrap_err();
    assert_eq!(
        err,
        CatalogError::EmptyField {
            key: "department".to_string(),
            field: "help",
        }
    );

    raw.insert("department".to_string(), complete("Department", &[]));
    let err = AttributeCatalog::from_raw(&raw).unwrap_err();
    assert_eq!(
        err,
        CatalogError::EmptyField {
            key: "department".to_string(),
            field: "options",
        }
    );

    raw.insert("department".to_string(), complete("Department", &["CS", " "]));
    let err = AttributeCatalog::from_raw(&raw).unwrap_err();
    assert_eq!(
        err,
        CatalogError::BlankOption {
            key: "department".to_string(),
        }
    );
}

/// A JSON catalog blob decodes and validates; `null` means an empty catalog.
#[test]
fn json_catalog_decodes() {
    let catalog = AttributeCatalog::from_json(
        r#"{"department":{"label":"Department","help":"Home department","options":["CS","Math"]}}"#,
    )
    .unwrap();
    assert_eq!(catalog.len(), 1);
    assert!(AttributeCatalog::from_json("null").unwrap().is_empty());

    let err = AttributeCatalog::from_json(r#"{"department":{"label":"Department"}}"#).unwrap_err();
    assert_eq!(err.key(), Some("department"));

    let err = AttributeCatalog::from_json("{not json").unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));
}

/// The `none` sentinel is excluded from the effective requirement.
#[test]
fn none_requirement_is_unconstrained() {
    let requirement = SurveyRequirement::from_json(
        SurveyId::new("42"),
        true,
        r#"{"department":"CS","affiliation":"none"}"#,
    )
    .unwrap();
    assert_eq!(
        requirement.required.get(&AttributeKey::new("affiliation")),
        Some(&RequiredValue::Unconstrained)
    );
    let effective = requirement.effective();
    assert_eq!(effective.len(), 1);
    assert_eq!(effective.get(&AttributeKey::new("department")).map(String::as_str), Some("CS"));
}

/// Requirements must reference catalog keys and offered values.
#[test]
fn requirement_must_match_catalog() {
    let catalog = department_catalog();
    let ok = SurveyRequirement::new(SurveyId::new("42"), true)
        .with("department", "CS")
        .with("affiliation", "none");
    ok.check_against_catalog(&catalog).unwrap();

    let unknown_key = SurveyRequirement::new(SurveyId::new("42"), true).with("campus", "North");
    assert_eq!(
        unknown_key.check_against_catalog(&catalog).unwrap_err(),
        RequirementError::UnknownAttribute {
            survey_id: "42".to_string(),
            key: "campus".to_string(),
        }
    );

    let unknown_value =
        SurveyRequirement::new(SurveyId::new("42"), true).with("department", "Physics");
    assert!(matches!(
        unknown_value.check_against_catalog(&catalog).unwrap_err(),
        RequirementError::UnknownOption { .. }
    ));
}
