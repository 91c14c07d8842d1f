//! Config validation tests for survey-gate-config.
// crates/survey-gate-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate defaults and fail-closed checks of survey-gate.toml.
// Purpose: Ensure malformed sections are rejected with a named field.
// =============================================================================

mod common;

use common::TestResult;
use common::assert_invalid;
use common::parse_replacing;
use common::parse_with;
use survey_gate_config::AuditSinkType;
use survey_gate_config::TokenStoreType;
use survey_gate_core::AttributeKey;
use survey_gate_core::EmptyAttributesPolicy;
use survey_gate_core::SurveyId;

#[test]
fn base_config_applies_defaults() -> TestResult {
    let config = parse_with("").map_err(|err| err.to_string())?;
    if config.server.bind != "127.0.0.1:8088" {
        return Err(format!("unexpected bind {}", config.server.bind));
    }
    if config.identity.timeout_ms != 2_000 || config.identity.authenticated_header != "x-remote-user"
    {
        return Err("unexpected identity defaults".to_string());
    }
    if config.identity.empty_attributes != EmptyAttributesPolicy::Deny {
        return Err("empty attributes must default to deny".to_string());
    }
    if config.identity.mapping.email != "mail" {
        return Err(format!("unexpected email mapping {}", config.identity.mapping.email));
    }
    if config.tokens.length != 15 || config.tokens.max_create_attempts != 3 {
        return Err("unexpected token defaults".to_string());
    }
    if config.token_store.store_type != TokenStoreType::Memory
        || config.audit.sink != AuditSinkType::Stderr
    {
        return Err("unexpected store or audit defaults".to_string());
    }
    Ok(())
}

#[test]
fn survey_record_carries_requirement_and_contact() -> TestResult {
    let config = parse_with(
        r#"
[[surveys]]
id = "7"
enabled = true
language = "de"
admin_name = "Office"
admin_email = "office@example.org"
start = "2026-01-01T00:00:00Z"
expires = "2026-12-31T00:00:00Z"

[surveys.required]
department = "none"
"#,
    )
    .map_err(|err| err.to_string())?;
    let survey = config.survey(&SurveyId::new("7")).ok_or("survey 7 missing")?;
    let record = survey.record();
    if record.language != "de" || record.admin.email != "office@example.org" {
        return Err("record fields not carried".to_string());
    }
    if record.schedule.start.is_none() || record.schedule.expires.is_none() {
        return Err("schedule not carried".to_string());
    }
    if !record.requirement.effective().is_empty() {
        return Err("none sentinel must not constrain".to_string());
    }
    let gated = config.survey(&SurveyId::new("42")).ok_or("survey 42 missing")?.requirement();
    if gated.effective().get(&AttributeKey::new("department")).map(String::as_str) != Some("cs") {
        return Err("department requirement missing".to_string());
    }
    Ok(())
}

#[test]
fn login_url_expands_placeholders() -> TestResult {
    let config = parse_with("").map_err(|err| err.to_string())?;
    let url = config.identity.login_url_for("https://surveys.example.org/index.php/42?lang=de");
    let expected = "https://idp.example.org/login?source=campus-idp&return=https%3A%2F%2Fsurveys.\
                    example.org%2Findex.php%2F42%3Flang%3Dde";
    if url != expected {
        return Err(format!("unexpected login url {url}"));
    }
    Ok(())
}

#[test]
fn rejects_survey_url_without_placeholder() -> TestResult {
    assert_invalid(
        parse_replacing("index.php/{survey_id}", "index.php/fixed"),
        "server.survey_url",
    )
}

#[test]
fn rejects_invalid_bind_address() -> TestResult {
    assert_invalid(
        parse_replacing("[server]\n", "[server]\nbind = \"not-an-address\"\n"),
        "invalid server.bind address",
    )
}

#[test]
fn rejects_non_http_login_url() -> TestResult {
    assert_invalid(
        parse_replacing("https://idp.example.org/login", "ftp://idp.example.org/login"),
        "identity.login_url must use http or https",
    )
}

#[test]
fn rejects_blank_auth_source() -> TestResult {
    assert_invalid(
        parse_replacing("auth_source = \"campus-idp\"", "auth_source = \"  \""),
        "identity.auth_source must be non-empty",
    )
}

#[test]
fn rejects_identity_timeout_out_of_range() -> TestResult {
    assert_invalid(
        parse_replacing("[identity]\n", "[identity]\ntimeout_ms = 50\n"),
        "identity.timeout_ms must be between",
    )?;
    assert_invalid(
        parse_replacing("[identity]\n", "[identity]\ntimeout_ms = 60000\n"),
        "identity.timeout_ms must be between",
    )
}

#[test]
fn rejects_uppercase_header_names() -> TestResult {
    assert_invalid(
        parse_replacing("[identity]\n", "[identity]\nauthenticated_header = \"X-Remote-User\"\n"),
        "identity.authenticated_header must use lowercase",
    )
}

#[test]
fn rejects_duplicate_survey_ids() -> TestResult {
    assert_invalid(parse_with("[[surveys]]\nid = \"42\"\n"), "duplicate survey id 42")
}

#[test]
fn rejects_survey_expiring_before_start() -> TestResult {
    assert_invalid(
        parse_with(
            "[[surveys]]\nid = \"9\"\nstart = \"2026-06-01T00:00:00Z\"\nexpires = \
             \"2026-01-01T00:00:00Z\"\n",
        ),
        "survey 9 expires before it starts",
    )
}

#[test]
fn rejects_invalid_survey_id() -> TestResult {
    assert_invalid(parse_with("[[surveys]]\nid = \"a b\"\n"), "contains invalid characters")
}

#[test]
fn rejects_token_limits() -> TestResult {
    assert_invalid(parse_with("[tokens]\nlength = 3\n"), "tokens.length must be between")?;
    assert_invalid(
        parse_with("[tokens]\nmax_create_attempts = 0\n"),
        "tokens.max_create_attempts must be between",
    )
}

#[test]
fn rejects_store_path_mismatches() -> TestResult {
    assert_invalid(
        parse_with("[token_store]\ntype = \"sqlite\"\n"),
        "sqlite token_store requires path",
    )?;
    assert_invalid(
        parse_with("[token_store]\ntype = \"memory\"\npath = \"tokens.sqlite\"\n"),
        "memory token_store must not set path",
    )
}

#[test]
fn sqlite_store_config_is_derived() -> TestResult {
    let config = parse_with("[token_store]\ntype = \"sqlite\"\npath = \"tokens.sqlite\"\n")
        .map_err(|err| err.to_string())?;
    let sqlite = config.token_store.sqlite_config().ok_or("sqlite config missing")?;
    if sqlite.path.to_string_lossy() != "tokens.sqlite" {
        return Err("sqlite path not carried".to_string());
    }
    Ok(())
}

#[test]
fn rejects_audit_path_mismatches() -> TestResult {
    assert_invalid(parse_with("[audit]\nsink = \"file\"\n"), "file audit sink requires path")?;
    assert_invalid(
        parse_with("[audit]\nsink = \"none\"\npath = \"audit.log\"\n"),
        "audit.path is only allowed for the file sink",
    )
}

#[test]
fn rejects_unknown_fields() -> TestResult {
    assert_invalid(parse_with("[tokens]\nalphabet = \"abc\"\n"), "unknown field")
}

#[test]
fn rejects_missing_identity_section() -> TestResult {
    assert_invalid(
        survey_gate_config::SurveyGateConfig::from_toml_str(
            "[server]\nsurvey_url = \"https://surveys.example.org/{survey_id}\"\n",
        ),
        "missing field `identity`",
    )
}
