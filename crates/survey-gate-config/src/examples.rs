// crates/survey-gate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration for Survey Gate.
// Purpose: Seed new deployments and keep docs aligned with validation.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The example below must always load through
//! [`crate::SurveyGateConfig::from_toml_str`] and activate cleanly; the test
//! suite enforces both.

// ============================================================================
// SECTION: Example
// ============================================================================

/// Canonical `survey-gate.toml` example.
const CONFIG_TOML_EXAMPLE: &str = r#"# survey-gate.toml
[server]
bind = "127.0.0.1:8088"
survey_url = "https://surveys.example.org/index.php/{survey_id}"

[identity]
auth_source = "campus-idp"
login_url = "https://idp.example.org/login?source={auth_source}&return={return_to}"
authenticated_header = "x-remote-user"
attribute_header_prefix = "x-idp-"
value_separator = ";"
timeout_ms = 2000
empty_attributes = "deny"

[identity.mapping]
email = "mail"
first_name = "givenName"
last_name = "sn"

[catalog.department]
label = "Department"
help = "Restrict the survey to one department."
options = ["cs", "math", "physics"]

[catalog.role]
label = "Role"
help = "Restrict the survey to one affiliation."
options = ["student", "staff", "faculty"]

[[surveys]]
id = "42"
enabled = true
language = "en"
admin_name = "Survey Office"
admin_email = "surveys@example.org"
expires = "2027-06-30T23:59:59Z"

[surveys.required]
department = "cs"
role = "none"

[token_store]
type = "sqlite"
path = "survey-gate-tokens.sqlite"
journal_mode = "wal"
sync_mode = "full"

[tokens]
length = 15
max_create_attempts = 3

[audit]
sink = "stderr"
"#;

/// Returns the canonical example configuration.
#[must_use]
pub fn config_toml_example() -> String {
    CONFIG_TOML_EXAMPLE.to_string()
}
