// crates/survey-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for survey-gate-config tests.
// Purpose: Build minimal valid configs and assert validation failures.
// =============================================================================

#![allow(dead_code, reason = "Each test binary uses a subset of the helpers.")]

use survey_gate_config::ConfigError;
use survey_gate_config::SurveyGateConfig;

/// Result type for tests that report failures as messages.
pub type TestResult = Result<(), String>;

/// Minimal valid configuration with one gated survey.
pub const BASE_CONFIG: &str = r#"
[server]
survey_url = "https://surveys.example.org/index.php/{survey_id}"

[identity]
auth_source = "campus-idp"
login_url = "https://idp.example.org/login?source={auth_source}&return={return_to}"

[catalog.department]
label = "Department"
help = "Restrict by department."
options = ["cs", "math"]

[[surveys]]
id = "42"
enabled = true

[surveys.required]
department = "cs"
"#;

/// Parses `BASE_CONFIG` with `extra` appended.
pub fn parse_with(extra: &str) -> Result<SurveyGateConfig, ConfigError> {
    SurveyGateConfig::from_toml_str(&format!("{BASE_CONFIG}\n{extra}"))
}

/// Asserts the result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err(format!("expected invalid config containing {needle}")),
    }
}

/// Parses `BASE_CONFIG` with one substring replaced.
pub fn parse_replacing(from: &str, to: &str) -> Result<SurveyGateConfig, ConfigError> {
    SurveyGateConfig::from_toml_str(&BASE_CONFIG.replace(from, to))
}
