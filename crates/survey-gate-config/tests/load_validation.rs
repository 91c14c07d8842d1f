//! Config load validation tests for survey-gate-config.
// crates/survey-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

mod common;

use std::io::Write;
use std::path::Path;

use common::BASE_CONFIG;
use common::TestResult;
use common::assert_invalid;
use survey_gate_config::SurveyGateConfig;
use tempfile::NamedTempFile;

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(SurveyGateConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(SurveyGateConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(SurveyGateConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(SurveyGateConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(SurveyGateConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_reads_valid_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(BASE_CONFIG.as_bytes()).map_err(|err| err.to_string())?;
    let config = SurveyGateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.surveys.len() != 1 {
        return Err(format!("expected one survey, found {}", config.surveys.len()));
    }
    Ok(())
}
