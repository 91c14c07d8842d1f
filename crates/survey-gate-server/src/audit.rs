// crates/survey-gate-server/src/audit.rs
// ============================================================================
// Module: Survey Gate Audit Sinks
// Description: JSON-line audit sinks for gate outcomes.
// Purpose: Emit redacted audit logs without a logging framework.
// Dependencies: survey-gate-core, survey-gate-config, serde_json
// ============================================================================

//! ## Overview
//! Each gate outcome is written as one JSON object per line. Events carry a
//! hash of the visitor email and never raw attribute values. Write failures
//! are swallowed so auditing cannot change the gate outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use survey_gate_config::AuditConfig;
use survey_gate_config::AuditSinkType;
use survey_gate_core::AccessAuditEvent;
use survey_gate_core::AuditSink;
use survey_gate_core::NoopAuditSink;

/// Shared audit sink handle used by the gate.
pub type SharedAuditSink = Arc<dyn AuditSink + Send + Sync>;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the configured audit sink.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its log.
pub fn build_audit_sink(config: &AuditConfig) -> io::Result<SharedAuditSink> {
    match (config.sink, &config.path) {
        (AuditSinkType::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkType::None, _) => Ok(Arc::new(NoopAuditSink)),
        (AuditSinkType::File, Some(path)) => Ok(Arc::new(FileAuditSink::new(path)?)),
        (AuditSinkType::File, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "file audit sink requires path"))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use survey_gate_config::AuditConfig;
    use survey_gate_config::AuditSinkType;
    use survey_gate_core::AccessAuditEvent;
    use survey_gate_core::AuditOutcome;
    use survey_gate_core::AuditReason;
    use survey_gate_core::SurveyId;

    use super::build_audit_sink;

    /// Verifies the file sink writes one redacted JSON object per event.
    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let sink = build_audit_sink(&AuditConfig {
            sink: AuditSinkType::File,
            path: Some(path.clone()),
        })
        .unwrap();
        let event =
            AccessAuditEvent::new(SurveyId::new("42"), AuditOutcome::Denied, AuditReason::AttributeMismatch)
                .with_subject("ada@example.org");
        sink.record(&event);
        sink.record(&event);
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["event"], "survey_access");
        assert_eq!(value["outcome"], "denied");
        assert_eq!(value["reason"], "attribute_mismatch");
        assert!(!contents.contains("ada@example.org"));
    }

    /// Verifies a file sink without a path is rejected.
    #[test]
    fn file_sink_requires_path() {
        let result = build_audit_sink(&AuditConfig {
            sink: AuditSinkType::File,
            path: None,
        });
        assert!(result.is_err());
    }
}
