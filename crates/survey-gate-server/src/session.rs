// crates/survey-gate-server/src/session.rs
// ============================================================================
// Module: Header Identity Session
// Description: Identity session read from reverse-proxy headers.
// Purpose: Turn trusted identity headers into gate session answers.
// Dependencies: survey-gate-core, survey-gate-config, axum
// ============================================================================

//! ## Overview
//! The reverse proxy authenticates the visitor with the identity provider
//! and forwards the result as headers: one header naming the authenticated
//! user and one header per asserted attribute, named
//! `<attribute_header_prefix><attribute>`. Header names arrive lowercased, so
//! attribute names known to the configuration (catalog keys and identity
//! mapping) are restored to their configured spelling.
//!
//! Security posture: attribute headers are ignored unless the authenticated
//! header is present; the proxy must strip client-supplied copies of both.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use survey_gate_config::IdentityConfig;
use survey_gate_config::SurveyGateConfig;
use survey_gate_core::IdentityAttributes;
use survey_gate_core::IdentitySession;
use survey_gate_core::SessionError;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Header layout and attribute name table shared by all requests.
#[derive(Debug, Clone)]
pub struct HeaderSessionReader {
    /// Identity configuration (headers, separator, login URL).
    identity: IdentityConfig,
    /// Configured attribute names keyed by their lowercase form.
    canonical: BTreeMap<String, String>,
}

impl HeaderSessionReader {
    /// Builds the reader from configuration.
    #[must_use]
    pub fn from_config(config: &SurveyGateConfig) -> Self {
        let mapping = &config.identity.mapping;
        let canonical = config
            .catalog_raw()
            .keys()
            .chain([&mapping.email, &mapping.first_name, &mapping.last_name])
            .map(|name| (name.to_ascii_lowercase(), name.clone()))
            .collect();
        Self {
            identity: config.identity.clone(),
            canonical,
        }
    }

    /// Returns the login URL for a return address.
    #[must_use]
    pub fn login_url(&self, return_to: &str) -> String {
        self.identity.login_url_for(return_to)
    }

    /// Restores the configured spelling of a lowercase attribute name.
    fn attribute_name(&self, lowered: &str) -> String {
        self.canonical.get(lowered).cloned().unwrap_or_else(|| lowered.to_string())
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Identity session captured from one request's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderIdentitySession {
    /// Whether the proxy marked the visitor as authenticated.
    authenticated: bool,
    /// Asserted attributes.
    attributes: IdentityAttributes,
    /// Login URL returning to the requested survey.
    login_url: String,
}

impl HeaderIdentitySession {
    /// Captures the session from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, reader: &HeaderSessionReader, return_to: &str) -> Self {
        let identity = &reader.identity;
        let authenticated = headers
            .get(identity.authenticated_header.as_str())
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| !value.trim().is_empty());
        let attributes =
            if authenticated { read_attributes(headers, reader) } else { IdentityAttributes::new() };
        Self {
            authenticated,
            attributes,
            login_url: reader.login_url(return_to),
        }
    }
}

impl IdentitySession for HeaderIdentitySession {
    fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.authenticated)
    }

    fn attributes(&self) -> Result<IdentityAttributes, SessionError> {
        Ok(self.attributes.clone())
    }

    fn login_url(&self) -> String {
        self.login_url.clone()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Collects prefixed attribute headers into identity attributes.
fn read_attributes(headers: &HeaderMap, reader: &HeaderSessionReader) -> IdentityAttributes {
    let prefix = reader.identity.attribute_header_prefix.as_str();
    let separator = reader.identity.value_separator.as_str();
    let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        let Some(suffix) = name.as_str().strip_prefix(prefix) else {
            continue;
        };
        if suffix.is_empty() {
            continue;
        }
        // Non-visible-ASCII header values are dropped.
        let Ok(text) = value.to_str() else {
            continue;
        };
        let values = collected.entry(reader.attribute_name(suffix)).or_default();
        values.extend(
            text.split(separator).map(str::trim).filter(|part| !part.is_empty()).map(String::from),
        );
    }
    IdentityAttributes::from(collected)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
