// crates/survey-gate-server/src/render.rs
// ============================================================================
// Module: HTML Denial Renderer
// Description: Renders the access-denied page for the gate.
// Purpose: Show required and received attributes plus the admin contact.
// Dependencies: survey-gate-core
// ============================================================================

//! ## Overview
//! The denial page lists every constrained requirement and the values the
//! visitor presented for those keys, then asks the visitor to contact the
//! survey administrator. When the identity provider released no email, the
//! page names the missing attribute instead of an attribute mismatch. `{ADMINNAME}` and `{ADMINEMAIL}` in the contact
//! message are replaced with the survey's admin contact. Every value placed
//! in the page is HTML-escaped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write;

use survey_gate_core::AttributeKey;
use survey_gate_core::DenialCause;
use survey_gate_core::DenialRenderer;
use survey_gate_core::DenialView;
use survey_gate_core::RenderError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder replaced by the administrator name.
const ADMIN_NAME_PLACEHOLDER: &str = "{ADMINNAME}";
/// Placeholder replaced by the administrator email.
const ADMIN_EMAIL_PLACEHOLDER: &str = "{ADMINEMAIL}";
/// Default contact message.
const DEFAULT_CONTACT_MESSAGE: &str =
    "Please contact the survey administrator: {ADMINNAME} ({ADMINEMAIL})";

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Renders a self-contained HTML denial page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDenialRenderer {
    /// Contact message template with admin placeholders.
    contact_message: String,
}

impl Default for HtmlDenialRenderer {
    fn default() -> Self {
        Self {
            contact_message: DEFAULT_CONTACT_MESSAGE.to_string(),
        }
    }
}

impl HtmlDenialRenderer {
    /// Creates a renderer with a custom contact message template.
    #[must_use]
    pub fn with_contact_message(contact_message: impl Into<String>) -> Self {
        Self {
            contact_message: contact_message.into(),
        }
    }

    /// Expands the contact message for a view.
    fn contact_line(&self, view: &DenialView) -> String {
        escape_html(&self.contact_message)
            .replace(ADMIN_NAME_PLACEHOLDER, &escape_html(&view.admin_name))
            .replace(ADMIN_EMAIL_PLACEHOLDER, &escape_html(&view.admin_email))
    }
}

impl DenialRenderer for HtmlDenialRenderer {
    fn render(&self, view: &DenialView) -> Result<String, RenderError> {
        let mut page = String::new();
        write_page(&mut page, view, &self.contact_line(view))
            .map_err(|_| RenderError("denial page formatting failed".to_string()))?;
        Ok(page)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes the full page into `out`.
fn write_page(out: &mut String, view: &DenialView, contact: &str) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"{}\">", escape_html(&view.language))?;
    writeln!(out, "<head><meta charset=\"utf-8\"><title>Survey access not permitted</title></head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div id=\"wrapper\" class=\"message tokenmessage\">")?;
    writeln!(out, "<h3>Access to this survey is not permitted.</h3>")?;
    if let DenialCause::MissingEmail {
        attribute,
    } = &view.cause
    {
        writeln!(
            out,
            "<p>Your identity provider did not release an email address (attribute {}).</p>",
            escape_html(attribute.as_str())
        )?;
    }
    writeln!(out, "<p>Required user information:</p>")?;
    write_pairs(out, &view.required)?;
    writeln!(out, "<p>Received user information:</p>")?;
    write_pairs(out, &view.received)?;
    writeln!(out, "<p>{contact}</p>")?;
    writeln!(out, "</div>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

/// Writes a `key = "value"` list.
fn write_pairs(out: &mut String, pairs: &BTreeMap<AttributeKey, String>) -> std::fmt::Result {
    writeln!(out, "<ul>")?;
    for (key, value) in pairs {
        writeln!(
            out,
            "<li>{} = &quot;{}&quot;</li>",
            escape_html(key.as_str()),
            escape_html(value)
        )?;
    }
    writeln!(out, "</ul>")
}

/// Escapes text for HTML element and attribute content.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
