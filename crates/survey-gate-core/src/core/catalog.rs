// crates/survey-gate-core/src/core/catalog.rs
// ============================================================================
// Module: Survey Gate Attribute Catalog
// Description: Administrator-defined universe of recognized identity attributes.
// Purpose: Decode raw catalog blobs into validated, typed catalog entries.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The attribute catalog lists every identity attribute a survey may
//! constrain, along with the label, help text, and enumerated options an
//! administrator picks from. Catalogs arrive as loosely structured blobs, so
//! decoding happens in two explicit steps: [`RawCatalogEntry`] accepts missing
//! fields, and [`AttributeCatalog::from_raw`] validates them. A failed
//! validation names the offending key and must block survey activation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::AttributeKey;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog validation errors.
///
/// # Invariants
/// - Every field-level variant carries the offending catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A required entry field is absent.
    #[error("problem on attribute '{key}': {field} is missing (entries require label, help, and options)")]
    MissingField {
        /// Offending catalog key.
        key: String,
        /// Missing field name.
        field: &'static str,
    },
    /// A required entry field is present but empty.
    #[error("problem on attribute '{key}': {field} must not be empty")]
    EmptyField {
        /// Offending catalog key.
        key: String,
        /// Empty field name.
        field: &'static str,
    },
    /// An option value is blank.
    #[error("problem on attribute '{key}': options must not contain blank values")]
    BlankOption {
        /// Offending catalog key.
        key: String,
    },
    /// The catalog key itself is blank.
    #[error("catalog contains an attribute with a blank key")]
    BlankKey,
    /// The serialized catalog could not be decoded.
    #[error("catalog decode error: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Returns the offending key when the error is tied to one entry.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingField {
                key, ..
            }
            | Self::EmptyField {
                key, ..
            }
            | Self::BlankOption {
                key,
            } => Some(key),
            Self::BlankKey | Self::Decode(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Raw Entries
// ============================================================================

/// Catalog entry as stored, before validation.
///
/// Every field is optional here so that an incomplete entry is reported by
/// [`AttributeCatalog::from_raw`] with its key instead of failing decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCatalogEntry {
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Help text shown next to the survey setting.
    #[serde(default)]
    pub help: Option<String>,
    /// Acceptable option values, in display order.
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

// ============================================================================
// SECTION: Validated Catalog
// ============================================================================

/// Validated catalog entry.
///
/// # Invariants
/// - `label` and `help` are non-empty.
/// - `options` is non-empty and contains no blank values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeCatalogEntry {
    /// Catalog key.
    pub key: AttributeKey,
    /// Display label.
    pub label: String,
    /// Help text.
    pub help: String,
    /// Acceptable option values, in display order.
    pub options: Vec<String>,
}

impl AttributeCatalogEntry {
    /// Returns true when `value` is one of the entry's options.
    #[must_use]
    pub fn offers(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }
}

/// Validated attribute catalog keyed by attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeCatalog {
    /// Validated entries keyed by attribute.
    entries: BTreeMap<AttributeKey, AttributeCatalogEntry>,
}

impl AttributeCatalog {
    /// Validates raw entries and builds a catalog.
    ///
    /// Entries are checked in key order and the first failing entry aborts
    /// validation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] identifying the first invalid entry.
    pub fn from_raw(raw: &BTreeMap<String, RawCatalogEntry>) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();
        for (key, entry) in raw {
            let validated = validate_entry(key, entry)?;
            entries.insert(validated.key.clone(), validated);
        }
        Ok(Self {
            entries,
        })
    }

    /// Decodes and validates a JSON catalog object.
    ///
    /// A JSON `null` or non-object document decodes to an empty catalog,
    /// matching how unset catalog settings are treated.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the blob is malformed or any entry is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|err| CatalogError::Decode(err.to_string()))?;
        if !value.is_object() {
            return Ok(Self::default());
        }
        let raw: BTreeMap<String, RawCatalogEntry> =
            serde_json::from_value(value).map_err(|err| CatalogError::Decode(err.to_string()))?;
        Self::from_raw(&raw)
    }

    /// Returns the entry for a key, if present.
    #[must_use]
    pub fn entry(&self, key: &AttributeKey) -> Option<&AttributeCatalogEntry> {
        self.entries.get(key)
    }

    /// Iterates catalog keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &AttributeKey> {
        self.entries.keys()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validates a single raw entry.
fn validate_entry(key: &str, entry: &RawCatalogEntry) -> Result<AttributeCatalogEntry, CatalogError> {
    if key.trim().is_empty() {
        return Err(CatalogError::BlankKey);
    }
    let label = required_text(key, "label", entry.label.as_deref())?;
    let options = entry.options.as_ref().ok_or_else(|| CatalogError::MissingField {
        key: key.to_string(),
        field: "options",
    })?;
    let help = required_text(key, "help", entry.help.as_deref())?;
    if options.is_empty() {
        return Err(CatalogError::EmptyField {
            key: key.to_string(),
            field: "options",
        });
    }
    if options.iter().any(|option| option.trim().is_empty()) {
        return Err(CatalogError::BlankOption {
            key: key.to_string(),
        });
    }
    Ok(AttributeCatalogEntry {
        key: AttributeKey::new(key),
        label,
        help,
        options: options.clone(),
    })
}

/// Returns a trimmed-non-empty text field or the matching error.
fn required_text(
    key: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<String, CatalogError> {
    let Some(value) = value else {
        return Err(CatalogError::MissingField {
            key: key.to_string(),
            field,
        });
    };
    if value.trim().is_empty() {
        return Err(CatalogError::EmptyField {
            key: key.to_string(),
            field,
        });
    }
    Ok(value.to_string())
}
