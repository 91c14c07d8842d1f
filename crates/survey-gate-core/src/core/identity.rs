// crates/survey-gate-core/src/core/identity.rs
// ============================================================================
// Module: Survey Gate Identity Attributes
// Description: Request-scoped attribute snapshots and participant identity.
// Purpose: Carry what the identity provider vouched for into the engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`IdentityAttributes`] is an immutable snapshot of the attributes an
//! identity session returned for the current request. Only the first value of
//! each attribute carries meaning for access decisions and participant
//! identity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identity Attributes
// ============================================================================

/// Attributes asserted by the identity provider, keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityAttributes(BTreeMap<String, Vec<String>>);

impl IdentityAttributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces the values for an attribute (builder style).
    #[must_use]
    pub fn with<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.insert(key, values);
        self
    }

    /// Adds or replaces the values for an attribute.
    pub fn insert<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.0.insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Returns all values for an attribute.
    #[must_use]
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Returns the first value for an attribute, if one was asserted.
    #[must_use]
    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    /// Returns true when the provider returned no attributes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, Vec<String>>> for IdentityAttributes {
    fn from(value: BTreeMap<String, Vec<String>>) -> Self {
        Self(value)
    }
}

// ============================================================================
// SECTION: Participant Identity
// ============================================================================

/// Attribute names used to build a participant identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityMapping {
    /// Attribute holding the participant email.
    #[serde(default = "default_email_attribute")]
    pub email: String,
    /// Attribute holding the given name.
    #[serde(default = "default_first_name_attribute")]
    pub first_name: String,
    /// Attribute holding the surname.
    #[serde(default = "default_last_name_attribute")]
    pub last_name: String,
}

impl Default for IdentityMapping {
    fn default() -> Self {
        Self {
            email: default_email_attribute(),
            first_name: default_first_name_attribute(),
            last_name: default_last_name_attribute(),
        }
    }
}

/// Default email attribute name.
fn default_email_attribute() -> String {
    "mail".to_string()
}

/// Default given-name attribute name.
fn default_first_name_attribute() -> String {
    "givenName".to_string()
}

/// Default surname attribute name.
fn default_last_name_attribute() -> String {
    "sn".to_string()
}

/// Participant identity copied into newly created tokens.
///
/// # Invariants
/// - `email` is the case-sensitive token key, exactly as presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantIdentity {
    /// Participant email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Surname.
    pub last_name: String,
    /// Preferred survey language, when known.
    pub language: Option<String>,
}

impl ParticipantIdentity {
    /// Builds an identity from the first values of the mapped attributes.
    ///
    /// Missing or empty attributes become empty strings.
    #[must_use]
    pub fn from_attributes(
        attributes: &IdentityAttributes,
        mapping: &IdentityMapping,
        language: Option<String>,
    ) -> Self {
        let read = |key: &str| attributes.first_value(key).unwrap_or_default().to_string();
        Self {
            email: read(&mapping.email),
            first_name: read(&mapping.first_name),
            last_name: read(&mapping.last_name),
            language,
        }
    }

    /// Returns true when the identity can key a participant token.
    #[must_use]
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}
