// crates/survey-gate-config/src/config.rs
// ============================================================================
// Module: Survey Gate Configuration
// Description: Configuration loading and validation for Survey Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: survey-gate-core, survey-gate-store-sqlite, serde, time, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. The attribute catalog is
//! decoded raw here and validated at survey activation, so an incomplete
//! entry is reported with its key instead of as a parse error.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use survey_gate_core::AdminContact;
use survey_gate_core::EmptyAttributesPolicy;
use survey_gate_core::IdentityMapping;
use survey_gate_core::RawCatalogEntry;
use survey_gate_core::SurveyId;
use survey_gate_core::SurveyLinkBuilder;
use survey_gate_core::SurveyRecord;
use survey_gate_core::SurveyRequirement;
use survey_gate_core::SurveySchedule;
use survey_gate_store_sqlite::SqliteStoreConfig;
use survey_gate_store_sqlite::SqliteStoreMode;
use survey_gate_store_sqlite::SqliteSyncMode;
use thiserror::Error;
use time::OffsetDateTime;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "survey-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SURVEY_GATE_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default HTTP bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8088";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Default identity session timeout in milliseconds.
const DEFAULT_IDENTITY_TIMEOUT_MS: u64 = 2_000;
/// Minimum identity session timeout in milliseconds.
const MIN_IDENTITY_TIMEOUT_MS: u64 = 100;
/// Maximum identity session timeout in milliseconds.
const MAX_IDENTITY_TIMEOUT_MS: u64 = 30_000;
/// Default access token length.
const DEFAULT_TOKEN_LENGTH: usize = 15;
/// Minimum access token length.
const MIN_TOKEN_LENGTH: usize = 5;
/// Maximum access token length.
const MAX_TOKEN_LENGTH: usize = 64;
/// Default token creation attempts.
const DEFAULT_MAX_CREATE_ATTEMPTS: u32 = 3;
/// Maximum token creation attempts.
const MAX_CREATE_ATTEMPTS: u32 = 10;
/// Default busy timeout for the sqlite token store.
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum number of configured surveys.
const MAX_SURVEYS: usize = 1_024;
/// Maximum length of a header name.
const MAX_HEADER_NAME_LENGTH: usize = 128;
/// Placeholder replaced by the identity auth source.
pub const AUTH_SOURCE_PLACEHOLDER: &str = "{auth_source}";
/// Placeholder replaced by the URL-encoded return address.
pub const RETURN_TO_PLACEHOLDER: &str = "{return_to}";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Survey Gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyGateConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Identity session configuration.
    pub identity: IdentityConfig,
    /// Raw attribute catalog keyed by attribute.
    #[serde(default)]
    pub catalog: BTreeMap<String, RawCatalogEntry>,
    /// Survey gating entries.
    #[serde(default)]
    pub surveys: Vec<SurveyConfig>,
    /// Participant token store configuration.
    #[serde(default)]
    pub token_store: TokenStoreConfig,
    /// Token generation configuration.
    #[serde(default)]
    pub tokens: TokensConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl SurveyGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path("config path", &resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.identity.validate()?;
        self.token_store.validate()?;
        self.tokens.validate()?;
        self.audit.validate()?;
        if self.surveys.len() > MAX_SURVEYS {
            return Err(ConfigError::Invalid(format!("at most {MAX_SURVEYS} surveys allowed")));
        }
        let mut seen = BTreeSet::new();
        for survey in &self.surveys {
            survey.validate()?;
            if !seen.insert(survey.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate survey id {}", survey.id)));
            }
        }
        Ok(())
    }

    /// Returns the survey entry for an id.
    #[must_use]
    pub fn survey(&self, survey_id: &SurveyId) -> Option<&SurveyConfig> {
        self.surveys.iter().find(|survey| survey.id == survey_id.as_str())
    }

    /// Returns the raw catalog entries.
    #[must_use]
    pub const fn catalog_raw(&self) -> &BTreeMap<String, RawCatalogEntry> {
        &self.catalog
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP forward-auth server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Survey entry URL template containing `{survey_id}`.
    pub survey_url: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid server.bind address {}", self.bind)))
    }

    /// Builds the survey link builder for the configured template.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the template is unusable.
    pub fn link_builder(&self) -> Result<SurveyLinkBuilder, ConfigError> {
        SurveyLinkBuilder::new(self.survey_url.clone())
            .map_err(|err| ConfigError::Invalid(format!("server.survey_url: {err}")))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        self.link_builder()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Identity session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Authentication source identifier at the identity provider.
    pub auth_source: String,
    /// Login URL template with `{auth_source}` and `{return_to}` placeholders.
    pub login_url: String,
    /// Header set by the proxy when the visitor is authenticated.
    #[serde(default = "default_authenticated_header")]
    pub authenticated_header: String,
    /// Prefix of headers carrying asserted attributes.
    #[serde(default = "default_attribute_header_prefix")]
    pub attribute_header_prefix: String,
    /// Separator between multiple values in one attribute header.
    #[serde(default = "default_value_separator")]
    pub value_separator: String,
    /// Time budget for each identity session query, in milliseconds.
    #[serde(default = "default_identity_timeout_ms")]
    pub timeout_ms: u64,
    /// Handling of sessions that returned no attributes.
    #[serde(default)]
    pub empty_attributes: EmptyAttributesPolicy,
    /// Attribute names for participant email and names.
    #[serde(default)]
    pub mapping: IdentityMapping,
}

impl IdentityConfig {
    /// Returns the session query time budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Expands the login URL for a return address.
    #[must_use]
    pub fn login_url_for(&self, return_to: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
        self.login_url
            .replace(AUTH_SOURCE_PLACEHOLDER, &self.auth_source)
            .replace(RETURN_TO_PLACEHOLDER, &encoded)
    }

    /// Validates identity configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let auth_source = self.auth_source.trim();
        if auth_source.is_empty() {
            return Err(ConfigError::Invalid("identity.auth_source must be non-empty".to_string()));
        }
        if !auth_source.chars().all(|ch| ch.is_ascii_alphanumeric() || "-_.:".contains(ch)) {
            return Err(ConfigError::Invalid(
                "identity.auth_source contains invalid characters".to_string(),
            ));
        }
        let sample = self.login_url_for("https://survey.invalid/");
        let parsed = Url::parse(&sample)
            .map_err(|err| ConfigError::Invalid(format!("identity.login_url: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "identity.login_url must use http or https".to_string(),
            ));
        }
        validate_header_name("identity.authenticated_header", &self.authenticated_header)?;
        validate_header_name("identity.attribute_header_prefix", &self.attribute_header_prefix)?;
        if self.value_separator.is_empty() {
            return Err(ConfigError::Invalid(
                "identity.value_separator must be non-empty".to_string(),
            ));
        }
        if !(MIN_IDENTITY_TIMEOUT_MS ..= MAX_IDENTITY_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "identity.timeout_ms must be between {MIN_IDENTITY_TIMEOUT_MS} and \
                 {MAX_IDENTITY_TIMEOUT_MS}"
            )));
        }
        for (field, value) in [
            ("identity.mapping.email", &self.mapping.email),
            ("identity.mapping.first_name", &self.mapping.first_name),
            ("identity.mapping.last_name", &self.mapping.last_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Surveys
// ============================================================================

/// Per-survey gating configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyConfig {
    /// Survey identifier.
    pub id: String,
    /// Whether the identity gate is active.
    #[serde(default)]
    pub enabled: bool,
    /// Default survey language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Administrator display name for the denial page.
    #[serde(default)]
    pub admin_name: String,
    /// Administrator email for the denial page.
    #[serde(default)]
    pub admin_email: String,
    /// Survey start; bounds new tokens' validity.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    /// Survey expiry; bounds new tokens' validity.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
    /// Required value per catalog key (`"none"` leaves a key unconstrained).
    #[serde(default)]
    pub required: BTreeMap<String, String>,
}

impl SurveyConfig {
    /// Returns the survey identifier.
    #[must_use]
    pub fn survey_id(&self) -> SurveyId {
        SurveyId::new(self.id.clone())
    }

    /// Returns the typed access requirement.
    #[must_use]
    pub fn requirement(&self) -> SurveyRequirement {
        self.required.iter().fold(
            SurveyRequirement::new(self.survey_id(), self.enabled),
            |requirement, (key, value)| requirement.with(key.as_str(), value.as_str()),
        )
    }

    /// Returns the survey validity window.
    #[must_use]
    pub const fn schedule(&self) -> SurveySchedule {
        SurveySchedule {
            start: self.start,
            expires: self.expires,
        }
    }

    /// Returns the gate record for the survey.
    #[must_use]
    pub fn record(&self) -> SurveyRecord {
        SurveyRecord {
            requirement: self.requirement(),
            schedule: self.schedule(),
            admin: AdminContact {
                name: self.admin_name.clone(),
                email: self.admin_email.clone(),
            },
            language: self.language.clone(),
        }
    }

    /// Validates survey configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let id = self.id.trim();
        if id.is_empty() || id.len() > 64 {
            return Err(ConfigError::Invalid("surveys.id must be 1-64 characters".to_string()));
        }
        if !id.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
            return Err(ConfigError::Invalid(format!("survey id {id} contains invalid characters")));
        }
        let language = self.language.trim();
        if language.is_empty()
            || language.len() > 16
            || !language.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(ConfigError::Invalid(format!("survey {id} has an invalid language")));
        }
        if !self.admin_email.is_empty() && !self.admin_email.contains('@') {
            return Err(ConfigError::Invalid(format!("survey {id} admin_email is not an address")));
        }
        if let (Some(start), Some(expires)) = (self.start, self.expires)
            && expires < start
        {
            return Err(ConfigError::Invalid(format!("survey {id} expires before it starts")));
        }
        for (key, value) in &self.required {
            if key.trim().is_empty() || value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "survey {id} has a blank required key or value"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Token Store
// ============================================================================

/// Participant token store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenStoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: TokenStoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            store_type: TokenStoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl TokenStoreConfig {
    /// Returns the `SQLite` store config when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (TokenStoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }

    /// Validates token store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            TokenStoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory token_store must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            TokenStoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite token_store requires path".to_string())
                })?;
                validate_path("token_store.path", path)
            }
        }
    }
}

/// Participant token store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenStoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use `SQLite`-backed durable store.
    Sqlite,
}

// ============================================================================
// SECTION: Tokens
// ============================================================================

/// Token generation configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokensConfig {
    /// Access token length in characters.
    #[serde(default = "default_token_length")]
    pub length: usize,
    /// Find-or-create rounds before giving up.
    #[serde(default = "default_max_create_attempts")]
    pub max_create_attempts: u32,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            length: default_token_length(),
            max_create_attempts: default_max_create_attempts(),
        }
    }
}

impl TokensConfig {
    /// Validates token configuration.
    fn validate(self) -> Result<(), ConfigError> {
        if !(MIN_TOKEN_LENGTH ..= MAX_TOKEN_LENGTH).contains(&self.length) {
            return Err(ConfigError::Invalid(format!(
                "tokens.length must be between {MIN_TOKEN_LENGTH} and {MAX_TOKEN_LENGTH}"
            )));
        }
        if !(1 ..= MAX_CREATE_ATTEMPTS).contains(&self.max_create_attempts) {
            return Err(ConfigError::Invalid(format!(
                "tokens.max_create_attempts must be between 1 and {MAX_CREATE_ATTEMPTS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Audit sink type.
    #[serde(default)]
    pub sink: AuditSinkType,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkType::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
            (AuditSinkType::File, Some(path)) => validate_path("audit.path", path),
            (AuditSinkType::Stderr | AuditSinkType::None, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only allowed for the file sink".to_string(),
            )),
            (AuditSinkType::Stderr | AuditSinkType::None, None) => Ok(()),
        }
    }
}

/// Audit sink type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkType {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(label: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{label} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{label} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{label} component too long")));
        }
    }
    Ok(())
}

/// Validates a lowercase HTTP header name or prefix.
fn validate_header_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.len() > MAX_HEADER_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} must be 1-{MAX_HEADER_NAME_LENGTH} bytes")));
    }
    if !value.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-') {
        return Err(ConfigError::Invalid(format!(
            "{field} must use lowercase letters, digits, and hyphens"
        )));
    }
    Ok(())
}

/// Default HTTP bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size in bytes.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default authenticated-user header.
fn default_authenticated_header() -> String {
    "x-remote-user".to_string()
}

/// Default attribute header prefix.
fn default_attribute_header_prefix() -> String {
    "x-idp-".to_string()
}

/// Default multi-value separator.
fn default_value_separator() -> String {
    ";".to_string()
}

/// Default identity session timeout.
const fn default_identity_timeout_ms() -> u64 {
    DEFAULT_IDENTITY_TIMEOUT_MS
}

/// Default survey language.
fn default_language() -> String {
    "en".to_string()
}

/// Default token store busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Default access token length.
const fn default_token_length() -> usize {
    DEFAULT_TOKEN_LENGTH
}

/// Default token creation attempts.
const fn default_max_create_attempts() -> u32 {
    DEFAULT_MAX_CREATE_ATTEMPTS
}
