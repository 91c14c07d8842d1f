// crates/survey-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Participant Token Store
// Description: Durable ParticipantTokenStore backed by SQLite WAL.
// Purpose: Persist participant tokens with database-enforced uniqueness.
// Dependencies: survey-gate-core, rusqlite, serde, thiserror, time
// ============================================================================

//! ## Overview
//! This module implements a durable [`ParticipantTokenStore`] using `SQLite`.
//! Token creation checks for an existing `(survey_id, email)` record and
//! inserts inside one `BEGIN IMMEDIATE` transaction; the unique constraints
//! back that check up when another writer slips past it. Loads fail closed
//! on rows that do not decode.
//! Security posture: database contents are untrusted.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use survey_gate_core::AccessToken;
use survey_gate_core::EmailStatus;
use survey_gate_core::NewParticipantToken;
use survey_gate_core::ParticipantToken;
use survey_gate_core::ParticipantTokenStore;
use survey_gate_core::StoreError;
use survey_gate_core::SurveyId;
use survey_gate_core::TokenStatus;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Column list shared by token queries.
const TOKEN_COLUMNS: &str = "token_id, survey_id, email, first_name, last_name, language, \
                             email_status, valid_from, valid_until, token, status";

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Rollback journal deleted after each transaction.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` participant token store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row could not be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A token already exists for the `(survey, email)` pair.
    #[error("participant token already exists for survey {0}")]
    Conflict(String),
    /// The token string is already issued for the survey.
    #[error("access token collision for survey {0}")]
    TokenCollision(String),
    /// The survey has no prepared token storage.
    #[error("no token storage prepared for survey {0}")]
    MissingSurvey(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(survey_id) => Self::Conflict {
                survey_id,
            },
            SqliteStoreError::TokenCollision(survey_id) => Self::TokenCollision {
                survey_id,
            },
            SqliteStoreError::MissingSurvey(survey_id) => Self::MissingSurvey(survey_id),
        }
    }
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed participant token store with WAL support.
#[derive(Clone)]
pub struct SqliteParticipantTokenStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteParticipantTokenStore {
    /// Opens an `SQLite`-backed participant token store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Lists every token for a survey ordered by record id.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails or a row is corrupt.
    pub fn list_tokens(
        &self,
        survey_id: &SurveyId,
    ) -> Result<Vec<ParticipantToken>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(&format!(
                "SELECT {TOKEN_COLUMNS} FROM participant_tokens WHERE survey_id = ?1 ORDER BY \
                 token_id"
            ))
            .map_err(db_error)?;
        let rows = statement
            .query_map(params![survey_id.as_str()], read_row)
            .map_err(db_error)?;
        let mut tokens = Vec::new();
        for row in rows {
            tokens.push(decode_row(row.map_err(db_error)?)?);
        }
        Ok(tokens)
    }

    /// Returns true when token storage exists for the survey.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn is_prepared(&self, survey_id: &SurveyId) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        survey_prepared(&guard, survey_id)
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Registers the survey as prepared.
    fn prepare_survey(&self, survey_id: &SurveyId) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT OR IGNORE INTO surveys (survey_id, prepared_at) VALUES (?1, ?2)",
                params![survey_id.as_str(), unix_millis()],
            )
            .map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    /// Loads the token for a survey and email.
    fn load_token(
        &self,
        survey_id: &SurveyId,
        email: &str,
    ) -> Result<Option<ParticipantToken>, SqliteStoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                &format!(
                    "SELECT {TOKEN_COLUMNS} FROM participant_tokens WHERE survey_id = ?1 AND \
                     email = ?2"
                ),
                params![survey_id.as_str(), email],
                read_row,
            )
            .optional()
            .map_err(db_error)?;
        drop(guard);
        row.map(decode_row).transpose()
    }

    /// Inserts a token if the `(survey, email)` pair and token are free.
    fn insert_token(
        &self,
        record: NewParticipantToken,
    ) -> Result<ParticipantToken, SqliteStoreError> {
        let survey = record.survey_id.as_str().to_string();
        let valid_from = format_timestamp(record.valid_from)?;
        let valid_until = format_timestamp(record.valid_until)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate).map_err(db_error)?;
        if !survey_prepared(&tx, &record.survey_id)? {
            return Err(SqliteStoreError::MissingSurvey(survey));
        }
        let email_taken: Option<i64> = tx
            .query_row(
                "SELECT token_id FROM participant_tokens WHERE survey_id = ?1 AND email = ?2",
                params![survey, record.email],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        if email_taken.is_some() {
            return Err(SqliteStoreError::Conflict(survey));
        }
        let token_taken: Option<i64> = tx
            .query_row(
                "SELECT token_id FROM participant_tokens WHERE survey_id = ?1 AND token = ?2",
                params![survey, record.token.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        if token_taken.is_some() {
            return Err(SqliteStoreError::TokenCollision(survey));
        }
        tx.execute(
            "INSERT INTO participant_tokens (survey_id, email, first_name, last_name, language, \
             email_status, valid_from, valid_until, token, status, created_at) VALUES (?1, ?2, \
             ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                survey,
                record.email,
                record.first_name,
                record.last_name,
                record.language,
                record.email_status.as_str(),
                valid_from,
                valid_until,
                record.token.as_str(),
                TokenStatus::Active.as_str(),
                unix_millis()
            ],
        )
        .map_err(|err| insert_error(err, &survey))?;
        let row_id = tx.last_insert_rowid();
        tx.commit().map_err(db_error)?;
        drop(guard);
        let token_id = u64::try_from(row_id)
            .map_err(|_| SqliteStoreError::Corrupt(format!("negative token_id {row_id}")))?;
        Ok(ParticipantToken::from_new(token_id, record))
    }
}

impl ParticipantTokenStore for SqliteParticipantTokenStore {
    fn ensure_survey(&self, survey_id: &SurveyId) -> Result<(), StoreError> {
        self.prepare_survey(survey_id).map_err(StoreError::from)
    }

    fn find(
        &self,
        survey_id: &SurveyId,
        email: &str,
    ) -> Result<Option<ParticipantToken>, StoreError> {
        self.load_token(survey_id, email).map_err(StoreError::from)
    }

    fn insert(&self, record: NewParticipantToken) -> Result<ParticipantToken, StoreError> {
        self.insert_token(record).map_err(StoreError::from)
    }
}

// ============================================================================//
// SECTION: Row Decoding
// ============================================================================//

/// Raw column values of one token row.
struct TokenRow {
    /// Record identifier.
    token_id: i64,
    /// Survey identifier.
    survey_id: String,
    /// Participant email.
    email: String,
    /// Given name.
    first_name: String,
    /// Surname.
    last_name: String,
    /// Token language.
    language: Option<String>,
    /// Email status label.
    email_status: String,
    /// RFC 3339 validity start.
    valid_from: Option<String>,
    /// RFC 3339 validity end.
    valid_until: Option<String>,
    /// Access token.
    token: String,
    /// Token status label.
    status: String,
}

/// Reads raw columns from a token row.
fn read_row(row: &Row<'_>) -> rusqlite::Result<TokenRow> {
    Ok(TokenRow {
        token_id: row.get(0)?,
        survey_id: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        language: row.get(5)?,
        email_status: row.get(6)?,
        valid_from: row.get(7)?,
        valid_until: row.get(8)?,
        token: row.get(9)?,
        status: row.get(10)?,
    })
}

/// Decodes a raw row, failing closed on unknown labels or timestamps.
fn decode_row(row: TokenRow) -> Result<ParticipantToken, SqliteStoreError> {
    let token_id = u64::try_from(row.token_id)
        .map_err(|_| SqliteStoreError::Corrupt(format!("negative token_id {}", row.token_id)))?;
    let email_status = EmailStatus::parse(&row.email_status).ok_or_else(|| {
        SqliteStoreError::Corrupt(format!("unknown email_status {}", row.email_status))
    })?;
    let status = TokenStatus::parse(&row.status)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("unknown status {}", row.status)))?;
    Ok(ParticipantToken {
        token_id,
        survey_id: SurveyId::new(row.survey_id),
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        language: row.language,
        email_status,
        valid_from: parse_timestamp(row.valid_from.as_deref())?,
        valid_until: parse_timestamp(row.valid_until.as_deref())?,
        token: AccessToken::new(row.token),
        status,
    })
}

/// Formats an optional timestamp as RFC 3339.
fn format_timestamp(value: Option<OffsetDateTime>) -> Result<Option<String>, SqliteStoreError> {
    value
        .map(|timestamp| {
            timestamp.format(&Rfc3339).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
        })
        .transpose()
}

/// Parses an optional RFC 3339 timestamp.
fn parse_timestamp(value: Option<&str>) -> Result<Option<OffsetDateTime>, SqliteStoreError> {
    value
        .map(|text| {
            OffsetDateTime::parse(text, &Rfc3339)
                .map_err(|err| SqliteStoreError::Corrupt(format!("invalid timestamp {text}: {err}")))
        })
        .transpose()
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Maps a rusqlite error to a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

/// Maps unique constraint violations on insert to their store errors.
fn insert_error(err: rusqlite::Error, survey_id: &str) -> SqliteStoreError {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        let message = err.to_string();
        if message.contains("participant_tokens.token") {
            return SqliteStoreError::TokenCollision(survey_id.to_string());
        }
        if message.contains("participant_tokens.email") {
            return SqliteStoreError::Conflict(survey_id.to_string());
        }
    }
    db_error(err)
}

/// Returns true when the survey has prepared token storage.
fn survey_prepared(
    connection: &Connection,
    survey_id: &SurveyId,
) -> Result<bool, SqliteStoreError> {
    let found: Option<i64> = connection
        .query_row(
            "SELECT 1 FROM surveys WHERE survey_id = ?1",
            params![survey_id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_error)?;
    Ok(found.is_some())
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate).map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS surveys (
                    survey_id TEXT PRIMARY KEY,
                    prepared_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS participant_tokens (
                    token_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    survey_id TEXT NOT NULL,
                    email TEXT NOT NULL,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    language TEXT,
                    email_status TEXT NOT NULL,
                    valid_from TEXT,
                    valid_until TEXT,
                    token TEXT NOT NULL,
                    status TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    UNIQUE (survey_id, email),
                    UNIQUE (survey_id, token),
                    FOREIGN KEY (survey_id) REFERENCES surveys(survey_id)
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
