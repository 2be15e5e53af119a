//! Error types for configuration, persistence, and case operations.

use thiserror::Error;
use uuid::Uuid;

/// Configuration resolution failures (environment or settings file).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to read settings file '{path}': {source}")]
    SettingsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file '{path}': {source}")]
    SettingsParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Persistence-layer failures, backend-agnostic.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection failed: {0}")]
    Pool(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("migration '{name}' failed: {reason}")]
    Migration { name: String, reason: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Driver(#[from] libsql::Error),
}

/// Case-level failures surfaced to the operator.
///
/// The allocator and the file-number write path never leave a number behind
/// without its lock flag: every variant here rolls the write back.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("office file number must be a positive integer, got {0}")]
    NonPositiveFileNumber(i64),

    #[error("office file number {0} is already assigned to another case")]
    DuplicateFileNumber(i64),

    #[error(
        "office file number {candidate} skips ahead of the next available number {next}; \
         use {next} or enable the sequence bypass for backfilled records"
    )]
    OutOfSequenceFileNumber { candidate: i64, next: i64 },

    #[error("the office file number for this case is locked and can no longer be changed")]
    FileNumberLocked,

    #[error(
        "could not allocate a free office file number; please retry, and contact an \
         administrator if the problem persists"
    )]
    AllocationFailed,

    #[error("case not found: {0}")]
    NotFound(Uuid),

    #[error("case title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<libsql::Error> for CaseError {
    fn from(err: libsql::Error) -> Self {
        Self::Database(DatabaseError::Driver(err))
    }
}
