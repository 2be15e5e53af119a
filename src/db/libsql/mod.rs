//! Embedded libSQL backend.
//!
//! One local database file holds the whole firm's data. Connections are
//! cheap re-connects to the same file; every connection gets a busy timeout
//! so immediate (write-locking) transactions from concurrent writers queue
//! instead of failing straight away.

mod cases;
mod contacts;
mod modules;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::db::Database;
use crate::error::DatabaseError;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_cases",
        "CREATE TABLE IF NOT EXISTS cases (\n\
             id TEXT PRIMARY KEY,\n\
             title TEXT NOT NULL,\n\
             office_file_number INTEGER,\n\
             file_number_locked INTEGER NOT NULL DEFAULT 0,\n\
             court_name TEXT,\n\
             court_circle TEXT,\n\
             filing_date TEXT,\n\
             first_degree_case_number TEXT,\n\
             second_degree_case_number TEXT,\n\
             case_type TEXT,\n\
             client_status TEXT,\n\
             opponent_status TEXT,\n\
             opponent_name TEXT,\n\
             opponent_address TEXT,\n\
             opponent_phone TEXT,\n\
             opponent_attorney_name TEXT,\n\
             opponent_attorney_phone TEXT,\n\
             tags TEXT NOT NULL DEFAULT '[]',\n\
             created_at TEXT NOT NULL DEFAULT (datetime('now')),\n\
             updated_at TEXT NOT NULL DEFAULT (datetime('now'))\n\
         );\n\
         CREATE UNIQUE INDEX IF NOT EXISTS idx_cases_office_file_number\n\
             ON cases (office_file_number) WHERE office_file_number IS NOT NULL;",
    ),
    (
        "002_contact_profiles",
        "CREATE TABLE IF NOT EXISTS contact_profiles (\n\
             id TEXT PRIMARY KEY,\n\
             kind TEXT NOT NULL,\n\
             name TEXT NOT NULL,\n\
             client_open_date TEXT,\n\
             name_en TEXT,\n\
             nationality TEXT,\n\
             residence_country TEXT,\n\
             national_id TEXT,\n\
             passport_number TEXT,\n\
             birth_date TEXT,\n\
             sex TEXT,\n\
             preferred_language TEXT,\n\
             communication_preferences TEXT,\n\
             representative TEXT,\n\
             representative_title TEXT,\n\
             entity_type TEXT,\n\
             commercial_register_no TEXT,\n\
             tax_registration_number TEXT,\n\
             company_activity TEXT,\n\
             created_at TEXT NOT NULL DEFAULT (datetime('now')),\n\
             updated_at TEXT NOT NULL DEFAULT (datetime('now'))\n\
         );\n\
         CREATE INDEX IF NOT EXISTS idx_contact_profiles_kind\n\
             ON contact_profiles (kind, name);",
    ),
    (
        "003_companion_modules",
        "CREATE TABLE IF NOT EXISTS companion_modules (\n\
             name TEXT PRIMARY KEY,\n\
             active INTEGER NOT NULL DEFAULT 0,\n\
             created_at TEXT NOT NULL DEFAULT (datetime('now')),\n\
             updated_at TEXT NOT NULL DEFAULT (datetime('now'))\n\
         );\n\
         CREATE TABLE IF NOT EXISTS app_meta (\n\
             key TEXT PRIMARY KEY,\n\
             value TEXT NOT NULL,\n\
             updated_at TEXT NOT NULL DEFAULT (datetime('now'))\n\
         );",
    ),
];

pub struct LibSqlBackend {
    db: libsql::Database,
}

impl LibSqlBackend {
    /// Open (or create) a local database file.
    pub async fn new_local(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(path.as_ref())
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(e.to_string()))?;
        Ok(Self { db })
    }

    pub(crate) async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DatabaseError::Pool(e.to_string()))?;
        // Writers contending for BEGIN IMMEDIATE wait instead of erroring.
        let _ = conn.query("PRAGMA busy_timeout = 5000", ()).await?;
        Ok(conn)
    }
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let conn = self.connect().await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (\n\
                 name TEXT PRIMARY KEY,\n\
                 applied_at TEXT NOT NULL DEFAULT (datetime('now'))\n\
             )",
            (),
        )
        .await?;

        for (name, sql) in MIGRATIONS {
            let applied = conn
                .query(
                    "SELECT 1 FROM schema_migrations WHERE name = ?1 LIMIT 1",
                    libsql::params![*name],
                )
                .await?
                .next()
                .await?
                .is_some();
            if applied {
                continue;
            }

            conn.execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration {
                    name: (*name).to_string(),
                    reason: e.to_string(),
                })?;
            conn.execute(
                "INSERT INTO schema_migrations (name) VALUES (?1)",
                libsql::params![*name],
            )
            .await?;
            tracing::debug!(migration = name, "applied schema migration");
        }

        Ok(())
    }
}

// ==================== Row and value helpers ====================

pub(crate) fn get_text(row: &libsql::Row, idx: i32) -> String {
    row.get::<String>(idx).unwrap_or_default()
}

pub(crate) fn get_opt_text(row: &libsql::Row, idx: i32) -> Option<String> {
    row.get::<Option<String>>(idx).ok().flatten()
}

pub(crate) fn get_i64(row: &libsql::Row, idx: i32) -> i64 {
    row.get::<i64>(idx).unwrap_or_default()
}

pub(crate) fn get_opt_i64(row: &libsql::Row, idx: i32) -> Option<i64> {
    row.get::<Option<i64>>(idx).ok().flatten()
}

pub(crate) fn opt_text(value: Option<&str>) -> libsql::Value {
    match value {
        Some(text) => libsql::Value::Text(text.to_string()),
        None => libsql::Value::Null,
    }
}

pub(crate) fn opt_text_owned(value: Option<String>) -> libsql::Value {
    match value {
        Some(text) => libsql::Value::Text(text),
        None => libsql::Value::Null,
    }
}

pub(crate) fn opt_i64(value: Option<i64>) -> libsql::Value {
    match value {
        Some(n) => libsql::Value::Integer(n),
        None => libsql::Value::Null,
    }
}

pub(crate) fn fmt_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Serialization(format!("invalid date '{}': {}", raw, e)))
}

/// Accepts both RFC 3339 and SQLite's `datetime('now')` format.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|e| DatabaseError::Serialization(format!("invalid timestamp '{}': {}", raw, e)))
}
