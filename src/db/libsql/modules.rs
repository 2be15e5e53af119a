//! Companion-module registry and app metadata.
//!
//! The registry mirrors the module table a full deployment manages: other
//! tools register modules here, and the post-install hook deactivates the
//! one that conflicts with case tracking. `app_meta` holds small one-off
//! markers such as "the install hook already ran".

use libsql::params;

use crate::db::{AppMetaStore, CompanionModuleRecord, CompanionModuleStore};
use crate::error::DatabaseError;

use super::{LibSqlBackend, get_i64, get_opt_text, get_text, parse_timestamp};

fn row_to_module_record(row: &libsql::Row) -> Result<CompanionModuleRecord, DatabaseError> {
    Ok(CompanionModuleRecord {
        name: get_text(row, 0),
        active: get_i64(row, 1) != 0,
        created_at: parse_timestamp(&get_text(row, 2))?,
        updated_at: parse_timestamp(&get_text(row, 3))?,
    })
}

#[async_trait::async_trait]
impl CompanionModuleStore for LibSqlBackend {
    async fn register_module(&self, name: &str, active: bool) -> Result<(), DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::Serialization(
                "module name cannot be empty".to_string(),
            ));
        }
        let conn = self.connect().await?;
        conn.execute(
            "INSERT INTO companion_modules (name, active, created_at, updated_at) \
             VALUES (?1, ?2, datetime('now'), datetime('now')) \
             ON CONFLICT (name) DO UPDATE SET \
               active = excluded.active, \
               updated_at = datetime('now')",
            params![name, i64::from(active)],
        )
        .await?;
        Ok(())
    }

    async fn get_module(
        &self,
        name: &str,
    ) -> Result<Option<CompanionModuleRecord>, DatabaseError> {
        let conn = self.connect().await?;
        let row = conn
            .query(
                "SELECT name, active, created_at, updated_at \
                 FROM companion_modules WHERE name = ?1 LIMIT 1",
                params![name],
            )
            .await?
            .next()
            .await?;
        row.map(|row| row_to_module_record(&row)).transpose()
    }

    async fn deactivate_module(&self, name: &str) -> Result<bool, DatabaseError> {
        let conn = self.connect().await?;
        let changed = conn
            .execute(
                "UPDATE companion_modules SET active = 0, updated_at = datetime('now') \
                 WHERE name = ?1 AND active = 1",
                params![name],
            )
            .await?;
        Ok(changed > 0)
    }
}

#[async_trait::async_trait]
impl AppMetaStore for LibSqlBackend {
    async fn get_meta(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let conn = self.connect().await?;
        let row = conn
            .query(
                "SELECT value FROM app_meta WHERE key = ?1 LIMIT 1",
                params![key],
            )
            .await?
            .next()
            .await?;
        Ok(row.and_then(|row| get_opt_text(&row, 0)))
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let conn = self.connect().await?;
        conn.execute(
            "INSERT INTO app_meta (key, value, updated_at) \
             VALUES (?1, ?2, datetime('now')) \
             ON CONFLICT (key) DO UPDATE SET \
               value = excluded.value, \
               updated_at = datetime('now')",
            params![key, value],
        )
        .await?;
        Ok(())
    }
}
