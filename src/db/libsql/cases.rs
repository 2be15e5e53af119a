//! Case persistence, including the office-file-number allocator.
//!
//! Every path that reads "current max" and then writes a number runs inside
//! a single `BEGIN IMMEDIATE` transaction: the connection takes the write
//! lock up front, so at most one allocator instance scans and assigns at a
//! time while competing writers queue on the busy timeout. The existence
//! re-check and bounded probe still guard the window between an initial scan
//! and the insert.

use libsql::params;
use uuid::Uuid;

use crate::db::{
    BackfillSummary, CaseRecord, CaseStore, CreateCaseParams, UpdateCaseParams,
};
use crate::error::{CaseError, DatabaseError};
use crate::legal::constants::{CaseType, PartyStatus};
use crate::legal::filenumber::{allocation_candidates, validate_file_number};
use crate::legal::tags::{attach_tag, resolve_creation_tags};

use super::{
    LibSqlBackend, fmt_date, get_i64, get_opt_i64, get_opt_text, get_text, opt_i64, opt_text,
    opt_text_owned, parse_date, parse_timestamp,
};

const CASE_COLUMNS: &str = "id, title, office_file_number, file_number_locked, court_name, \
     court_circle, filing_date, first_degree_case_number, second_degree_case_number, case_type, \
     client_status, opponent_status, opponent_name, opponent_address, opponent_phone, \
     opponent_attorney_name, opponent_attorney_phone, tags, created_at, updated_at";

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw)
        .map_err(|e| DatabaseError::Serialization(format!("invalid {} uuid: {}", field, e)))
}

fn parse_case_type(raw: &str) -> Result<CaseType, DatabaseError> {
    CaseType::from_db_value(raw)
        .ok_or_else(|| DatabaseError::Serialization(format!("invalid case_type '{}'", raw)))
}

fn parse_party_status(raw: &str) -> Result<PartyStatus, DatabaseError> {
    PartyStatus::from_db_value(raw)
        .ok_or_else(|| DatabaseError::Serialization(format!("invalid party status '{}'", raw)))
}

fn parse_tags(raw: &str) -> Result<Vec<String>, DatabaseError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| DatabaseError::Serialization(e.to_string()))?;
    Ok(parsed
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|entry| entry.as_str().map(str::to_string))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default())
}

fn tags_to_json(tags: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(tags).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn row_to_case_record(row: &libsql::Row) -> Result<CaseRecord, DatabaseError> {
    Ok(CaseRecord {
        id: parse_uuid(&get_text(row, 0), "cases.id")?,
        title: get_text(row, 1),
        office_file_number: get_opt_i64(row, 2),
        file_number_locked: get_i64(row, 3) != 0,
        court_name: get_opt_text(row, 4),
        court_circle: get_opt_text(row, 5),
        filing_date: get_opt_text(row, 6).map(|raw| parse_date(&raw)).transpose()?,
        first_degree_case_number: get_opt_text(row, 7),
        second_degree_case_number: get_opt_text(row, 8),
        case_type: get_opt_text(row, 9)
            .map(|raw| parse_case_type(&raw))
            .transpose()?,
        client_status: get_opt_text(row, 10)
            .map(|raw| parse_party_status(&raw))
            .transpose()?,
        opponent_status: get_opt_text(row, 11)
            .map(|raw| parse_party_status(&raw))
            .transpose()?,
        opponent_name: get_opt_text(row, 12),
        opponent_address: get_opt_text(row, 13),
        opponent_phone: get_opt_text(row, 14),
        opponent_attorney_name: get_opt_text(row, 15),
        opponent_attorney_phone: get_opt_text(row, 16),
        tags: parse_tags(&get_text(row, 17))?,
        created_at: parse_timestamp(&get_text(row, 18))?,
        updated_at: parse_timestamp(&get_text(row, 19))?,
    })
}

async fn load_case_on(
    conn: &libsql::Connection,
    id: Uuid,
) -> Result<Option<CaseRecord>, DatabaseError> {
    let row = conn
        .query(
            &format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1 LIMIT 1"),
            params![id.to_string()],
        )
        .await?
        .next()
        .await?;
    row.map(|row| row_to_case_record(&row)).transpose()
}

/// Highest assigned number, optionally excluding one case ("max excluding
/// self" for manual-entry validation). 0 when no case is numbered.
async fn max_file_number_on(
    conn: &libsql::Connection,
    exclude: Option<Uuid>,
) -> Result<i64, DatabaseError> {
    let row = if let Some(exclude) = exclude {
        conn.query(
            "SELECT COALESCE(MAX(office_file_number), 0) FROM cases WHERE id != ?1",
            params![exclude.to_string()],
        )
        .await?
        .next()
        .await?
    } else {
        conn.query("SELECT COALESCE(MAX(office_file_number), 0) FROM cases", ())
            .await?
            .next()
            .await?
    };
    Ok(row.map(|row| get_i64(&row, 0)).unwrap_or(0))
}

async fn number_exists_on(
    conn: &libsql::Connection,
    number: i64,
    exclude: Option<Uuid>,
) -> Result<bool, DatabaseError> {
    let row = if let Some(exclude) = exclude {
        conn.query(
            "SELECT 1 FROM cases WHERE office_file_number = ?1 AND id != ?2 LIMIT 1",
            params![number, exclude.to_string()],
        )
        .await?
        .next()
        .await?
    } else {
        conn.query(
            "SELECT 1 FROM cases WHERE office_file_number = ?1 LIMIT 1",
            params![number],
        )
        .await?
        .next()
        .await?
    };
    Ok(row.is_some())
}

#[allow(clippy::too_many_arguments)]
async fn insert_case_on(
    conn: &libsql::Connection,
    id: Uuid,
    title: &str,
    number: Option<i64>,
    locked: bool,
    input: &CreateCaseParams,
    tags_json: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO cases \
         (id, title, office_file_number, file_number_locked, court_name, court_circle, \
          filing_date, first_degree_case_number, second_degree_case_number, case_type, \
          client_status, opponent_status, opponent_name, opponent_address, opponent_phone, \
          opponent_attorney_name, opponent_attorney_phone, tags, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
                 ?18, datetime('now'), datetime('now'))",
        params![
            id.to_string(),
            title,
            opt_i64(number),
            i64::from(locked),
            opt_text(input.court_name.as_deref()),
            opt_text(input.court_circle.as_deref()),
            opt_text_owned(input.filing_date.as_ref().map(fmt_date)),
            opt_text(input.first_degree_case_number.as_deref()),
            opt_text(input.second_degree_case_number.as_deref()),
            opt_text(input.case_type.map(CaseType::as_str)),
            opt_text(input.client_status.map(PartyStatus::as_str)),
            opt_text(input.opponent_status.map(PartyStatus::as_str)),
            opt_text(input.opponent_name.as_deref()),
            opt_text(input.opponent_address.as_deref()),
            opt_text(input.opponent_phone.as_deref()),
            opt_text(input.opponent_attorney_name.as_deref()),
            opt_text(input.opponent_attorney_phone.as_deref()),
            tags_json,
        ],
    )
    .await?;
    Ok(())
}

#[async_trait::async_trait]
impl CaseStore for LibSqlBackend {
    async fn create_case(&self, input: &CreateCaseParams) -> Result<CaseRecord, CaseError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(CaseError::EmptyTitle);
        }
        let tags = resolve_creation_tags(&input.tags, input.origin);
        let tags_json = tags_to_json(&tags)?;

        let conn = self.connect().await?;
        let id = Uuid::new_v4();

        if let Some(number) = input.office_file_number {
            conn.execute("BEGIN IMMEDIATE", ()).await?;
            let insert_result = async {
                let max = max_file_number_on(&conn, None).await?;
                let duplicate = number_exists_on(&conn, number, None).await?;
                validate_file_number(number, max, duplicate, input.bypass_sequence_check)?;
                // The number and its lock flag land in the same statement.
                insert_case_on(&conn, id, title, Some(number), true, input, &tags_json).await?;
                Ok::<(), CaseError>(())
            }
            .await;

            match insert_result {
                Ok(()) => {
                    conn.execute("COMMIT", ()).await?;
                }
                Err(err) => {
                    let _ = conn.execute("ROLLBACK", ()).await;
                    return Err(err);
                }
            }
        } else {
            insert_case_on(&conn, id, title, None, false, input, &tags_json).await?;
        }

        load_case_on(&conn, id).await?.ok_or_else(|| {
            CaseError::Database(DatabaseError::Query(
                "failed to load created case".to_string(),
            ))
        })
    }

    async fn get_case(&self, id: Uuid) -> Result<Option<CaseRecord>, DatabaseError> {
        let conn = self.connect().await?;
        load_case_on(&conn, id).await
    }

    async fn list_cases(&self) -> Result<Vec<CaseRecord>, DatabaseError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {CASE_COLUMNS} FROM cases \
                     ORDER BY office_file_number IS NULL, office_file_number ASC, created_at ASC"
                ),
                (),
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_case_record(&row)?);
        }
        Ok(out)
    }

    async fn update_case(
        &self,
        id: Uuid,
        input: &UpdateCaseParams,
    ) -> Result<Option<CaseRecord>, CaseError> {
        let conn = self.connect().await?;
        conn.execute("BEGIN IMMEDIATE", ()).await?;

        let update_result = async {
            let Some(existing) = load_case_on(&conn, id).await? else {
                return Ok(None);
            };

            let (number, locked) = match input.office_file_number {
                None => (existing.office_file_number, existing.file_number_locked),
                Some(proposed) => {
                    if existing.file_number_locked && proposed != existing.office_file_number {
                        // Unconditional: no bypass unlocks a written number.
                        return Err(CaseError::FileNumberLocked);
                    }
                    match proposed {
                        Some(n) if Some(n) != existing.office_file_number => {
                            let max = max_file_number_on(&conn, Some(id)).await?;
                            let duplicate = number_exists_on(&conn, n, Some(id)).await?;
                            validate_file_number(n, max, duplicate, input.bypass_sequence_check)?;
                            (Some(n), true)
                        }
                        Some(n) => (Some(n), existing.file_number_locked),
                        None => (None, false),
                    }
                }
            };

            let merged_title = match input.title.as_deref() {
                Some(title) => {
                    let trimmed = title.trim();
                    if trimmed.is_empty() {
                        return Err(CaseError::EmptyTitle);
                    }
                    trimmed.to_string()
                }
                None => existing.title.clone(),
            };

            let merged_tags = match &input.tags {
                Some(tags) => {
                    let mut deduped = Vec::with_capacity(tags.len());
                    for tag in tags {
                        let trimmed = tag.trim();
                        if !trimmed.is_empty() {
                            attach_tag(&mut deduped, trimmed);
                        }
                    }
                    deduped
                }
                None => existing.tags.clone(),
            };
            let tags_json = tags_to_json(&merged_tags)?;

            let court_name = input.court_name.clone().unwrap_or(existing.court_name);
            let court_circle = input.court_circle.clone().unwrap_or(existing.court_circle);
            let filing_date = input.filing_date.unwrap_or(existing.filing_date);
            let first_degree = input
                .first_degree_case_number
                .clone()
                .unwrap_or(existing.first_degree_case_number);
            let second_degree = input
                .second_degree_case_number
                .clone()
                .unwrap_or(existing.second_degree_case_number);
            let case_type = input.case_type.unwrap_or(existing.case_type);
            let client_status = input.client_status.unwrap_or(existing.client_status);
            let opponent_status = input.opponent_status.unwrap_or(existing.opponent_status);
            let opponent_name = input
                .opponent_name
                .clone()
                .unwrap_or(existing.opponent_name);
            let opponent_address = input
                .opponent_address
                .clone()
                .unwrap_or(existing.opponent_address);
            let opponent_phone = input
                .opponent_phone
                .clone()
                .unwrap_or(existing.opponent_phone);
            let opponent_attorney_name = input
                .opponent_attorney_name
                .clone()
                .unwrap_or(existing.opponent_attorney_name);
            let opponent_attorney_phone = input
                .opponent_attorney_phone
                .clone()
                .unwrap_or(existing.opponent_attorney_phone);

            conn.execute(
                "UPDATE cases SET \
                    title = ?2, \
                    office_file_number = ?3, \
                    file_number_locked = ?4, \
                    court_name = ?5, \
                    court_circle = ?6, \
                    filing_date = ?7, \
                    first_degree_case_number = ?8, \
                    second_degree_case_number = ?9, \
                    case_type = ?10, \
                    client_status = ?11, \
                    opponent_status = ?12, \
                    opponent_name = ?13, \
                    opponent_address = ?14, \
                    opponent_phone = ?15, \
                    opponent_attorney_name = ?16, \
                    opponent_attorney_phone = ?17, \
                    tags = ?18, \
                    updated_at = datetime('now') \
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    merged_title.as_str(),
                    opt_i64(number),
                    i64::from(locked),
                    opt_text(court_name.as_deref()),
                    opt_text(court_circle.as_deref()),
                    opt_text_owned(filing_date.as_ref().map(fmt_date)),
                    opt_text(first_degree.as_deref()),
                    opt_text(second_degree.as_deref()),
                    opt_text(case_type.map(CaseType::as_str)),
                    opt_text(client_status.map(PartyStatus::as_str)),
                    opt_text(opponent_status.map(PartyStatus::as_str)),
                    opt_text(opponent_name.as_deref()),
                    opt_text(opponent_address.as_deref()),
                    opt_text(opponent_phone.as_deref()),
                    opt_text(opponent_attorney_name.as_deref()),
                    opt_text(opponent_attorney_phone.as_deref()),
                    tags_json.as_str(),
                ],
            )
            .await?;

            Ok::<Option<()>, CaseError>(Some(()))
        }
        .await;

        match update_result {
            Ok(Some(())) => {
                conn.execute("COMMIT", ()).await?;
                Ok(load_case_on(&conn, id).await?)
            }
            Ok(None) => {
                let _ = conn.execute("ROLLBACK", ()).await;
                Ok(None)
            }
            Err(err) => {
                let _ = conn.execute("ROLLBACK", ()).await;
                Err(err)
            }
        }
    }

    async fn delete_case(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let conn = self.connect().await?;
        let deleted = conn
            .execute("DELETE FROM cases WHERE id = ?1", params![id.to_string()])
            .await?;
        Ok(deleted > 0)
    }

    async fn max_file_number(&self) -> Result<i64, DatabaseError> {
        let conn = self.connect().await?;
        max_file_number_on(&conn, None).await
    }

    async fn assign_next_file_number(&self, id: Uuid) -> Result<CaseRecord, CaseError> {
        let conn = self.connect().await?;
        conn.execute("BEGIN IMMEDIATE", ()).await?;

        let alloc_result = async {
            let Some(existing) = load_case_on(&conn, id).await? else {
                return Err(CaseError::NotFound(id));
            };
            if existing.file_number_locked || existing.office_file_number.is_some() {
                return Err(CaseError::FileNumberLocked);
            }

            let max = max_file_number_on(&conn, None).await?;
            let mut assigned = None;
            for candidate in allocation_candidates(max) {
                if !number_exists_on(&conn, candidate, None).await? {
                    assigned = Some(candidate);
                    break;
                }
                tracing::debug!(candidate, "file number candidate taken, probing next");
            }
            let Some(number) = assigned else {
                return Err(CaseError::AllocationFailed);
            };

            conn.execute(
                "UPDATE cases SET office_file_number = ?2, file_number_locked = 1, \
                 updated_at = datetime('now') WHERE id = ?1",
                params![id.to_string(), number],
            )
            .await?;
            Ok(number)
        }
        .await;

        match alloc_result {
            Ok(number) => {
                conn.execute("COMMIT", ()).await?;
                tracing::info!(case_id = %id, number, "assigned office file number");
            }
            Err(err) => {
                let _ = conn.execute("ROLLBACK", ()).await;
                return Err(err);
            }
        }

        load_case_on(&conn, id).await?.ok_or_else(|| {
            CaseError::Database(DatabaseError::Query(
                "failed to reload case after allocation".to_string(),
            ))
        })
    }

    async fn backfill_file_numbers(&self) -> Result<BackfillSummary, CaseError> {
        let conn = self.connect().await?;
        conn.execute("BEGIN IMMEDIATE", ()).await?;

        let backfill_result = async {
            let mut rows = conn
                .query(
                    "SELECT id FROM cases WHERE office_file_number IS NULL \
                     ORDER BY created_at ASC, id ASC",
                    (),
                )
                .await?;
            let mut pending = Vec::new();
            while let Some(row) = rows.next().await? {
                pending.push(get_text(&row, 0));
            }

            let mut next = max_file_number_on(&conn, None).await? + 1;
            let mut summary = BackfillSummary {
                assigned: 0,
                highest_assigned: None,
            };
            for case_id in pending {
                conn.execute(
                    "UPDATE cases SET office_file_number = ?2, file_number_locked = 1, \
                     updated_at = datetime('now') WHERE id = ?1",
                    params![case_id.as_str(), next],
                )
                .await?;
                summary.assigned += 1;
                summary.highest_assigned = Some(next);
                next += 1;
            }
            Ok::<BackfillSummary, CaseError>(summary)
        }
        .await;

        match backfill_result {
            Ok(summary) => {
                conn.execute("COMMIT", ()).await?;
                tracing::info!(assigned = summary.assigned, "backfilled office file numbers");
                Ok(summary)
            }
            Err(err) => {
                let _ = conn.execute("ROLLBACK", ()).await;
                Err(err)
            }
        }
    }
}
