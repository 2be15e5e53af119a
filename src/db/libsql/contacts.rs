//! Contact and CRM-lead intake profiles.
//!
//! One table backs both kinds; the `kind` column tells them apart. These are
//! plain attribute bags, so the store is straightforward CRUD with the usual
//! merge-update pattern.

use libsql::params;
use uuid::Uuid;

use crate::db::{
    ContactProfileRecord, ContactProfileStore, CreateContactProfileParams, ProfileKind,
    UpdateContactProfileParams,
};
use crate::error::DatabaseError;
use crate::legal::constants::{EntityType, Language, Sex};

use super::{
    LibSqlBackend, fmt_date, get_opt_text, get_text, opt_text, opt_text_owned, parse_date,
    parse_timestamp,
};

const PROFILE_COLUMNS: &str = "id, kind, name, client_open_date, name_en, nationality, \
     residence_country, national_id, passport_number, birth_date, sex, preferred_language, \
     communication_preferences, representative, representative_title, entity_type, \
     commercial_register_no, tax_registration_number, company_activity, created_at, updated_at";

fn parse_profile_kind(raw: &str) -> Result<ProfileKind, DatabaseError> {
    ProfileKind::from_db_value(raw)
        .ok_or_else(|| DatabaseError::Serialization(format!("invalid profile kind '{}'", raw)))
}

fn parse_sex(raw: &str) -> Result<Sex, DatabaseError> {
    Sex::from_db_value(raw)
        .ok_or_else(|| DatabaseError::Serialization(format!("invalid sex '{}'", raw)))
}

fn parse_language(raw: &str) -> Result<Language, DatabaseError> {
    Language::from_db_value(raw)
        .ok_or_else(|| DatabaseError::Serialization(format!("invalid language '{}'", raw)))
}

fn parse_entity_type(raw: &str) -> Result<EntityType, DatabaseError> {
    EntityType::from_db_value(raw)
        .ok_or_else(|| DatabaseError::Serialization(format!("invalid entity type '{}'", raw)))
}

fn row_to_profile_record(row: &libsql::Row) -> Result<ContactProfileRecord, DatabaseError> {
    Ok(ContactProfileRecord {
        id: Uuid::parse_str(&get_text(row, 0)).map_err(|e| {
            DatabaseError::Serialization(format!("invalid contact_profiles.id uuid: {}", e))
        })?,
        kind: parse_profile_kind(&get_text(row, 1))?,
        name: get_text(row, 2),
        client_open_date: get_opt_text(row, 3).map(|raw| parse_date(&raw)).transpose()?,
        name_en: get_opt_text(row, 4),
        nationality: get_opt_text(row, 5),
        residence_country: get_opt_text(row, 6),
        national_id: get_opt_text(row, 7),
        passport_number: get_opt_text(row, 8),
        birth_date: get_opt_text(row, 9).map(|raw| parse_date(&raw)).transpose()?,
        sex: get_opt_text(row, 10).map(|raw| parse_sex(&raw)).transpose()?,
        preferred_language: get_opt_text(row, 11)
            .map(|raw| parse_language(&raw))
            .transpose()?,
        communication_preferences: get_opt_text(row, 12),
        representative: get_opt_text(row, 13),
        representative_title: get_opt_text(row, 14),
        entity_type: get_opt_text(row, 15)
            .map(|raw| parse_entity_type(&raw))
            .transpose()?,
        commercial_register_no: get_opt_text(row, 16),
        tax_registration_number: get_opt_text(row, 17),
        company_activity: get_opt_text(row, 18),
        created_at: parse_timestamp(&get_text(row, 19))?,
        updated_at: parse_timestamp(&get_text(row, 20))?,
    })
}

#[async_trait::async_trait]
impl ContactProfileStore for LibSqlBackend {
    async fn create_contact_profile(
        &self,
        kind: ProfileKind,
        input: &CreateContactProfileParams,
    ) -> Result<ContactProfileRecord, DatabaseError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DatabaseError::Serialization(
                "profile name cannot be empty".to_string(),
            ));
        }

        let conn = self.connect().await?;
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO contact_profiles \
             (id, kind, name, client_open_date, name_en, nationality, residence_country, \
              national_id, passport_number, birth_date, sex, preferred_language, \
              communication_preferences, representative, representative_title, entity_type, \
              commercial_register_no, tax_registration_number, company_activity, \
              created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                     ?17, ?18, ?19, datetime('now'), datetime('now'))",
            params![
                id.as_str(),
                kind.as_str(),
                name,
                opt_text_owned(input.client_open_date.as_ref().map(fmt_date)),
                opt_text(input.name_en.as_deref()),
                opt_text(input.nationality.as_deref()),
                opt_text(input.residence_country.as_deref()),
                opt_text(input.national_id.as_deref()),
                opt_text(input.passport_number.as_deref()),
                opt_text_owned(input.birth_date.as_ref().map(fmt_date)),
                opt_text(input.sex.map(Sex::as_str)),
                opt_text(input.preferred_language.map(Language::as_str)),
                opt_text(input.communication_preferences.as_deref()),
                opt_text(input.representative.as_deref()),
                opt_text(input.representative_title.as_deref()),
                opt_text(input.entity_type.map(EntityType::as_str)),
                opt_text(input.commercial_register_no.as_deref()),
                opt_text(input.tax_registration_number.as_deref()),
                opt_text(input.company_activity.as_deref()),
            ],
        )
        .await?;

        let row = conn
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM contact_profiles WHERE id = ?1 LIMIT 1"),
                params![id.as_str()],
            )
            .await?
            .next()
            .await?
            .ok_or_else(|| DatabaseError::Query("failed to load created profile".to_string()))?;

        row_to_profile_record(&row)
    }

    async fn get_contact_profile(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactProfileRecord>, DatabaseError> {
        let conn = self.connect().await?;
        let row = conn
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM contact_profiles WHERE id = ?1 LIMIT 1"),
                params![id.to_string()],
            )
            .await?
            .next()
            .await?;
        row.map(|row| row_to_profile_record(&row)).transpose()
    }

    async fn list_contact_profiles(
        &self,
        kind: Option<ProfileKind>,
    ) -> Result<Vec<ContactProfileRecord>, DatabaseError> {
        let conn = self.connect().await?;
        let mut rows = if let Some(kind) = kind {
            conn.query(
                &format!(
                    "SELECT {PROFILE_COLUMNS} FROM contact_profiles \
                     WHERE kind = ?1 ORDER BY name ASC"
                ),
                params![kind.as_str()],
            )
            .await?
        } else {
            conn.query(
                &format!("SELECT {PROFILE_COLUMNS} FROM contact_profiles ORDER BY name ASC"),
                (),
            )
            .await?
        };

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_profile_record(&row)?);
        }
        Ok(out)
    }

    async fn update_contact_profile(
        &self,
        id: Uuid,
        input: &UpdateContactProfileParams,
    ) -> Result<Option<ContactProfileRecord>, DatabaseError> {
        let Some(existing) = self.get_contact_profile(id).await? else {
            return Ok(None);
        };

        let merged_name = match input.name.as_deref() {
            Some(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(DatabaseError::Serialization(
                        "profile name cannot be empty".to_string(),
                    ));
                }
                trimmed.to_string()
            }
            None => existing.name,
        };
        let client_open_date = input.client_open_date.unwrap_or(existing.client_open_date);
        let name_en = input.name_en.clone().unwrap_or(existing.name_en);
        let nationality = input.nationality.clone().unwrap_or(existing.nationality);
        let residence_country = input
            .residence_country
            .clone()
            .unwrap_or(existing.residence_country);
        let national_id = input.national_id.clone().unwrap_or(existing.national_id);
        let passport_number = input
            .passport_number
            .clone()
            .unwrap_or(existing.passport_number);
        let birth_date = input.birth_date.unwrap_or(existing.birth_date);
        let sex = input.sex.unwrap_or(existing.sex);
        let preferred_language = input
            .preferred_language
            .unwrap_or(existing.preferred_language);
        let communication_preferences = input
            .communication_preferences
            .clone()
            .unwrap_or(existing.communication_preferences);
        let representative = input
            .representative
            .clone()
            .unwrap_or(existing.representative);
        let representative_title = input
            .representative_title
            .clone()
            .unwrap_or(existing.representative_title);
        let entity_type = input.entity_type.unwrap_or(existing.entity_type);
        let commercial_register_no = input
            .commercial_register_no
            .clone()
            .unwrap_or(existing.commercial_register_no);
        let tax_registration_number = input
            .tax_registration_number
            .clone()
            .unwrap_or(existing.tax_registration_number);
        let company_activity = input
            .company_activity
            .clone()
            .unwrap_or(existing.company_activity);

        let conn = self.connect().await?;
        conn.execute(
            "UPDATE contact_profiles SET \
                name = ?2, \
                client_open_date = ?3, \
                name_en = ?4, \
                nationality = ?5, \
                residence_country = ?6, \
                national_id = ?7, \
                passport_number = ?8, \
                birth_date = ?9, \
                sex = ?10, \
                preferred_language = ?11, \
                communication_preferences = ?12, \
                representative = ?13, \
                representative_title = ?14, \
                entity_type = ?15, \
                commercial_register_no = ?16, \
                tax_registration_number = ?17, \
                company_activity = ?18, \
                updated_at = datetime('now') \
             WHERE id = ?1",
            params![
                id.to_string(),
                merged_name.as_str(),
                opt_text_owned(client_open_date.as_ref().map(fmt_date)),
                opt_text(name_en.as_deref()),
                opt_text(nationality.as_deref()),
                opt_text(residence_country.as_deref()),
                opt_text(national_id.as_deref()),
                opt_text(passport_number.as_deref()),
                opt_text_owned(birth_date.as_ref().map(fmt_date)),
                opt_text(sex.map(Sex::as_str)),
                opt_text(preferred_language.map(Language::as_str)),
                opt_text(communication_preferences.as_deref()),
                opt_text(representative.as_deref()),
                opt_text(representative_title.as_deref()),
                opt_text(entity_type.map(EntityType::as_str)),
                opt_text(commercial_register_no.as_deref()),
                opt_text(tax_registration_number.as_deref()),
                opt_text(company_activity.as_deref()),
            ],
        )
        .await?;

        self.get_contact_profile(id).await
    }

    async fn delete_contact_profile(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let conn = self.connect().await?;
        let deleted = conn
            .execute(
                "DELETE FROM contact_profiles WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;
        Ok(deleted > 0)
    }
}
