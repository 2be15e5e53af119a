//! Database abstraction layer.
//!
//! Provides a backend-agnostic [`Database`] trait that unifies all
//! persistence operations. One embedded backend implements it:
//!
//! - `libsql`: libSQL (Turso's SQLite fork) stored in a single local file
//!
//! Each sub-trait groups related persistence methods; the `Database`
//! supertrait combines them so `Arc<dyn Database>` consumers get everything,
//! while leaf consumers can depend on a specific sub-trait instead.

pub mod libsql;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::{CaseError, DatabaseError};
use crate::legal::constants::{CaseType, EntityType, Language, PartyStatus, Sex};
use crate::legal::tags::CaseOrigin;

/// Create the database backend from configuration, run migrations, and
/// return it. Shared by CLI commands and tests.
pub async fn connect_from_config(
    config: &DatabaseConfig,
) -> Result<Arc<dyn Database>, DatabaseError> {
    let backend = libsql::LibSqlBackend::new_local(&config.path)
        .await
        .map_err(|e| DatabaseError::Pool(e.to_string()))?;
    backend.run_migrations().await?;
    Ok(Arc::new(backend))
}

/// Which host entity a contact profile extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Contact,
    Lead,
}

impl ProfileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Lead => "lead",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "contact" => Some(Self::Contact),
            "lead" => Some(Self::Lead),
            _ => None,
        }
    }
}

/// A legal case / matter record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: Uuid,
    pub title: String,
    /// Internal reference number used by the office; unique when set.
    pub office_file_number: Option<i64>,
    /// Once true, the file number can never be changed again.
    pub file_number_locked: bool,
    pub court_name: Option<String>,
    pub court_circle: Option<String>,
    pub filing_date: Option<NaiveDate>,
    pub first_degree_case_number: Option<String>,
    pub second_degree_case_number: Option<String>,
    pub case_type: Option<CaseType>,
    pub client_status: Option<PartyStatus>,
    pub opponent_status: Option<PartyStatus>,
    pub opponent_name: Option<String>,
    pub opponent_address: Option<String>,
    pub opponent_phone: Option<String>,
    pub opponent_attorney_name: Option<String>,
    pub opponent_attorney_phone: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateCaseParams {
    pub title: String,
    /// Entry point that created this record; drives tag defaulting when no
    /// explicit tags are given.
    pub origin: Option<CaseOrigin>,
    /// Manually entered office file number; validated against sequence and
    /// uniqueness rules and locked on success.
    pub office_file_number: Option<i64>,
    /// Skip only the max+1 sequence rule (system allocation, backfill).
    pub bypass_sequence_check: bool,
    pub court_name: Option<String>,
    pub court_circle: Option<String>,
    pub filing_date: Option<NaiveDate>,
    pub first_degree_case_number: Option<String>,
    pub second_degree_case_number: Option<String>,
    pub case_type: Option<CaseType>,
    pub client_status: Option<PartyStatus>,
    pub opponent_status: Option<PartyStatus>,
    pub opponent_name: Option<String>,
    pub opponent_address: Option<String>,
    pub opponent_phone: Option<String>,
    pub opponent_attorney_name: Option<String>,
    pub opponent_attorney_phone: Option<String>,
    pub tags: Vec<String>,
}

/// Partial update; outer `None` leaves a field untouched, inner `None`
/// clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct UpdateCaseParams {
    pub title: Option<String>,
    pub office_file_number: Option<Option<i64>>,
    pub bypass_sequence_check: bool,
    pub court_name: Option<Option<String>>,
    pub court_circle: Option<Option<String>>,
    pub filing_date: Option<Option<NaiveDate>>,
    pub first_degree_case_number: Option<Option<String>>,
    pub second_degree_case_number: Option<Option<String>>,
    pub case_type: Option<Option<CaseType>>,
    pub client_status: Option<Option<PartyStatus>>,
    pub opponent_status: Option<Option<PartyStatus>>,
    pub opponent_name: Option<Option<String>>,
    pub opponent_address: Option<Option<String>>,
    pub opponent_phone: Option<Option<String>>,
    pub opponent_attorney_name: Option<Option<String>>,
    pub opponent_attorney_phone: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

/// Result of a bulk file-number backfill run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillSummary {
    /// Cases that received a number in this run.
    pub assigned: u64,
    /// Highest number assigned, when any were.
    pub highest_assigned: Option<i64>,
}

/// Client intake profile shared by contacts and CRM leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactProfileRecord {
    pub id: Uuid,
    pub kind: ProfileKind,
    pub name: String,
    pub client_open_date: Option<NaiveDate>,
    pub name_en: Option<String>,
    pub nationality: Option<String>,
    pub residence_country: Option<String>,
    pub national_id: Option<String>,
    pub passport_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub preferred_language: Option<Language>,
    pub communication_preferences: Option<String>,
    pub representative: Option<String>,
    pub representative_title: Option<String>,
    pub entity_type: Option<EntityType>,
    pub commercial_register_no: Option<String>,
    pub tax_registration_number: Option<String>,
    pub company_activity: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateContactProfileParams {
    pub name: String,
    pub client_open_date: Option<NaiveDate>,
    pub name_en: Option<String>,
    pub nationality: Option<String>,
    pub residence_country: Option<String>,
    pub national_id: Option<String>,
    pub passport_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub preferred_language: Option<Language>,
    pub communication_preferences: Option<String>,
    pub representative: Option<String>,
    pub representative_title: Option<String>,
    pub entity_type: Option<EntityType>,
    pub commercial_register_no: Option<String>,
    pub tax_registration_number: Option<String>,
    pub company_activity: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateContactProfileParams {
    pub name: Option<String>,
    pub client_open_date: Option<Option<NaiveDate>>,
    pub name_en: Option<Option<String>>,
    pub nationality: Option<Option<String>>,
    pub residence_country: Option<Option<String>>,
    pub national_id: Option<Option<String>>,
    pub passport_number: Option<Option<String>>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub sex: Option<Option<Sex>>,
    pub preferred_language: Option<Option<Language>>,
    pub communication_preferences: Option<Option<String>>,
    pub representative: Option<Option<String>>,
    pub representative_title: Option<Option<String>>,
    pub entity_type: Option<Option<EntityType>>,
    pub commercial_register_no: Option<Option<String>>,
    pub tax_registration_number: Option<Option<String>>,
    pub company_activity: Option<Option<String>>,
}

/// A companion module the deployment may have installed alongside this app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionModuleRecord {
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==================== Sub-traits ====================

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Create a case, enforcing file-number and tag-defaulting rules.
    async fn create_case(&self, input: &CreateCaseParams) -> Result<CaseRecord, CaseError>;
    async fn get_case(&self, id: Uuid) -> Result<Option<CaseRecord>, DatabaseError>;
    async fn list_cases(&self) -> Result<Vec<CaseRecord>, DatabaseError>;
    /// Merge-update a case; rejects any change to a locked file number.
    async fn update_case(
        &self,
        id: Uuid,
        input: &UpdateCaseParams,
    ) -> Result<Option<CaseRecord>, CaseError>;
    async fn delete_case(&self, id: Uuid) -> Result<bool, DatabaseError>;
    /// Highest assigned office file number, 0 when none.
    async fn max_file_number(&self) -> Result<i64, DatabaseError>;
    /// Allocate the next free office file number for `id` and lock it.
    async fn assign_next_file_number(&self, id: Uuid) -> Result<CaseRecord, CaseError>;
    /// Assign sequential numbers to every case missing one.
    async fn backfill_file_numbers(&self) -> Result<BackfillSummary, CaseError>;
}

#[async_trait]
pub trait ContactProfileStore: Send + Sync {
    async fn create_contact_profile(
        &self,
        kind: ProfileKind,
        input: &CreateContactProfileParams,
    ) -> Result<ContactProfileRecord, DatabaseError>;
    async fn get_contact_profile(
        &self,
        id: Uuid,
    ) -> Result<Option<ContactProfileRecord>, DatabaseError>;
    async fn list_contact_profiles(
        &self,
        kind: Option<ProfileKind>,
    ) -> Result<Vec<ContactProfileRecord>, DatabaseError>;
    async fn update_contact_profile(
        &self,
        id: Uuid,
        input: &UpdateContactProfileParams,
    ) -> Result<Option<ContactProfileRecord>, DatabaseError>;
    async fn delete_contact_profile(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait CompanionModuleStore: Send + Sync {
    /// Upsert a module entry; used by deployment tooling and tests.
    async fn register_module(&self, name: &str, active: bool) -> Result<(), DatabaseError>;
    async fn get_module(&self, name: &str)
        -> Result<Option<CompanionModuleRecord>, DatabaseError>;
    /// Returns true when the module existed and was active.
    async fn deactivate_module(&self, name: &str) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait AppMetaStore: Send + Sync {
    async fn get_meta(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    async fn set_meta(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
}

/// Backend-agnostic database supertrait.
#[async_trait]
pub trait Database:
    CaseStore + ContactProfileStore + CompanionModuleStore + AppMetaStore + Send + Sync
{
    /// Run schema migrations for this backend.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;
}
