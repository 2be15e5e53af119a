//! Store-level behavior beyond file numbering: merge updates, contact and
//! lead profiles, and the post-install hook.

use std::sync::Arc;

use casedesk::db::libsql::LibSqlBackend;
use casedesk::db::{
    CreateCaseParams, CreateContactProfileParams, Database, ProfileKind, UpdateCaseParams,
    UpdateContactProfileParams,
};
use casedesk::hooks::{CONFLICTING_MODULE, PostInstallOutcome, run_post_install};
use casedesk::legal::constants::{CaseType, EntityType, Language, PartyStatus};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

async fn test_db() -> (TempDir, Arc<dyn Database>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = LibSqlBackend::new_local(dir.path().join("store.db"))
        .await
        .expect("open local db");
    backend.run_migrations().await.expect("migrations");
    (dir, Arc::new(backend))
}

#[tokio::test]
async fn update_merges_only_the_given_fields() {
    let (_dir, db) = test_db().await;

    let case = db
        .create_case(&CreateCaseParams {
            title: "Sharkawy v. Nile Trading".to_string(),
            court_name: Some("Cairo Economic Court".to_string()),
            case_type: Some(CaseType::Commercial),
            client_status: Some(PartyStatus::Plaintiff),
            ..CreateCaseParams::default()
        })
        .await
        .expect("create");

    let updated = db
        .update_case(
            case.id,
            &UpdateCaseParams {
                opponent_name: Some(Some("Nile Trading SAE".to_string())),
                court_name: Some(None),
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect("update")
        .expect("case exists");

    assert_eq!(updated.title, "Sharkawy v. Nile Trading");
    assert_eq!(updated.opponent_name.as_deref(), Some("Nile Trading SAE"));
    assert_eq!(updated.court_name, None);
    assert_eq!(updated.case_type, Some(CaseType::Commercial));
    assert_eq!(updated.client_status, Some(PartyStatus::Plaintiff));

    let missing = db
        .update_case(
            uuid::Uuid::new_v4(),
            &UpdateCaseParams {
                title: Some("nobody".to_string()),
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect("update of unknown id is not an error");
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_reports_whether_a_case_existed() {
    let (_dir, db) = test_db().await;
    let case = db
        .create_case(&CreateCaseParams {
            title: "Short-lived".to_string(),
            ..CreateCaseParams::default()
        })
        .await
        .expect("create");

    assert!(db.delete_case(case.id).await.expect("delete"));
    assert!(!db.delete_case(case.id).await.expect("second delete"));
    assert!(db.get_case(case.id).await.expect("get").is_none());
}

#[tokio::test]
async fn contact_profiles_are_filtered_by_kind() {
    let (_dir, db) = test_db().await;

    let contact = db
        .create_contact_profile(
            ProfileKind::Contact,
            &CreateContactProfileParams {
                name: "Mona Abdel Aziz".to_string(),
                nationality: Some("Egyptian".to_string()),
                preferred_language: Some(Language::Ar),
                ..CreateContactProfileParams::default()
            },
        )
        .await
        .expect("create contact");

    db.create_contact_profile(
        ProfileKind::Lead,
        &CreateContactProfileParams {
            name: "Delta Foods LLC".to_string(),
            entity_type: Some(EntityType::Llc),
            commercial_register_no: Some("CR-58821".to_string()),
            ..CreateContactProfileParams::default()
        },
    )
    .await
    .expect("create lead");

    let contacts = db
        .list_contact_profiles(Some(ProfileKind::Contact))
        .await
        .expect("list contacts");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id, contact.id);
    assert_eq!(contacts[0].preferred_language, Some(Language::Ar));

    let leads = db
        .list_contact_profiles(Some(ProfileKind::Lead))
        .await
        .expect("list leads");
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].entity_type, Some(EntityType::Llc));

    let all = db.list_contact_profiles(None).await.expect("list all");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn contact_profile_update_merges_and_clears() {
    let (_dir, db) = test_db().await;

    let profile = db
        .create_contact_profile(
            ProfileKind::Contact,
            &CreateContactProfileParams {
                name: "Omar Helmy".to_string(),
                passport_number: Some("A0931184".to_string()),
                ..CreateContactProfileParams::default()
            },
        )
        .await
        .expect("create");

    let updated = db
        .update_contact_profile(
            profile.id,
            &UpdateContactProfileParams {
                name_en: Some(Some("Omar Helmy".to_string())),
                passport_number: Some(None),
                ..UpdateContactProfileParams::default()
            },
        )
        .await
        .expect("update")
        .expect("profile exists");

    assert_eq!(updated.name, "Omar Helmy");
    assert_eq!(updated.name_en.as_deref(), Some("Omar Helmy"));
    assert_eq!(updated.passport_number, None);
}

#[tokio::test]
async fn post_install_deactivates_the_conflicting_module_once() {
    let (_dir, db) = test_db().await;

    db.register_module(CONFLICTING_MODULE, true)
        .await
        .expect("register");

    let outcome = run_post_install(db.as_ref()).await.expect("first run");
    assert_eq!(outcome, PostInstallOutcome::DeactivatedConflictingModule);

    let module = db
        .get_module(CONFLICTING_MODULE)
        .await
        .expect("get module")
        .expect("module exists");
    assert!(!module.active);

    // The marker makes every later run a no-op, even if the module is
    // reactivated in between.
    db.register_module(CONFLICTING_MODULE, true)
        .await
        .expect("reactivate");
    let outcome = run_post_install(db.as_ref()).await.expect("second run");
    assert_eq!(outcome, PostInstallOutcome::AlreadyRan);
    let module = db
        .get_module(CONFLICTING_MODULE)
        .await
        .expect("get module")
        .expect("module exists");
    assert!(module.active);
}

#[tokio::test]
async fn post_install_is_a_no_op_without_the_module() {
    let (_dir, db) = test_db().await;

    let outcome = run_post_install(db.as_ref()).await.expect("run");
    assert_eq!(outcome, PostInstallOutcome::NothingToDo);

    // Inactive module on a fresh database: still nothing to do.
    let (_dir2, db2) = test_db().await;
    db2.register_module(CONFLICTING_MODULE, false)
        .await
        .expect("register inactive");
    let outcome = run_post_install(db2.as_ref()).await.expect("run");
    assert_eq!(outcome, PostInstallOutcome::NothingToDo);
    let module = db2
        .get_module(CONFLICTING_MODULE)
        .await
        .expect("get module")
        .expect("module exists");
    assert!(!module.active);
}
