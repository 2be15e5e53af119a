//! Office file-number behavior against a real local database: manual
//! validation, automatic allocation, locking, and bulk backfill.

use std::sync::Arc;

use casedesk::db::libsql::LibSqlBackend;
use casedesk::db::{CreateCaseParams, Database, UpdateCaseParams};
use casedesk::error::CaseError;
use casedesk::legal::CaseOrigin;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use uuid::Uuid;

async fn test_db() -> (TempDir, Arc<dyn Database>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let backend = LibSqlBackend::new_local(dir.path().join("cases.db"))
        .await
        .expect("open local db");
    backend.run_migrations().await.expect("migrations");
    (dir, Arc::new(backend))
}

fn titled(title: &str) -> CreateCaseParams {
    CreateCaseParams {
        title: title.to_string(),
        ..CreateCaseParams::default()
    }
}

#[tokio::test]
async fn allocation_continues_after_highest_number() {
    let (_dir, db) = test_db().await;

    // Seed a manually numbered case well past the start of the sequence.
    let seeded = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(41),
            bypass_sequence_check: true,
            ..titled("Seeded")
        })
        .await
        .expect("seed case");
    assert_eq!(seeded.office_file_number, Some(41));
    assert!(seeded.file_number_locked);

    let a = db.create_case(&titled("First")).await.expect("create");
    let b = db.create_case(&titled("Second")).await.expect("create");
    assert_eq!(a.office_file_number, None);

    let a = db.assign_next_file_number(a.id).await.expect("assign a");
    let b = db.assign_next_file_number(b.id).await.expect("assign b");
    assert_eq!(a.office_file_number, Some(42));
    assert_eq!(b.office_file_number, Some(43));
    assert!(a.file_number_locked && b.file_number_locked);

    assert_eq!(db.max_file_number().await.expect("max"), 43);
}

#[tokio::test]
async fn concurrent_allocations_get_distinct_numbers() {
    let (_dir, db) = test_db().await;

    let mut ids = Vec::new();
    for i in 0..4 {
        let case = db
            .create_case(&titled(&format!("Case {i}")))
            .await
            .expect("create");
        ids.push(case.id);
    }

    let (r0, r1, r2, r3) = tokio::join!(
        db.assign_next_file_number(ids[0]),
        db.assign_next_file_number(ids[1]),
        db.assign_next_file_number(ids[2]),
        db.assign_next_file_number(ids[3]),
    );

    let mut numbers: Vec<i64> = [r0, r1, r2, r3]
        .into_iter()
        .map(|r| r.expect("allocation").office_file_number.expect("numbered"))
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn manual_number_must_extend_the_sequence_by_one() {
    let (_dir, db) = test_db().await;

    let first = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(1),
            ..titled("First")
        })
        .await
        .expect("number 1 on empty db is max+1");
    assert_eq!(first.office_file_number, Some(1));

    // max is 1, so 2 is fine and 5 is not.
    db.create_case(&CreateCaseParams {
        office_file_number: Some(2),
        ..titled("Second")
    })
    .await
    .expect("max+1 accepted");

    let err = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(5),
            ..titled("Gap")
        })
        .await
        .expect_err("beyond max+1 must be rejected");
    match err {
        CaseError::OutOfSequenceFileNumber { candidate, next } => {
            assert_eq!(candidate, 5);
            assert_eq!(next, 3);
        }
        other => panic!("expected OutOfSequenceFileNumber, got {other:?}"),
    }

    // The same number passes with the sequence check bypassed.
    let gapped = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(5),
            bypass_sequence_check: true,
            ..titled("Gap allowed")
        })
        .await
        .expect("bypass skips only the sequence rule");
    assert_eq!(gapped.office_file_number, Some(5));
}

#[tokio::test]
async fn duplicate_and_non_positive_numbers_are_always_rejected() {
    let (_dir, db) = test_db().await;

    db.create_case(&CreateCaseParams {
        office_file_number: Some(1),
        ..titled("Original")
    })
    .await
    .expect("create");

    let err = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(1),
            bypass_sequence_check: true,
            ..titled("Duplicate")
        })
        .await
        .expect_err("duplicate rejected even with bypass");
    assert!(matches!(err, CaseError::DuplicateFileNumber(1)));

    for bad in [0, -7] {
        let err = db
            .create_case(&CreateCaseParams {
                office_file_number: Some(bad),
                bypass_sequence_check: true,
                ..titled("Bad")
            })
            .await
            .expect_err("non-positive rejected even with bypass");
        assert!(matches!(err, CaseError::NonPositiveFileNumber(n) if n == bad));
    }
}

#[tokio::test]
async fn setting_a_number_on_an_unlocked_case_validates_the_sequence() {
    let (_dir, db) = test_db().await;

    db.create_case(&CreateCaseParams {
        office_file_number: Some(1),
        ..titled("Numbered")
    })
    .await
    .expect("create");
    let unnumbered = db.create_case(&titled("Unnumbered")).await.expect("create");

    let err = db
        .update_case(
            unnumbered.id,
            &UpdateCaseParams {
                office_file_number: Some(Some(9)),
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect_err("beyond max+1 must be rejected on update too");
    match err {
        CaseError::OutOfSequenceFileNumber { candidate, next } => {
            assert_eq!(candidate, 9);
            assert_eq!(next, 2);
        }
        other => panic!("expected OutOfSequenceFileNumber, got {other:?}"),
    }

    let err = db
        .update_case(
            unnumbered.id,
            &UpdateCaseParams {
                office_file_number: Some(Some(1)),
                bypass_sequence_check: true,
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect_err("duplicate rejected on update even with bypass");
    assert!(matches!(err, CaseError::DuplicateFileNumber(1)));

    // The rejected writes left the case untouched; max+1 then locks it.
    let updated = db
        .update_case(
            unnumbered.id,
            &UpdateCaseParams {
                office_file_number: Some(Some(2)),
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect("update")
        .expect("case exists");
    assert_eq!(updated.office_file_number, Some(2));
    assert!(updated.file_number_locked);
}

#[tokio::test]
async fn locked_number_cannot_be_changed_or_cleared() {
    let (_dir, db) = test_db().await;

    let case = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(1),
            ..titled("Locked")
        })
        .await
        .expect("create");
    assert!(case.file_number_locked);

    let err = db
        .update_case(
            case.id,
            &UpdateCaseParams {
                office_file_number: Some(Some(2)),
                bypass_sequence_check: true,
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect_err("changing a locked number must fail");
    assert!(matches!(err, CaseError::FileNumberLocked));

    let err = db
        .update_case(
            case.id,
            &UpdateCaseParams {
                office_file_number: Some(None),
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect_err("clearing a locked number must fail");
    assert!(matches!(err, CaseError::FileNumberLocked));

    // Re-writing the same number is a no-op, not a violation.
    let same = db
        .update_case(
            case.id,
            &UpdateCaseParams {
                office_file_number: Some(Some(1)),
                title: Some("Locked, retitled".to_string()),
                ..UpdateCaseParams::default()
            },
        )
        .await
        .expect("same number is allowed")
        .expect("case exists");
    assert_eq!(same.office_file_number, Some(1));
    assert_eq!(same.title, "Locked, retitled");
}

#[tokio::test]
async fn assigning_to_an_already_numbered_case_fails() {
    let (_dir, db) = test_db().await;

    let case = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(1),
            ..titled("Numbered")
        })
        .await
        .expect("create");

    let err = db
        .assign_next_file_number(case.id)
        .await
        .expect_err("already numbered");
    assert!(matches!(err, CaseError::FileNumberLocked));

    let err = db
        .assign_next_file_number(Uuid::new_v4())
        .await
        .expect_err("unknown id");
    assert!(matches!(err, CaseError::NotFound(_)));
}

#[tokio::test]
async fn backfill_numbers_only_the_unnumbered_in_creation_order() {
    let (_dir, db) = test_db().await;

    let numbered = db
        .create_case(&CreateCaseParams {
            office_file_number: Some(10),
            bypass_sequence_check: true,
            ..titled("Already numbered")
        })
        .await
        .expect("create");
    let first = db.create_case(&titled("Oldest unnumbered")).await.expect("create");
    let second = db.create_case(&titled("Newer unnumbered")).await.expect("create");

    let summary = db.backfill_file_numbers().await.expect("backfill");
    assert_eq!(summary.assigned, 2);
    assert_eq!(summary.highest_assigned, Some(12));

    let numbered = db.get_case(numbered.id).await.expect("get").expect("exists");
    assert_eq!(numbered.office_file_number, Some(10));

    let first = db.get_case(first.id).await.expect("get").expect("exists");
    let second = db.get_case(second.id).await.expect("get").expect("exists");
    let mut assigned = vec![
        first.office_file_number.expect("first numbered"),
        second.office_file_number.expect("second numbered"),
    ];
    assigned.sort_unstable();
    assert_eq!(assigned, vec![11, 12]);
    assert!(first.file_number_locked && second.file_number_locked);

    // A second run has nothing left to touch.
    let summary = db.backfill_file_numbers().await.expect("backfill again");
    assert_eq!(summary.assigned, 0);
    assert_eq!(summary.highest_assigned, None);
}

#[tokio::test]
async fn origin_sets_the_default_tag_unless_tags_are_explicit() {
    let (_dir, db) = test_db().await;

    let case = db
        .create_case(&CreateCaseParams {
            origin: Some(CaseOrigin::Cases),
            ..titled("From cases menu")
        })
        .await
        .expect("create");
    assert_eq!(case.tags, vec!["case".to_string()]);

    let matter = db
        .create_case(&CreateCaseParams {
            origin: Some(CaseOrigin::Matters),
            ..titled("From matters menu")
        })
        .await
        .expect("create");
    assert_eq!(matter.tags, vec!["matter".to_string()]);

    let explicit = db
        .create_case(&CreateCaseParams {
            origin: Some(CaseOrigin::Cases),
            tags: vec!["appeal".to_string()],
            ..titled("Explicitly tagged")
        })
        .await
        .expect("create");
    assert_eq!(explicit.tags, vec!["appeal".to_string()]);

    let untagged = db.create_case(&titled("No origin")).await.expect("create");
    assert!(untagged.tags.is_empty());
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let (_dir, db) = test_db().await;
    let err = db.create_case(&titled("   ")).await.expect_err("blank title");
    assert!(matches!(err, CaseError::EmptyTitle));
}
