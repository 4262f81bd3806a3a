//! Unit of work tests: atomic saves, explicit transactions, last writer wins.

mod support;

use sea_orm::ConnectionTrait;

use common::AppError;
use persistence::{CommitOutcome, ReadRepository, WriteRepository};

use support::{seed_users, setup_db, test_user, test_users, uow};

#[tokio::test]
async fn test_save_without_changes_returns_zero() {
    let db = setup_db().await;

    let affected = uow(&db).save_changes().await.unwrap();

    assert_eq!(affected, 0);
}

#[tokio::test]
async fn test_add_range_is_visible_after_one_save() {
    let db = setup_db().await;

    let scope = uow(&db);
    scope.users().add_range(test_users(5));
    assert_eq!(scope.pending_changes(), 5);

    let affected = scope.save_changes().await.unwrap();

    assert_eq!(affected, 5);
    assert_eq!(scope.pending_changes(), 0);
    assert_eq!(uow(&db).users().count(|_| true).await.unwrap(), 5);
}

#[tokio::test]
async fn test_fault_mid_batch_leaves_nothing_visible() {
    let db = setup_db().await;
    let existing = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    let mut batch = test_users(2);
    // Same primary key as a stored row
    batch.push(existing.clone());
    batch.push(test_user("late@example.com"));
    scope.users().add_range(batch);

    let result = scope.save_changes().await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(scope.pending_changes(), 0);
    assert_eq!(uow(&db).users().count(|_| true).await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_save_discards_add_and_update() {
    let db = setup_db().await;
    let existing = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    let added = scope.users().add(test_user("added@example.com"));
    let mut edited = existing.clone();
    edited.first_name = "Edited".to_string();
    scope.users().update(edited);
    scope.users().add(existing.clone());

    assert!(scope.save_changes().await.is_err());

    let check = uow(&db);
    assert!(check.users().get_by_id(added.id).await.unwrap().is_none());
    let stored = check.users().get_by_id(existing.id).await.unwrap().unwrap();
    assert_eq!(stored.first_name, "Test");
}

#[tokio::test]
async fn test_last_writer_wins_without_merge() {
    let db = setup_db().await;
    let original = seed_users(&db, 1).await.remove(0);

    let first = uow(&db);
    let second = uow(&db);
    let mut from_first = first.users().get_by_id(original.id).await.unwrap().unwrap();
    let mut from_second = second.users().get_by_id(original.id).await.unwrap().unwrap();

    from_first.first_name = "Grace".to_string();
    first.users().update(from_first);
    first.save_changes().await.unwrap();

    from_second.department = Some("Compilers".to_string());
    second.users().update(from_second);
    second.save_changes().await.unwrap();

    let stored = uow(&db).users().get_by_id(original.id).await.unwrap().unwrap();
    assert_eq!(stored.first_name, original.first_name);
    assert_eq!(stored.department.as_deref(), Some("Compilers"));
}

#[tokio::test]
async fn test_unique_email_ignores_tombstones() {
    let db = setup_db().await;
    let user = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    let result = {
        scope.users().add(test_user(&user.email));
        scope.save_changes().await
    };
    assert!(matches!(result, Err(AppError::Conflict(_))));

    scope.users().remove(user.clone());
    scope.save_changes().await.unwrap();

    scope.users().add(test_user(&user.email));
    assert_eq!(scope.save_changes().await.unwrap(), 1);
}

#[tokio::test]
async fn test_explicit_transaction_commits_every_save() {
    let db = setup_db().await;

    let scope = uow(&db);
    scope.begin_transaction().await.unwrap();
    assert!(scope.has_active_transaction().await);

    let first = scope.users().add(test_user("first@example.com"));
    assert_eq!(scope.save_changes().await.unwrap(), 1);
    // Reads inside the transaction see its own saved work
    assert!(scope.users().get_by_id(first.id).await.unwrap().is_some());

    let second = scope.users().add(test_user("second@example.com"));
    let outcome = scope.commit_transaction().await.unwrap();

    assert_eq!(outcome, CommitOutcome::Committed { affected: 1 });
    assert!(outcome.is_committed());
    assert!(!scope.has_active_transaction().await);

    let check = uow(&db);
    assert!(check.users().get_by_id(first.id).await.unwrap().is_some());
    assert!(check.users().get_by_id(second.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_rejected_write_at_commit_rolls_back_and_releases_once() {
    let db = setup_db().await;
    let existing = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    scope.begin_transaction().await.unwrap();
    let saved = scope.users().add(test_user("saved@example.com"));
    scope.save_changes().await.unwrap();
    scope.users().add(existing.clone());

    let outcome = scope.commit_transaction().await.unwrap();

    assert_eq!(outcome, CommitOutcome::RolledBack);
    assert!(!scope.has_active_transaction().await);
    assert!(uow(&db).users().get_by_id(saved.id).await.unwrap().is_none());

    let again = scope.commit_transaction().await;
    assert!(matches!(again, Err(AppError::InvalidPrecondition(_))));
}

#[tokio::test]
async fn test_rejected_commit_rolls_back_and_releases() {
    let db = setup_db().await;
    // Foreign key checked only at COMMIT, tripped by inserting one specific user
    db.execute_unprepared("CREATE TABLE commit_gate (id TEXT PRIMARY KEY)")
        .await
        .unwrap();
    db.execute_unprepared(
        "CREATE TABLE commit_gate_refs \
         (gate_id TEXT REFERENCES commit_gate(id) DEFERRABLE INITIALLY DEFERRED)",
    )
    .await
    .unwrap();
    db.execute_unprepared(
        "CREATE TRIGGER users_commit_gate AFTER INSERT ON users \
         WHEN NEW.email = 'blocked@example.com' \
         BEGIN INSERT INTO commit_gate_refs (gate_id) VALUES (NEW.id); END",
    )
    .await
    .unwrap();

    let scope = uow(&db);
    scope.begin_transaction().await.unwrap();
    let saved = scope.users().add(test_user("saved@example.com"));
    scope.save_changes().await.unwrap();
    scope.users().add(test_user("blocked@example.com"));

    let outcome = scope.commit_transaction().await.unwrap();

    assert_eq!(outcome, CommitOutcome::RolledBack);
    assert!(!scope.has_active_transaction().await);
    assert_eq!(scope.pending_changes(), 0);

    let check = uow(&db);
    assert!(check.users().get_by_id(saved.id).await.unwrap().is_none());
    assert!(!check
        .users()
        .any(|u| u.email == "blocked@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_failed_rollback_still_releases_the_transaction() {
    let db = setup_db().await;
    // Aborts the whole transaction underneath the unit of work
    db.execute_unprepared(
        "CREATE TRIGGER users_abort AFTER INSERT ON users \
         WHEN NEW.email = 'abort@example.com' \
         BEGIN SELECT RAISE(ROLLBACK, 'aborted'); END",
    )
    .await
    .unwrap();

    let scope = uow(&db);
    scope.begin_transaction().await.unwrap();
    let saved = scope.users().add(test_user("saved@example.com"));
    scope.save_changes().await.unwrap();
    scope.users().add(test_user("abort@example.com"));
    assert!(scope.save_changes().await.is_err());

    assert!(scope.rollback_transaction().await.is_err());
    assert!(!scope.has_active_transaction().await);
    assert!(matches!(
        scope.rollback_transaction().await,
        Err(AppError::InvalidPrecondition(_))
    ));
    assert!(uow(&db).users().get_by_id(saved.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_save_inside_transaction_keeps_earlier_work() {
    let db = setup_db().await;
    let existing = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    scope.begin_transaction().await.unwrap();
    let kept = scope.users().add(test_user("kept@example.com"));
    scope.save_changes().await.unwrap();

    scope.users().add(existing.clone());
    assert!(scope.save_changes().await.is_err());
    assert!(scope.has_active_transaction().await);

    let outcome = scope.commit_transaction().await.unwrap();
    assert_eq!(outcome, CommitOutcome::Committed { affected: 0 });
    assert!(uow(&db).users().get_by_id(kept.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_rollback_discards_saved_and_pending_work() {
    let db = setup_db().await;

    let scope = uow(&db);
    scope.begin_transaction().await.unwrap();
    let saved = scope.users().add(test_user("saved@example.com"));
    scope.save_changes().await.unwrap();
    scope.users().add(test_user("pending@example.com"));

    scope.rollback_transaction().await.unwrap();

    assert_eq!(scope.pending_changes(), 0);
    assert!(!scope.has_active_transaction().await);
    assert!(uow(&db).users().get_by_id(saved.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_transaction_misuse_is_reported() {
    let db = setup_db().await;
    let scope = uow(&db);

    assert!(matches!(
        scope.commit_transaction().await,
        Err(AppError::InvalidPrecondition(_))
    ));
    assert!(matches!(
        scope.rollback_transaction().await,
        Err(AppError::InvalidPrecondition(_))
    ));

    scope.begin_transaction().await.unwrap();
    assert!(matches!(
        scope.begin_transaction().await,
        Err(AppError::InvalidPrecondition(_))
    ));
    scope.rollback_transaction().await.unwrap();
}

#[tokio::test]
async fn test_close_rolls_back_open_transaction() {
    let db = setup_db().await;

    let scope = uow(&db);
    scope.begin_transaction().await.unwrap();
    let user = scope.users().add(test_user("abandoned@example.com"));
    scope.save_changes().await.unwrap();

    scope.close().await.unwrap();

    assert!(uow(&db).users().get_by_id(user.id).await.unwrap().is_none());
}
