//! Generic repository tests against an in-memory SQLite store.

mod support;

use sea_orm::EntityTrait;
use uuid::Uuid;

use common::{IsolationSetting, PageRequest};
use persistence::entities::{attachment, task, user};
use persistence::{ReadRepository, UnitOfWork, WriteRepository};

use support::{seed_project, seed_users, setup_db, test_user, test_users, uow};

fn page(number: u64, size: u64) -> PageRequest {
    PageRequest::new(number, size).unwrap()
}

#[tokio::test]
async fn test_deleted_entities_are_invisible_to_every_read() {
    let db = setup_db().await;
    let users = seed_users(&db, 3).await;
    let victim = users[1].clone();

    let scope = uow(&db);
    scope.users().remove(victim.clone());
    scope.save_changes().await.unwrap();

    let scope = uow(&db);
    let repo = scope.users();
    assert!(repo.get_by_id(victim.id).await.unwrap().is_none());
    assert!(repo
        .get_all()
        .await
        .unwrap()
        .iter()
        .all(|u| u.id != victim.id));
    assert!(repo
        .find(|u| u.email == victim.email)
        .await
        .unwrap()
        .is_empty());
    assert!(repo
        .first_or_default(|u| u.id == victim.id)
        .await
        .unwrap()
        .is_none());
    assert!(!repo.any(|u| u.id == victim.id).await.unwrap());
    assert_eq!(repo.count(|_| true).await.unwrap(), 2);

    let paged = repo.get_paged(page(1, 10)).await.unwrap();
    assert_eq!(paged.meta.total_count, 2);
    assert!(paged.data.iter().all(|u| !u.is_deleted));
}

#[tokio::test]
async fn test_remove_leaves_a_tombstone() {
    let db = setup_db().await;
    let user = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    scope.users().remove(user.clone());
    scope.save_changes().await.unwrap();

    assert!(uow(&db).users().get_by_id(user.id).await.unwrap().is_none());

    let row = user::Entity::find_by_id(user.id)
        .one(&db)
        .await
        .unwrap()
        .expect("row is still stored");
    assert!(row.is_deleted);
    assert!(row.deleted_at.is_some());
}

#[tokio::test]
async fn test_get_paged_on_empty_table() {
    let db = setup_db().await;

    let paged = uow(&db).users().get_paged(page(1, 10)).await.unwrap();

    assert!(paged.data.is_empty());
    assert_eq!(paged.meta.total_count, 0);
    assert_eq!(paged.meta.total_pages, 0);
    assert!(!paged.meta.has_previous_page);
    assert!(!paged.meta.has_next_page);
}

#[tokio::test]
async fn test_get_paged_over_twenty_five_rows() {
    let db = setup_db().await;
    seed_users(&db, 25).await;

    let scope = uow(&db);
    let repo = scope.users();

    let first = repo.get_paged(page(1, 10)).await.unwrap();
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.meta.total_count, 25);
    assert_eq!(first.meta.total_pages, 3);
    assert!(first.meta.has_next_page);
    assert!(!first.meta.has_previous_page);

    let second = repo.get_paged(page(2, 10)).await.unwrap();
    let last = repo.get_paged(page(3, 10)).await.unwrap();
    assert_eq!(last.data.len(), 5);
    assert!(!last.meta.has_next_page);
    assert!(last.meta.has_previous_page);

    let stitched: Vec<Uuid> = first
        .data
        .iter()
        .chain(&second.data)
        .chain(&last.data)
        .map(|u| u.id)
        .collect();
    let all: Vec<Uuid> = repo.get_all().await.unwrap().iter().map(|u| u.id).collect();
    assert_eq!(stitched, all);
}

#[tokio::test]
async fn test_get_paged_is_repeatable() {
    let db = setup_db().await;
    seed_users(&db, 12).await;

    let scope = uow(&db);
    let a = scope.users().get_paged(page(2, 5)).await.unwrap();
    let b = scope.users().get_paged(page(2, 5)).await.unwrap();

    assert_eq!(a, b);
}

#[tokio::test]
async fn test_get_paged_where_counts_only_matches() {
    let db = setup_db().await;
    let scope = uow(&db);
    let mut users = test_users(6);
    for user in users.iter_mut().take(4) {
        user.department = Some("Platform".to_string());
    }
    scope.users().add_range(users);
    scope.save_changes().await.unwrap();

    let paged = uow(&db)
        .users()
        .get_paged_where(page(2, 3), |u| u.department.as_deref() == Some("Platform"))
        .await
        .unwrap();

    assert_eq!(paged.meta.total_count, 4);
    assert_eq!(paged.meta.total_pages, 2);
    assert_eq!(paged.data.len(), 1);
}

#[tokio::test]
async fn test_predicate_reads() {
    let db = setup_db().await;
    let users = seed_users(&db, 4).await;

    let scope = uow(&db);
    let repo = scope.users();

    let found = repo.find(|u| u.email.ends_with("1@example.com")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, users[1].id);

    let first = repo.first_or_default(|u| u.is_active).await.unwrap();
    assert!(first.is_some());
    assert!(repo.first_or_default(|u| !u.is_active).await.unwrap().is_none());

    assert!(repo.any(|u| u.email == "user3@example.com").await.unwrap());
    assert_eq!(repo.count(|u| u.email.starts_with("user")).await.unwrap(), 4);
}

#[tokio::test]
async fn test_missing_id_is_not_an_error() {
    let db = setup_db().await;

    let result = uow(&db).tasks().get_by_id(Uuid::new_v4()).await;

    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_staged_changes_are_visible_in_their_own_scope_only() {
    let db = setup_db().await;
    let existing = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    let added = scope.users().add(test_user("fresh@example.com"));
    let mut renamed = existing.clone();
    renamed.first_name = "Renamed".to_string();
    scope.users().update(renamed);

    let repo = scope.users();
    assert!(repo.get_by_id(added.id).await.unwrap().is_some());
    assert_eq!(
        repo.get_by_id(existing.id).await.unwrap().unwrap().first_name,
        "Renamed"
    );
    assert_eq!(repo.count(|_| true).await.unwrap(), 2);

    let other = uow(&db);
    assert!(other.users().get_by_id(added.id).await.unwrap().is_none());
    assert_eq!(
        other
            .users()
            .get_by_id(existing.id)
            .await
            .unwrap()
            .unwrap()
            .first_name,
        "Test"
    );
}

#[tokio::test]
async fn test_staged_remove_hides_entity_before_save() {
    let db = setup_db().await;
    let user = seed_users(&db, 1).await.remove(0);

    let scope = uow(&db);
    scope.users().remove(user.clone());

    assert!(scope.users().get_by_id(user.id).await.unwrap().is_none());
    assert!(uow(&db).users().get_by_id(user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_add_stamps_the_actor() {
    let db = setup_db().await;
    let actor = Uuid::new_v4();

    let scope = UnitOfWork::new(db.clone(), Some(actor), IsolationSetting::default());
    let user = scope.users().add(test_user("stamped@example.com"));
    scope.save_changes().await.unwrap();

    let stored = uow(&db).users().get_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.created_by, Some(actor));
    assert_eq!(stored.updated_by, Some(actor));
    assert!(!stored.is_deleted);
}

#[tokio::test]
async fn test_update_never_rewrites_creation_stamps() {
    let db = setup_db().await;
    seed_users(&db, 1).await;
    let stored = uow(&db).users().get_all().await.unwrap().remove(0);

    let editor = Uuid::new_v4();
    let scope = UnitOfWork::new(db.clone(), Some(editor), IsolationSetting::default());
    let mut edited = stored.clone();
    edited.created_at = edited.created_at - chrono::Duration::days(30);
    edited.created_by = Some(Uuid::new_v4());
    edited.department = Some("Research".to_string());
    scope.users().update(edited);
    scope.save_changes().await.unwrap();

    let reloaded = uow(&db).users().get_by_id(stored.id).await.unwrap().unwrap();
    assert_eq!(reloaded.created_at, stored.created_at);
    assert_eq!(reloaded.created_by, stored.created_by);
    assert_eq!(reloaded.updated_by, Some(editor));
    assert_eq!(reloaded.department.as_deref(), Some("Research"));
}

#[tokio::test]
async fn test_tasks_are_filtered_by_project() {
    let db = setup_db().await;
    let owner = seed_users(&db, 1).await.remove(0);
    let project = seed_project(&db, owner.id).await;

    let scope = uow(&db);
    let task = scope.tasks().add(task::Model::new(project.id, "Draft plan"));
    scope.save_changes().await.unwrap();

    let scope = uow(&db);
    let tasks = scope
        .tasks()
        .find(|t| t.project_id == project.id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
    assert_eq!(tasks[0].status, "todo");
}

#[tokio::test]
async fn test_attachment_lifecycle() {
    let db = setup_db().await;
    let owner = seed_users(&db, 1).await.remove(0);
    let project = seed_project(&db, owner.id).await;

    let scope = UnitOfWork::new(db.clone(), Some(owner.id), IsolationSetting::default());
    let task = scope.tasks().add(task::Model::new(project.id, "Blueprints"));
    let drawing = scope.attachments().add(attachment::Model::new(
        task.id,
        "mill.pdf",
        "uploads/mill.pdf",
        48_213,
        "application/pdf",
    ));
    assert_eq!(scope.save_changes().await.unwrap(), 2);

    let scope = uow(&db);
    let stored = scope
        .attachments()
        .get_by_id(drawing.id)
        .await
        .unwrap()
        .expect("attachment was saved");
    assert_eq!(stored.task_id, task.id);
    assert_eq!(stored.file_name, "mill.pdf");
    assert_eq!(stored.file_size, 48_213);
    assert_eq!(stored.created_by, Some(owner.id));

    scope.attachments().remove(stored);
    scope.save_changes().await.unwrap();

    let scope = uow(&db);
    assert!(scope
        .attachments()
        .find(|a| a.task_id == task.id)
        .await
        .unwrap()
        .is_empty());
    let row = attachment::Entity::find_by_id(drawing.id)
        .one(&db)
        .await
        .unwrap()
        .expect("row is still stored");
    assert!(row.is_deleted);
    assert!(row.deleted_at.is_some());
}
