//! User service tests.

mod support;

use domain::{Caller, UserRole};
use tracker_service_lib::service::{
    CreateUser, ServiceContainer, ServiceError, UpdateUser, UserService,
};

use support::{harness, seed_user};

fn input(email: &str) -> CreateUser {
    CreateUser {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: email.to_string(),
        password: "correct horse battery".to_string(),
        phone_number: None,
        department: Some("Compilers".to_string()),
        role: UserRole::TeamLead,
    }
}

#[tokio::test]
async fn test_create_user_normalizes_email_and_hashes_password() {
    let h = harness().await;
    let users = h.services(Caller::system()).users();

    let user = users.create_user(input("  Grace@Example.COM ")).await.unwrap();

    assert_eq!(user.email, "grace@example.com");
    assert_eq!(user.role(), UserRole::TeamLead);
    assert_ne!(user.password_hash, "correct horse battery");
    assert!(user.password().verify("correct horse battery"));
    assert!(user.avatar.is_some());
    assert!(user.is_active);
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let h = harness().await;
    let users = h.services(Caller::system()).users();
    users.create_user(input("grace@example.com")).await.unwrap();

    let result = users.create_user(input("GRACE@example.com")).await;

    assert!(matches!(result, Err(ServiceError::Conflict(_))));
    assert_eq!(users.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleted_user_frees_the_email() {
    let h = harness().await;
    let users = h.services(Caller::system()).users();
    let first = users.create_user(input("grace@example.com")).await.unwrap();

    users.delete_user(first.id).await.unwrap();
    let second = users.create_user(input("grace@example.com")).await.unwrap();

    assert_ne!(first.id, second.id);
    assert!(matches!(
        users.get_user(first.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let h = harness().await;
    let users = h.services(Caller::system()).users();

    let mut weak = input("grace@example.com");
    weak.password = "short".to_string();

    assert!(matches!(
        users.create_user(weak).await,
        Err(ServiceError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_update_user_leaves_unset_fields() {
    let h = harness().await;
    let users = h.services(Caller::system()).users();
    let user = users.create_user(input("grace@example.com")).await.unwrap();

    let updated = users
        .update_user(
            user.id,
            UpdateUser {
                phone_number: Some("555-0100".to_string()),
                ..UpdateUser::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Grace");
    assert_eq!(updated.department.as_deref(), Some("Compilers"));
    assert_eq!(updated.phone_number.as_deref(), Some("555-0100"));
}

#[tokio::test]
async fn test_paged_users() {
    let h = harness().await;
    let users = h.services(Caller::system()).users();
    for i in 0..7 {
        seed_user(&h, "User", &format!("user{i}@example.com")).await;
    }

    let page = users
        .list_users_paged(common::PaginationParams::new(2, 5))
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.total_pages, 2);
    assert!(page.meta.has_previous_page);
    assert!(!page.meta.has_next_page);
}

#[test]
fn test_create_input_deserializes_with_defaults() {
    let input: CreateUser = serde_json::from_str(
        r#"{"first_name":"Ada","last_name":"King","email":"ada@example.com","password":"analytical"}"#,
    )
    .unwrap();

    assert_eq!(input.role, UserRole::Developer);
    assert!(input.department.is_none());
}
