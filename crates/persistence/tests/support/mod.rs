//! Shared fixtures for persistence integration tests.

#![allow(dead_code)]

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use common::{DatabaseConfig, IsolationSetting};
use domain::Password;
use persistence::entities::{project, user};
use persistence::{Database, UnitOfWork, WriteRepository};

/// Fresh in-memory database with every migration applied.
pub async fn setup_db() -> DatabaseConnection {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        isolation: IsolationSetting::ReadCommitted,
    };

    Database::connect(&config)
        .await
        .expect("in-memory database should migrate")
        .get_connection()
}

pub fn uow(db: &DatabaseConnection) -> UnitOfWork {
    UnitOfWork::new(db.clone(), None, IsolationSetting::default())
}

pub fn test_user(email: &str) -> user::Model {
    user::Model::new(
        "Test",
        "User",
        email,
        Password::from_hash("$argon2id$v=19$stub".to_string()),
    )
}

pub fn test_users(count: usize) -> Vec<user::Model> {
    (0..count)
        .map(|i| test_user(&format!("user{i}@example.com")))
        .collect()
}

/// Persist users through a throwaway unit of work.
pub async fn seed_users(db: &DatabaseConnection, count: usize) -> Vec<user::Model> {
    let scope = uow(db);
    let users = scope.users().add_range(test_users(count));
    scope.save_changes().await.expect("seeding users");
    users
}

pub async fn seed_project(db: &DatabaseConnection, owner: Uuid) -> project::Model {
    let scope = uow(db);
    let project = scope
        .projects()
        .add(project::Model::new("Apollo", owner, chrono::Utc::now()));
    scope.save_changes().await.expect("seeding project");
    project
}
