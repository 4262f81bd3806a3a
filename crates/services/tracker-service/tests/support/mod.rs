//! Shared fixtures for service tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio::sync::{mpsc, Mutex};

use common::{AppResult, DatabaseConfig, IsolationSetting};
use domain::{Caller, Password, UserRole};
use persistence::entities::{project, task, user};
use persistence::{Database, Persistence, WriteRepository};
use tracker_service_lib::notifier::{Notification, Notifier};
use tracker_service_lib::service::Services;
use tracker_service_lib::Tracker;

/// Forwards every notification to the test.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: Notification) -> AppResult<()> {
        let _ = self.tx.send(notification);
        Ok(())
    }
}

/// Receiving end of a [`ChannelNotifier`].
pub struct Outbox {
    rx: Mutex<mpsc::UnboundedReceiver<Notification>>,
}

impl Outbox {
    /// Next notification, or `None` if nothing arrives shortly
    pub async fn next(&self) -> Option<Notification> {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Whether nothing is delivered within a short grace period
    pub async fn is_quiet(&self) -> bool {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(Duration::from_millis(100), rx.recv())
            .await
            .is_err()
    }
}

pub struct Harness {
    pub db: DatabaseConnection,
    pub tracker: Tracker,
    pub outbox: Outbox,
}

impl Harness {
    pub fn services(&self, caller: Caller) -> Services {
        self.tracker.services(caller)
    }

    pub fn persistence(&self) -> Persistence {
        Persistence::new(self.db.clone(), IsolationSetting::default())
    }
}

/// Fresh in-memory store with every migration applied.
pub async fn harness() -> Harness {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        isolation: IsolationSetting::ReadCommitted,
    };
    let db = Database::connect(&config)
        .await
        .expect("in-memory database should migrate")
        .get_connection();

    let (tx, rx) = mpsc::unbounded_channel();
    let tracker = Tracker::new(
        Persistence::new(db.clone(), IsolationSetting::default()),
        Arc::new(ChannelNotifier { tx }),
    );

    Harness {
        db,
        tracker,
        outbox: Outbox { rx: Mutex::new(rx) },
    }
}

pub fn caller(user: &user::Model) -> Caller {
    Caller::new(user.id, UserRole::ProjectManager)
}

pub async fn seed_user(h: &Harness, first_name: &str, email: &str) -> user::Model {
    let uow = h.persistence().unit_of_work(&Caller::system());
    let user = uow.users().add(user::Model::new(
        first_name,
        "Tester",
        email,
        Password::from_hash("$argon2id$v=19$stub".to_string()),
    ));
    uow.save_changes().await.expect("seeding user");
    user
}

pub async fn seed_project(h: &Harness, owner: &user::Model, name: &str) -> project::Model {
    let uow = h.persistence().unit_of_work(&caller(owner));
    let project = uow
        .projects()
        .add(project::Model::new(name, owner.id, Utc::now()));
    uow.save_changes().await.expect("seeding project");
    project
}

pub async fn seed_task(h: &Harness, project: &project::Model, title: &str) -> task::Model {
    let uow = h.persistence().unit_of_work(&Caller::system());
    let task = uow.tasks().add(task::Model::new(project.id, title));
    uow.save_changes().await.expect("seeding task");
    task
}
