//! Tracker Service Library
//!
//! Domain services of the task tracker on top of the `persistence` crate,
//! the notifier they report through, and the entry points used by the
//! `tracker-service` binary.

pub mod config;
pub mod notifier;
pub mod service;

use std::sync::Arc;

use tracing::info;

use domain::Caller;
use persistence::{Database, Persistence};

use crate::config::TrackerConfig;
use crate::notifier::{LogNotifier, Notifier};
use crate::service::{ServiceContainer, Services};

/// Connected store plus notifier; hands out per-caller service containers.
#[derive(Clone)]
pub struct Tracker {
    persistence: Persistence,
    notifier: Arc<dyn Notifier>,
}

impl Tracker {
    pub fn new(persistence: Persistence, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            persistence,
            notifier,
        }
    }

    /// Connect, apply pending migrations and log notifications.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::connect(&config.database).await?;
        let persistence = Persistence::new(db.get_connection(), config.database.isolation);
        let notifier = Arc::new(LogNotifier::new(config.notification.clone()));

        Ok(Self::new(persistence, notifier))
    }

    /// Services acting on behalf of `caller`
    pub fn services(&self, caller: Caller) -> Services {
        Services::new(self.persistence.clone(), self.notifier.clone(), caller)
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Check that the configured database answers.
pub async fn ping() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;
    db.ping().await?;
    info!("Database reachable");
    Ok(())
}

/// Send due-date reminders for tasks due within `hours`.
pub async fn send_due_reminders(hours: i64) -> Result<usize, Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env();
    let tracker = Tracker::connect(&config).await?;

    let sent = tracker
        .services(Caller::system())
        .tasks()
        .send_due_reminders(chrono::Duration::hours(hours))
        .await?;
    Ok(sent)
}
