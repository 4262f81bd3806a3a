//! Tracker service configuration.

use std::env;

use common::{DatabaseConfig, IsolationSetting, NotificationConfig};

/// Tracker service configuration.
#[derive(Debug, Clone, Default)]
pub struct TrackerConfig {
    pub database: DatabaseConfig,
    pub notification: NotificationConfig,
}

impl TrackerConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = DatabaseConfig {
            url: env::var("TRACKER_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or(defaults.database.url),
            max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database.max_connections),
            min_connections: parsed("DATABASE_MIN_CONNECTIONS")
                .unwrap_or(defaults.database.min_connections),
            isolation: parsed::<IsolationSetting>("DATABASE_ISOLATION_LEVEL")
                .unwrap_or(defaults.database.isolation),
        };

        let notification = NotificationConfig {
            sender_address: env::var("NOTIFICATION_SENDER_ADDRESS")
                .unwrap_or(defaults.notification.sender_address),
            sender_name: env::var("NOTIFICATION_SENDER_NAME")
                .unwrap_or(defaults.notification.sender_name),
            enabled: env::var("NOTIFICATIONS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.notification.enabled),
        };

        Self {
            database,
            notification,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}
