//! Outbound notifications.
//!
//! Services build a [`Notification`] while they still hold the data it
//! mentions and hand it to [`dispatch`] once their changes are saved.
//! Delivery runs in its own task; a failure is logged and never reaches the
//! operation that triggered it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;

use common::{AppResult, NotificationConfig};
use domain::TaskStatus;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// What happened, with the context the message mentions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned {
        task_title: String,
        project_name: String,
    },
    TaskStatusChanged {
        task_title: String,
        old_status: TaskStatus,
        new_status: TaskStatus,
    },
    CommentAdded {
        task_title: String,
        commenter_name: String,
        content: String,
    },
    ProjectInvitation {
        project_name: String,
        inviter_name: String,
    },
    TaskDueReminder {
        task_title: String,
        due_date: DateTime<Utc>,
    },
}

impl NotificationKind {
    pub fn subject(&self) -> String {
        match self {
            NotificationKind::TaskAssigned { task_title, .. } => {
                format!("Task Assigned: {task_title}")
            }
            NotificationKind::TaskStatusChanged { task_title, .. } => {
                format!("Task Status Updated: {task_title}")
            }
            NotificationKind::CommentAdded { task_title, .. } => {
                format!("New comment on: {task_title}")
            }
            NotificationKind::ProjectInvitation { project_name, .. } => {
                format!("Project Invitation: {project_name}")
            }
            NotificationKind::TaskDueReminder { task_title, .. } => {
                format!("Task Due Reminder: {task_title}")
            }
        }
    }

    /// Plain text body addressed to `recipient_name`
    pub fn body(&self, recipient_name: &str) -> String {
        let detail = match self {
            NotificationKind::TaskAssigned {
                task_title,
                project_name,
            } => format!(
                "You have been assigned to task: {task_title}\nProject: {project_name}\n\
                 Please log in to the system to view more details."
            ),
            NotificationKind::TaskStatusChanged {
                task_title,
                old_status,
                new_status,
            } => format!("Task {task_title} status has changed from {old_status} to {new_status}"),
            NotificationKind::CommentAdded {
                task_title,
                commenter_name,
                content,
            } => format!("{commenter_name} commented on task {task_title}\nComment: {content}"),
            NotificationKind::ProjectInvitation {
                project_name,
                inviter_name,
            } => format!(
                "{inviter_name} invited you to project {project_name}\n\
                 Log in to accept the invitation."
            ),
            NotificationKind::TaskDueReminder {
                task_title,
                due_date,
            } => format!(
                "Your task {task_title} is due on {}\nPlease complete it on time.",
                due_date.format("%d/%m/%Y")
            ),
        };

        format!("Hi {recipient_name},\n\n{detail}")
    }
}

/// A message for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient_email: String,
    pub recipient_name: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(
        recipient_email: impl Into<String>,
        recipient_name: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            recipient_email: recipient_email.into(),
            recipient_name: recipient_name.into(),
            kind,
        }
    }

    pub fn subject(&self) -> String {
        self.kind.subject()
    }

    pub fn body(&self) -> String {
        self.kind.body(&self.recipient_name)
    }
}

/// Delivery channel for notifications.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> AppResult<()>;
}

/// Writes notifications to the log instead of sending them.
pub struct LogNotifier {
    config: NotificationConfig,
}

impl LogNotifier {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> AppResult<()> {
        if !self.config.enabled {
            tracing::debug!(to = %notification.recipient_email, "Notifications disabled, dropping");
            return Ok(());
        }

        tracing::info!(
            "=== NOTIFICATION (not sent) ===\n\
             From: {} <{}>\n\
             To: {} <{}>\n\
             Subject: {}\n\
             Body:\n{}\n\
             ===============================",
            self.config.sender_name,
            self.config.sender_address,
            notification.recipient_name,
            notification.recipient_email,
            notification.subject(),
            notification.body()
        );
        Ok(())
    }
}

/// Deliver `notification` in the background.
///
/// The returned handle may be dropped; failures are only logged.
pub fn dispatch(notifier: Arc<dyn Notifier>, notification: Notification) -> JoinHandle<()> {
    tokio::spawn(async move {
        let to = notification.recipient_email.clone();
        let subject = notification.subject();
        match notifier.notify(notification).await {
            Ok(()) => tracing::debug!(%to, %subject, "Notification delivered"),
            Err(e) => tracing::warn!(%to, %subject, error = %e, "Notification failed"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;
    use tokio_test::{assert_ok, block_on};

    fn assigned() -> Notification {
        Notification::new(
            "ada@example.com",
            "Ada Lovelace",
            NotificationKind::TaskAssigned {
                task_title: "Write parser".to_string(),
                project_name: "Engine".to_string(),
            },
        )
    }

    #[test]
    fn test_subject_and_body_carry_context() {
        let n = assigned();
        assert_eq!(n.subject(), "Task Assigned: Write parser");
        assert!(n.body().starts_with("Hi Ada Lovelace,"));
        assert!(n.body().contains("Project: Engine"));

        let changed = NotificationKind::TaskStatusChanged {
            task_title: "Write parser".to_string(),
            old_status: TaskStatus::Todo,
            new_status: TaskStatus::InReview,
        };
        assert!(changed.body("Ada").contains("from todo to in_review"));
    }

    #[test]
    fn test_due_reminder_formats_day_first() {
        let due = DateTime::parse_from_rfc3339("2024-03-09T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let kind = NotificationKind::TaskDueReminder {
            task_title: "Ship".to_string(),
            due_date: due,
        };
        assert!(kind.body("Ada").contains("due on 09/03/2024"));
    }

    #[test]
    fn test_log_notifier_accepts_everything() {
        let notifier = LogNotifier::new(NotificationConfig::default());
        assert_ok!(block_on(notifier.notify(assigned())));

        let disabled = LogNotifier::new(NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        });
        assert_ok!(block_on(disabled.notify(assigned())));
    }

    #[tokio::test]
    async fn test_dispatch_swallows_failures() {
        let mut mock = MockNotifier::new();
        mock.expect_notify()
            .times(1)
            .returning(|_| Err(AppError::internal("smtp down")));

        let handle = dispatch(Arc::new(mock), assigned());

        assert!(handle.await.is_ok());
    }
}
