//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Owns one repository per entity type for its whole lifetime
//! - Collects the changes staged through those repositories
//! - Flushes them as one atomic write on `save_changes`
//! - Optionally brackets several saves in an explicit transaction
//!
//! One unit of work serves one logical request and is never shared between
//! concurrent operations.

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, EntityTrait,
    IsolationLevel, Select, TransactionTrait,
};
use std::sync::{Arc, MutexGuard, PoisonError};
use tokio::sync::Mutex;
use uuid::Uuid;

use common::{AppError, AppResult, IsolationSetting};
use domain::Caller;

use crate::change_set::{ChangeSet, PendingChange};
use crate::entities::{activity_log, attachment, project, project_member, task, task_comment, user};
use crate::repositories::EntityRepository;

/// Result of [`UnitOfWork::commit_transaction`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Pending changes were flushed and the transaction committed
    Committed { affected: u64 },
    /// Flushing or committing failed; everything since `begin_transaction` was undone
    RolledBack,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// Store session shared by the repositories of one unit of work.
pub(crate) struct Session {
    db: DatabaseConnection,
    txn: Mutex<Option<DatabaseTransaction>>,
    changes: std::sync::Mutex<ChangeSet>,
    actor: Option<Uuid>,
}

impl Session {
    fn new(db: DatabaseConnection, actor: Option<Uuid>) -> Self {
        Self {
            db,
            txn: Mutex::new(None),
            changes: std::sync::Mutex::new(ChangeSet::default()),
            actor,
        }
    }

    /// Id stamped into `created_by`/`updated_by`
    pub fn actor(&self) -> Option<Uuid> {
        self.actor
    }

    pub fn changes(&self) -> MutexGuard<'_, ChangeSet> {
        // Staging never panics mid-update, so a poisoned batch is still consistent
        self.changes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a select inside the explicit transaction when one is open.
    pub async fn fetch<E: EntityTrait>(&self, select: Select<E>) -> Result<Vec<E::Model>, DbErr> {
        let txn = self.txn.lock().await;
        match txn.as_ref() {
            Some(txn) => select.all(txn).await,
            None => select.all(&self.db).await,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.txn.get_mut().is_some() {
            tracing::warn!("Unit of work dropped with an open transaction, rolling back");
        }
        let unsaved = self.changes.get_mut().map(|c| c.len()).unwrap_or_default();
        if unsaved > 0 {
            tracing::debug!(unsaved, "Unit of work dropped with unsaved changes");
        }
    }
}

/// Coordinates repositories and the transaction boundary for one request.
pub struct UnitOfWork {
    session: Arc<Session>,
    isolation: Option<IsolationLevel>,
    users: EntityRepository<user::Model>,
    projects: EntityRepository<project::Model>,
    project_members: EntityRepository<project_member::Model>,
    tasks: EntityRepository<task::Model>,
    task_comments: EntityRepository<task_comment::Model>,
    attachments: EntityRepository<attachment::Model>,
    activity_logs: EntityRepository<activity_log::Model>,
}

impl UnitOfWork {
    /// Create a unit of work acting on behalf of `actor`.
    pub fn new(db: DatabaseConnection, actor: Option<Uuid>, isolation: IsolationSetting) -> Self {
        let isolation = isolation_level(&db, isolation);
        let session = Arc::new(Session::new(db, actor));

        Self {
            users: EntityRepository::new(session.clone()),
            projects: EntityRepository::new(session.clone()),
            project_members: EntityRepository::new(session.clone()),
            tasks: EntityRepository::new(session.clone()),
            task_comments: EntityRepository::new(session.clone()),
            attachments: EntityRepository::new(session.clone()),
            activity_logs: EntityRepository::new(session.clone()),
            session,
            isolation,
        }
    }

    pub fn users(&self) -> &EntityRepository<user::Model> {
        &self.users
    }

    pub fn projects(&self) -> &EntityRepository<project::Model> {
        &self.projects
    }

    pub fn project_members(&self) -> &EntityRepository<project_member::Model> {
        &self.project_members
    }

    pub fn tasks(&self) -> &EntityRepository<task::Model> {
        &self.tasks
    }

    pub fn task_comments(&self) -> &EntityRepository<task_comment::Model> {
        &self.task_comments
    }

    pub fn attachments(&self) -> &EntityRepository<attachment::Model> {
        &self.attachments
    }

    pub fn activity_logs(&self) -> &EntityRepository<activity_log::Model> {
        &self.activity_logs
    }

    /// Number of staged changes not yet saved
    pub fn pending_changes(&self) -> usize {
        self.session.changes().len()
    }

    pub async fn has_active_transaction(&self) -> bool {
        self.session.txn.lock().await.is_some()
    }

    /// Flush every staged change as one atomic write.
    ///
    /// Inside an explicit transaction the batch is wrapped in a savepoint, so
    /// a failure undoes only this batch. On failure the batch is discarded
    /// and the storage error is returned.
    pub async fn save_changes(&self) -> AppResult<u64> {
        let batch = self.session.changes().take();
        if batch.is_empty() {
            return Ok(0);
        }

        let txn = self.session.txn.lock().await;
        let scope = match txn.as_ref() {
            Some(outer) => outer.begin().await?,
            None => {
                self.session
                    .db
                    .begin_with_config(self.isolation, None)
                    .await?
            }
        };

        let affected = flush(scope, &batch).await.map_err(|e| {
            tracing::error!(error = %e, changes = batch.len(), "Save failed, changes discarded");
            AppError::from(e)
        })?;

        tracing::debug!(changes = batch.len(), affected, "Changes saved");
        Ok(affected)
    }

    /// Open an explicit transaction spanning several saves.
    pub async fn begin_transaction(&self) -> AppResult<()> {
        let mut txn = self.session.txn.lock().await;
        if txn.is_some() {
            return Err(AppError::invalid_precondition(
                "a transaction is already active",
            ));
        }

        *txn = Some(
            self.session
                .db
                .begin_with_config(self.isolation, None)
                .await?,
        );
        tracing::debug!("Transaction started");
        Ok(())
    }

    /// Flush pending changes and commit the explicit transaction.
    ///
    /// A failure while flushing or committing rolls the transaction back and
    /// is reported as [`CommitOutcome::RolledBack`]. Either way the
    /// transaction is released.
    pub async fn commit_transaction(&self) -> AppResult<CommitOutcome> {
        let txn = self
            .session
            .txn
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::invalid_precondition("no active transaction to commit"))?;
        let batch = self.session.changes().take();

        match flush(txn, &batch).await {
            Ok(affected) => {
                tracing::info!(affected, "Transaction committed");
                Ok(CommitOutcome::Committed { affected })
            }
            Err(e) => {
                tracing::error!(error = %e, "Commit failed, transaction rolled back");
                Ok(CommitOutcome::RolledBack)
            }
        }
    }

    /// Discard the explicit transaction and every unsaved change.
    ///
    /// The transaction is released even when the rollback itself fails.
    pub async fn rollback_transaction(&self) -> AppResult<()> {
        let txn = self
            .session
            .txn
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::invalid_precondition("no active transaction to roll back"))?;
        let discarded = self.session.changes().take().len();

        txn.rollback().await.map_err(|e| {
            tracing::error!("Transaction rollback failed: {}", e);
            AppError::from(e)
        })?;

        tracing::info!(discarded, "Transaction rolled back");
        Ok(())
    }

    /// Release the session, rolling back a transaction left open.
    pub async fn close(self) -> AppResult<()> {
        let open = self.session.txn.lock().await.take();
        if let Some(txn) = open {
            tracing::warn!("Unit of work closed with an open transaction, rolling back");
            txn.rollback().await?;
        }
        Ok(())
    }
}

/// Write a batch inside `txn`, then commit it. Any failure rolls `txn` back.
async fn flush(txn: DatabaseTransaction, batch: &[Box<dyn PendingChange>]) -> Result<u64, DbErr> {
    let mut affected = 0;

    for change in batch {
        match change.flush(&txn).await {
            Ok(rows) => affected += rows,
            Err(e) => {
                tracing::warn!(
                    entity = change.entity_name(),
                    id = %change.entity_id(),
                    kind = ?change.kind(),
                    error = %e,
                    "Write rejected"
                );
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                return Err(e);
            }
        }
    }

    // A rejected COMMIT leaves `txn` open; dropping it rolls back
    txn.commit().await?;
    Ok(affected)
}

/// SQLite has no per-transaction isolation level; it always runs serialized.
fn isolation_level(db: &DatabaseConnection, setting: IsolationSetting) -> Option<IsolationLevel> {
    if db.get_database_backend() == DbBackend::Sqlite {
        return None;
    }

    Some(match setting {
        IsolationSetting::ReadCommitted => IsolationLevel::ReadCommitted,
        IsolationSetting::RepeatableRead => IsolationLevel::RepeatableRead,
        IsolationSetting::Serializable => IsolationLevel::Serializable,
    })
}

/// Creates one [`UnitOfWork`] per request over a shared connection pool.
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
    isolation: IsolationSetting,
}

impl Persistence {
    pub fn new(db: DatabaseConnection, isolation: IsolationSetting) -> Self {
        Self { db, isolation }
    }

    /// Fresh unit of work stamping changes with the caller's id.
    pub fn unit_of_work(&self, caller: &Caller) -> UnitOfWork {
        UnitOfWork::new(self.db.clone(), caller.actor_id(), self.isolation)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}
