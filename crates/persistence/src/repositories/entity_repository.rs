//! Generic repository backed by the unit of work's session.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppResult, PageRequest, Paginated};

use super::base::{ReadRepository, WriteRepository};
use crate::change_set::ChangeKind;
use crate::entities::BaseEntity;
use crate::unit_of_work::Session;

/// Repository for one entity type.
///
/// Instances are created by [`UnitOfWork`](crate::UnitOfWork) and share its
/// session, so every repository of one unit of work sees the same staged
/// changes.
pub struct EntityRepository<T> {
    session: Arc<Session>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: BaseEntity> EntityRepository<T> {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    /// Single execution path for every read.
    ///
    /// The store filters out tombstones (and narrows to `id` when given).
    /// Staged changes of this scope are merged in before the predicate runs.
    async fn live<F>(&self, id: Option<Uuid>, predicate: F) -> AppResult<Vec<T>>
    where
        F: Fn(&T) -> bool + Send + Sync,
    {
        let mut select = T::Entity::find()
            .filter(T::is_deleted_column().eq(false))
            .order_by_asc(T::created_at_column())
            .order_by_asc(T::id_column());
        if let Some(id) = id {
            select = select.filter(T::id_column().eq(id));
        }

        let persisted = self.session.fetch(select).await?;
        let merged = self.session.changes().overlay(persisted);

        Ok(merged
            .into_iter()
            .filter(|entity| id.map_or(true, |id| entity.id() == id))
            .filter(|entity| predicate(entity))
            .collect())
    }
}

#[async_trait]
impl<T: BaseEntity> ReadRepository<T> for EntityRepository<T> {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<T>> {
        Ok(self.live(Some(id), |_| true).await?.into_iter().next())
    }

    async fn get_all(&self) -> AppResult<Vec<T>> {
        self.live(None, |_| true).await
    }

    async fn find<F>(&self, predicate: F) -> AppResult<Vec<T>>
    where
        F: Fn(&T) -> bool + Send + Sync,
    {
        self.live(None, predicate).await
    }

    async fn first_or_default<F>(&self, predicate: F) -> AppResult<Option<T>>
    where
        F: Fn(&T) -> bool + Send + Sync,
    {
        Ok(self.live(None, predicate).await?.into_iter().next())
    }

    async fn any<F>(&self, predicate: F) -> AppResult<bool>
    where
        F: Fn(&T) -> bool + Send + Sync,
    {
        Ok(!self.live(None, predicate).await?.is_empty())
    }

    async fn count<F>(&self, predicate: F) -> AppResult<u64>
    where
        F: Fn(&T) -> bool + Send + Sync,
    {
        Ok(self.live(None, predicate).await?.len() as u64)
    }

    async fn get_paged(&self, page: PageRequest) -> AppResult<Paginated<T>> {
        self.get_paged_where(page, |_| true).await
    }

    async fn get_paged_where<F>(&self, page: PageRequest, predicate: F) -> AppResult<Paginated<T>>
    where
        F: Fn(&T) -> bool + Send + Sync,
    {
        let filtered = self.live(None, predicate).await?;
        Ok(Paginated::slice(filtered, page))
    }
}

impl<T> WriteRepository<T> for EntityRepository<T>
where
    T: BaseEntity + IntoActiveModel<T::ActiveModel>,
{
    fn add(&self, mut entity: T) -> T {
        if entity.id().is_nil() {
            entity.set_id(Uuid::new_v4());
        }
        entity.stamp_created(self.session.actor(), Utc::now());
        self.session
            .changes()
            .stage(ChangeKind::Insert, entity.clone());
        entity
    }

    fn update(&self, mut entity: T) -> T {
        entity.stamp_updated(self.session.actor(), Utc::now());
        self.session
            .changes()
            .stage(ChangeKind::Update, entity.clone());
        entity
    }

    fn remove(&self, mut entity: T) -> T {
        let now = Utc::now();
        entity.mark_deleted(now);
        entity.stamp_updated(self.session.actor(), now);
        self.session
            .changes()
            .stage(ChangeKind::Update, entity.clone());
        entity
    }
}
