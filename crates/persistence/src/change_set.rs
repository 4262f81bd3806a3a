//! Changes staged by repositories and flushed by the unit of work.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter,
};
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::BaseEntity;

/// How a staged entity is written on save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
}

/// One staged write, type-erased so a single batch can span every entity type.
#[async_trait]
pub(crate) trait PendingChange: Send + Sync {
    fn entity_name(&self) -> &'static str;
    fn entity_id(&self) -> Uuid;
    fn kind(&self) -> ChangeKind;
    fn as_any(&self) -> &dyn Any;

    /// Write the change, returning the number of affected rows.
    async fn flush(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr>;
}

pub(crate) struct Staged<T> {
    kind: ChangeKind,
    entity: T,
}

#[async_trait]
impl<T> PendingChange for Staged<T>
where
    T: BaseEntity + IntoActiveModel<T::ActiveModel>,
{
    fn entity_name(&self) -> &'static str {
        T::NAME
    }

    fn entity_id(&self) -> Uuid {
        self.entity.id()
    }

    fn kind(&self) -> ChangeKind {
        self.kind
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn flush(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr> {
        let mut model = self.entity.clone().into_active_model().reset_all();

        match self.kind {
            ChangeKind::Insert => T::Entity::insert(model).exec_without_returning(txn).await,
            ChangeKind::Update => {
                // Identity and creation stamps are immutable once written
                model.not_set(T::id_column());
                model.not_set(T::created_at_column());
                model.not_set(T::created_by_column());

                let result = T::Entity::update_many()
                    .set(model)
                    .filter(T::id_column().eq(self.entity.id()))
                    .exec(txn)
                    .await?;

                if result.rows_affected == 0 {
                    return Err(DbErr::RecordNotFound(T::NAME.to_string()));
                }
                Ok(result.rows_affected)
            }
        }
    }
}

/// Ordered batch of staged writes.
#[derive(Default)]
pub(crate) struct ChangeSet {
    pending: Vec<Box<dyn PendingChange>>,
}

impl ChangeSet {
    pub fn stage<T>(&mut self, kind: ChangeKind, entity: T)
    where
        T: BaseEntity + IntoActiveModel<T::ActiveModel>,
    {
        tracing::trace!(entity = T::NAME, id = %entity.id(), ?kind, "Change staged");
        self.pending.push(Box::new(Staged { kind, entity }));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the whole batch in staging order.
    pub fn take(&mut self) -> Vec<Box<dyn PendingChange>> {
        std::mem::take(&mut self.pending)
    }

    /// Merge this batch into rows loaded from the store.
    ///
    /// Staged versions replace persisted rows with the same id, entities first
    /// staged as inserts are appended in staging order, and anything that ends
    /// up soft-deleted is dropped.
    pub fn overlay<T: BaseEntity>(&self, persisted: Vec<T>) -> Vec<T> {
        let mut latest: HashMap<Uuid, (ChangeKind, T)> = HashMap::new();
        let mut order = Vec::new();

        for change in &self.pending {
            let Some(staged) = change.as_any().downcast_ref::<Staged<T>>() else {
                continue;
            };
            match latest.entry(staged.entity.id()) {
                Entry::Vacant(slot) => {
                    order.push(staged.entity.id());
                    slot.insert((staged.kind, staged.entity.clone()));
                }
                Entry::Occupied(mut slot) => slot.get_mut().1 = staged.entity.clone(),
            }
        }

        let mut merged: Vec<T> = persisted
            .into_iter()
            .map(|row| match latest.remove(&row.id()) {
                Some((_, staged)) => staged,
                None => row,
            })
            .collect();

        merged.extend(
            order
                .into_iter()
                .filter_map(|id| latest.remove(&id))
                .filter(|(first_kind, _)| *first_kind == ChangeKind::Insert)
                .map(|(_, entity)| entity),
        );

        merged.retain(|entity| !entity.is_deleted());
        merged
    }
}
