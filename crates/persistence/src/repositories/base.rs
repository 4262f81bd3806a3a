//! Base repository traits following Interface Segregation Principle (ISP).
//!
//! Reads never return soft-deleted entities. Writes only stage changes; they
//! become durable when the owning unit of work saves.

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppResult, PageRequest, Paginated};

use crate::entities::BaseEntity;

/// Read operations (Query)
#[async_trait]
pub trait ReadRepository<T: BaseEntity>: Send + Sync {
    /// Live entity with this id, `None` when absent or deleted
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<T>>;

    async fn get_all(&self) -> AppResult<Vec<T>>;

    /// Live entities matching the predicate
    async fn find<F>(&self, predicate: F) -> AppResult<Vec<T>>
    where
        F: Fn(&T) -> bool + Send + Sync;

    /// First live match in storage order
    async fn first_or_default<F>(&self, predicate: F) -> AppResult<Option<T>>
    where
        F: Fn(&T) -> bool + Send + Sync;

    async fn any<F>(&self, predicate: F) -> AppResult<bool>
    where
        F: Fn(&T) -> bool + Send + Sync;

    async fn count<F>(&self, predicate: F) -> AppResult<u64>
    where
        F: Fn(&T) -> bool + Send + Sync;

    async fn get_paged(&self, page: PageRequest) -> AppResult<Paginated<T>>;

    /// One page of the live entities matching the predicate
    async fn get_paged_where<F>(&self, page: PageRequest, predicate: F) -> AppResult<Paginated<T>>
    where
        F: Fn(&T) -> bool + Send + Sync;
}

/// Write operations (Command). Each call stages a change and returns the
/// entity as it will be written.
pub trait WriteRepository<T: BaseEntity>: Send + Sync {
    fn add(&self, entity: T) -> T;

    fn update(&self, entity: T) -> T;

    /// Soft delete: flags the entity and stages an update
    fn remove(&self, entity: T) -> T;

    fn add_range(&self, entities: Vec<T>) -> Vec<T> {
        entities.into_iter().map(|entity| self.add(entity)).collect()
    }

    fn update_range(&self, entities: Vec<T>) -> Vec<T> {
        entities.into_iter().map(|entity| self.update(entity)).collect()
    }

    fn remove_range(&self, entities: Vec<T>) -> Vec<T> {
        entities.into_iter().map(|entity| self.remove(entity)).collect()
    }
}

/// Full CRUD repository - Combines all operations
pub trait CrudRepository<T: BaseEntity>: ReadRepository<T> + WriteRepository<T> {}

// Auto-implement CrudRepository for types implementing all traits
impl<R, T> CrudRepository<T> for R
where
    T: BaseEntity,
    R: ReadRepository<T> + WriteRepository<T>,
{
}
