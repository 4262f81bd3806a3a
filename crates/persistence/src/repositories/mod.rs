//! Repository layer - Data access abstraction
//!
//! One generic repository serves every entity type through the
//! [`BaseEntity`](crate::entities::BaseEntity) contract.

mod base;
mod entity_repository;

pub use base::{CrudRepository, ReadRepository, WriteRepository};
pub use entity_repository::EntityRepository;
