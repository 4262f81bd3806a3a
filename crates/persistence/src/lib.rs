//! Persistence core of the task tracker.
//!
//! - [`entities`]: SeaORM entities and the [`BaseEntity`] contract
//! - [`repositories`]: one generic, soft-delete aware repository for every entity
//! - [`UnitOfWork`]: staged changes, atomic saves and explicit transactions
//! - [`Database`] and [`Migrator`]: connection management and schema

mod change_set;
mod db;
pub mod entities;
pub mod migrations;
pub mod repositories;
mod unit_of_work;

pub use change_set::ChangeKind;
pub use db::Database;
pub use entities::BaseEntity;
pub use migrations::Migrator;
pub use repositories::{CrudRepository, EntityRepository, ReadRepository, WriteRepository};
pub use unit_of_work::{CommitOutcome, Persistence, UnitOfWork};
