//! SeaORM entities and the base contract every persisted entity satisfies.

pub mod activity_log;
pub mod attachment;
pub mod project;
pub mod project_member;
pub mod task;
pub mod task_comment;
pub mod user;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, FromQueryResult};
use std::fmt::Debug;
use uuid::Uuid;

/// Column type of the entity behind a model
pub type ColumnOf<T> = <<T as BaseEntity>::Entity as EntityTrait>::Column;

/// Identity and audit fields shared by every persisted entity.
///
/// Implemented on each entity's `Model`. The generic repository relies only
/// on this trait, so it never needs to know an entity's domain fields.
pub trait BaseEntity: Clone + Debug + Send + Sync + FromQueryResult + 'static {
    type Entity: EntityTrait<Model = Self>;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + From<Self> + Send + Sync + 'static;

    /// Name used in not-found outcomes and log fields
    const NAME: &'static str;

    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
    fn is_deleted(&self) -> bool;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Set creation and modification stamps for a new row.
    fn stamp_created(&mut self, actor: Option<Uuid>, at: DateTime<Utc>);

    /// Set modification stamps. Creation stamps stay untouched.
    fn stamp_updated(&mut self, actor: Option<Uuid>, at: DateTime<Utc>);

    /// Turn the entity into a tombstone.
    fn mark_deleted(&mut self, at: DateTime<Utc>);

    fn id_column() -> ColumnOf<Self>;
    fn is_deleted_column() -> ColumnOf<Self>;
    fn created_at_column() -> ColumnOf<Self>;
    fn created_by_column() -> ColumnOf<Self>;
}

macro_rules! impl_base_entity {
    ($($module:ident => $name:expr),+ $(,)?) => {
        $(
            impl BaseEntity for $module::Model {
                type Entity = $module::Entity;
                type ActiveModel = $module::ActiveModel;

                const NAME: &'static str = $name;

                fn id(&self) -> Uuid {
                    self.id
                }

                fn set_id(&mut self, id: Uuid) {
                    self.id = id;
                }

                fn is_deleted(&self) -> bool {
                    self.is_deleted
                }

                fn deleted_at(&self) -> Option<DateTime<Utc>> {
                    self.deleted_at
                }

                fn stamp_created(&mut self, actor: Option<Uuid>, at: DateTime<Utc>) {
                    self.created_at = at;
                    self.created_by = actor;
                    self.updated_at = at;
                    self.updated_by = actor;
                }

                fn stamp_updated(&mut self, actor: Option<Uuid>, at: DateTime<Utc>) {
                    self.updated_at = at;
                    self.updated_by = actor;
                }

                fn mark_deleted(&mut self, at: DateTime<Utc>) {
                    self.is_deleted = true;
                    self.deleted_at = Some(at);
                }

                fn id_column() -> ColumnOf<Self> {
                    $module::Column::Id
                }

                fn is_deleted_column() -> ColumnOf<Self> {
                    $module::Column::IsDeleted
                }

                fn created_at_column() -> ColumnOf<Self> {
                    $module::Column::CreatedAt
                }

                fn created_by_column() -> ColumnOf<Self> {
                    $module::Column::CreatedBy
                }
            }
        )+
    };
}

impl_base_entity! {
    user => domain::ENTITY_USER,
    project => domain::ENTITY_PROJECT,
    project_member => domain::ENTITY_PROJECT_MEMBER,
    task => domain::ENTITY_TASK,
    task_comment => domain::ENTITY_COMMENT,
    attachment => domain::ENTITY_ATTACHMENT,
    activity_log => domain::ENTITY_ACTIVITY_LOG,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stamp_updated_keeps_creation_stamps() {
        let creator = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let created = Utc::now() - Duration::hours(1);

        let mut model = task::Model::new(Uuid::new_v4(), "Write docs");
        model.stamp_created(Some(creator), created);
        model.stamp_updated(Some(editor), Utc::now());

        assert_eq!(model.created_at, created);
        assert_eq!(model.created_by, Some(creator));
        assert_eq!(model.updated_by, Some(editor));
        assert!(model.updated_at > created);
    }

    #[test]
    fn test_mark_deleted_sets_both_markers() {
        let mut model = project::Model::new("Apollo", Uuid::new_v4(), Utc::now());
        assert!(!model.is_deleted());

        let at = Utc::now();
        model.mark_deleted(at);

        assert!(model.is_deleted());
        assert_eq!(model.deleted_at(), Some(at));
    }
}
