//! Migration: Create activity_logs table.

use sea_orm_migration::prelude::*;

use super::schema::{create_table, soft_delete_index, with_base_columns, Base};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(with_base_columns(
                create_table(ActivityLogs::Table)
                    .col(ColumnDef::new(ActivityLogs::UserId).uuid().not_null())
                    .col(ColumnDef::new(ActivityLogs::TaskId).uuid().null())
                    .col(ColumnDef::new(ActivityLogs::ProjectId).uuid().null())
                    .col(ColumnDef::new(ActivityLogs::Action).string_len(100).not_null())
                    .col(ColumnDef::new(ActivityLogs::Description).text().null())
                    .col(ColumnDef::new(ActivityLogs::OldValue).text().null())
                    .col(ColumnDef::new(ActivityLogs::NewValue).text().null())
                    .col(
                        ColumnDef::new(ActivityLogs::ActionAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_logs_user")
                            .from(ActivityLogs::Table, ActivityLogs::UserId)
                            .to(Users::Table, Base::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_logs_task")
                            .from(ActivityLogs::Table, ActivityLogs::TaskId)
                            .to(Tasks::Table, Base::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_logs_project")
                            .from(ActivityLogs::Table, ActivityLogs::ProjectId)
                            .to(Projects::Table, Base::Id),
                    ),
            ))
            .await?;

        manager
            .create_index(soft_delete_index(
                "idx_activity_logs_is_deleted",
                ActivityLogs::Table,
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
}

#[derive(Iden)]
enum Projects {
    Table,
}

#[derive(Iden)]
enum Tasks {
    Table,
}

#[derive(Iden)]
enum ActivityLogs {
    Table,
    UserId,
    TaskId,
    ProjectId,
    Action,
    Description,
    OldValue,
    NewValue,
    ActionAt,
}
