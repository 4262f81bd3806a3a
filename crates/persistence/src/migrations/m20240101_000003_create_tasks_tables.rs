//! Migration: Create tasks, task_comments and attachments tables.

use sea_orm_migration::prelude::*;

use super::schema::{create_table, soft_delete_index, with_base_columns, Base};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(with_base_columns(
                create_table(Tasks::Table)
                    .col(ColumnDef::new(Tasks::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Tasks::Description).text().null())
                    .col(ColumnDef::new(Tasks::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Tasks::AssignedToId).uuid().null())
                    .col(ColumnDef::new(Tasks::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Tasks::Priority).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Tasks::StartDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Tasks::DueDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Tasks::EstimatedHours).integer().null())
                    .col(ColumnDef::new(Tasks::ActualHours).integer().null())
                    .col(ColumnDef::new(Tasks::ParentTaskId).uuid().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_project")
                            .from(Tasks::Table, Tasks::ProjectId)
                            .to(Projects::Table, Base::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_assignee")
                            .from(Tasks::Table, Tasks::AssignedToId)
                            .to(Users::Table, Base::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_parent")
                            .from(Tasks::Table, Tasks::ParentTaskId)
                            .to(Tasks::Table, Base::Id),
                    ),
            ))
            .await?;

        manager
            .create_index(soft_delete_index("idx_tasks_is_deleted", Tasks::Table))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_project_id")
                    .table(Tasks::Table)
                    .col(Tasks::ProjectId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(with_base_columns(
                create_table(TaskComments::Table)
                    .col(ColumnDef::new(TaskComments::TaskId).uuid().not_null())
                    .col(ColumnDef::new(TaskComments::UserId).uuid().not_null())
                    .col(ColumnDef::new(TaskComments::Content).text().not_null())
                    .col(
                        ColumnDef::new(TaskComments::CommentedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_comments_task")
                            .from(TaskComments::Table, TaskComments::TaskId)
                            .to(Tasks::Table, Base::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_comments_user")
                            .from(TaskComments::Table, TaskComments::UserId)
                            .to(Users::Table, Base::Id),
                    ),
            ))
            .await?;

        manager
            .create_index(soft_delete_index(
                "idx_task_comments_is_deleted",
                TaskComments::Table,
            ))
            .await?;

        manager
            .create_table(with_base_columns(
                create_table(Attachments::Table)
                    .col(ColumnDef::new(Attachments::TaskId).uuid().not_null())
                    .col(ColumnDef::new(Attachments::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(Attachments::FilePath).string().not_null())
                    .col(ColumnDef::new(Attachments::FileSize).big_integer().not_null())
                    .col(
                        ColumnDef::new(Attachments::ContentType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Attachments::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_task")
                            .from(Attachments::Table, Attachments::TaskId)
                            .to(Tasks::Table, Base::Id),
                    ),
            ))
            .await?;

        manager
            .create_index(soft_delete_index(
                "idx_attachments_is_deleted",
                Attachments::Table,
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attachments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
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
    Title,
    Description,
    ProjectId,
    AssignedToId,
    Status,
    Priority,
    StartDate,
    DueDate,
    EstimatedHours,
    ActualHours,
    ParentTaskId,
}

#[derive(Iden)]
enum TaskComments {
    Table,
    TaskId,
    UserId,
    Content,
    CommentedAt,
}

#[derive(Iden)]
enum Attachments {
    Table,
    TaskId,
    FileName,
    FilePath,
    FileSize,
    ContentType,
    UploadedAt,
}
