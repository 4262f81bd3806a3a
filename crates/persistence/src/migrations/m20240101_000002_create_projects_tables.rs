//! Migration: Create projects and project_members tables.

use sea_orm_migration::prelude::*;

use super::schema::{
    create_live_unique_index, create_table, soft_delete_index, with_base_columns, Base,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(with_base_columns(
                create_table(Projects::Table)
                    .col(ColumnDef::new(Projects::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Projects::Description).text().null())
                    .col(ColumnDef::new(Projects::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Projects::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Projects::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Projects::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_owner")
                            .from(Projects::Table, Projects::OwnerId)
                            .to(Users::Table, Base::Id),
                    ),
            ))
            .await?;

        manager
            .create_index(soft_delete_index("idx_projects_is_deleted", Projects::Table))
            .await?;

        manager
            .create_table(with_base_columns(
                create_table(ProjectMembers::Table)
                    .col(ColumnDef::new(ProjectMembers::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(ProjectMembers::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProjectMembers::AccessLevel)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_members_project")
                            .from(ProjectMembers::Table, ProjectMembers::ProjectId)
                            .to(Projects::Table, Base::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_members_user")
                            .from(ProjectMembers::Table, ProjectMembers::UserId)
                            .to(Users::Table, Base::Id),
                    ),
            ))
            .await?;

        manager
            .create_index(soft_delete_index(
                "idx_project_members_is_deleted",
                ProjectMembers::Table,
            ))
            .await?;

        create_live_unique_index(
            manager,
            "ux_project_members_project_user",
            "project_members",
            &["project_id", "user_id"],
        )
        .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProjectMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
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
    Name,
    Description,
    OwnerId,
    StartDate,
    EndDate,
    IsArchived,
}

#[derive(Iden)]
enum ProjectMembers {
    Table,
    ProjectId,
    UserId,
    AccessLevel,
    JoinedAt,
}
