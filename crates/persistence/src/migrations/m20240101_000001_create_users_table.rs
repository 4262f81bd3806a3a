//! Migration: Create users table.

use sea_orm_migration::prelude::*;

use super::schema::{create_live_unique_index, create_table, soft_delete_index, with_base_columns};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(with_base_columns(
                create_table(Users::Table)
                    .col(ColumnDef::new(Users::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(256).not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(32).null())
                    .col(ColumnDef::new(Users::Avatar).string().null())
                    .col(ColumnDef::new(Users::Department).string_len(100).null())
                    .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::LastLoginAt)
                            .timestamp_with_time_zone()
                            .null(),
                    ),
            ))
            .await?;

        manager
            .create_index(soft_delete_index("idx_users_is_deleted", Users::Table))
            .await?;

        create_live_unique_index(manager, "ux_users_email", "users", &["email"]).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    FirstName,
    LastName,
    Email,
    PasswordHash,
    PhoneNumber,
    Avatar,
    Department,
    Role,
    IsActive,
    LastLoginAt,
}
