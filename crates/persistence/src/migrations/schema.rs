//! Column sets and indexes shared by every table.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

/// Identity, audit and soft-delete columns
#[derive(Iden)]
pub(super) enum Base {
    Id,
    CreatedAt,
    CreatedBy,
    UpdatedAt,
    UpdatedBy,
    IsDeleted,
    DeletedAt,
}

/// Start a table definition with the UUID primary key.
pub(super) fn create_table<T>(table: T) -> TableCreateStatement
where
    T: IntoTableRef,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(Base::Id).uuid().not_null().primary_key())
        .to_owned()
}

/// Append the audit and soft-delete columns.
pub(super) fn with_base_columns(table: &mut TableCreateStatement) -> TableCreateStatement {
    table
        .col(
            ColumnDef::new(Base::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(ColumnDef::new(Base::CreatedBy).uuid().null())
        .col(
            ColumnDef::new(Base::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(ColumnDef::new(Base::UpdatedBy).uuid().null())
        .col(
            ColumnDef::new(Base::IsDeleted)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Base::DeletedAt)
                .timestamp_with_time_zone()
                .null(),
        )
        .to_owned()
}

/// Index backing the `is_deleted = false` filter every read applies.
pub(super) fn soft_delete_index<T>(name: &str, table: T) -> IndexCreateStatement
where
    T: IntoTableRef,
{
    Index::create()
        .name(name)
        .table(table)
        .col(Base::IsDeleted)
        .if_not_exists()
        .to_owned()
}

/// Unique index that only covers live rows, so a tombstone never blocks a
/// new row with the same key.
pub(super) async fn create_live_unique_index(
    manager: &SchemaManager<'_>,
    name: &str,
    table: &str,
    columns: &[&str],
) -> Result<(), DbErr> {
    let sql = format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({}) WHERE is_deleted = false",
        name,
        table,
        columns.join(", ")
    );
    manager.get_connection().execute_unprepared(&sql).await?;
    Ok(())
}
