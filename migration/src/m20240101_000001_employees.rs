use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    CompanyId,
    Name,
    Description,
    CreatedById,
    UpdatedById,
    DeletedById,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Employees::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Employees::Description).string_len(255))
                    .col(ColumnDef::new(Employees::CreatedById).big_integer())
                    .col(ColumnDef::new(Employees::UpdatedById).big_integer())
                    .col(ColumnDef::new(Employees::DeletedById).big_integer())
                    .col(ColumnDef::new(Employees::CreatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Employees::UpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Employees::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Soft-deleted rows keep their name reserved; only a force delete frees it.
        manager
            .create_index(
                Index::create()
                    .name("uq_employees_company_name")
                    .table(Employees::Table)
                    .col(Employees::CompanyId)
                    .col(Employees::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_company_deleted")
                    .table(Employees::Table)
                    .col(Employees::CompanyId)
                    .col(Employees::DeletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employees::Table).if_exists().to_owned())
            .await
    }
}
