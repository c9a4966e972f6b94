use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum ActivityLogs {
    Table,
    Id,
    DateTime,
    UserId,
    Module,
    EntityId,
    EntityTypeId,
    ActivityId,
    Activity,
    Details,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key to employees: history must survive a force delete.
        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ActivityLogs::DateTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(ColumnDef::new(ActivityLogs::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ActivityLogs::Module).string_len(64).not_null())
                    .col(ColumnDef::new(ActivityLogs::EntityId).big_integer().not_null())
                    .col(ColumnDef::new(ActivityLogs::EntityTypeId).integer().not_null())
                    .col(ColumnDef::new(ActivityLogs::ActivityId).integer().not_null())
                    .col(ColumnDef::new(ActivityLogs::Activity).string_len(32).not_null())
                    .col(ColumnDef::new(ActivityLogs::Details).json().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_entity")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::Module)
                    .col(ActivityLogs::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLogs::Table).if_exists().to_owned())
            .await
    }
}
