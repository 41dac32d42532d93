use sea_orm_migration::prelude::*;

use crate::m20250901_000002_create_tasks_table::Tasks;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_owner_id_due_date")
                    .table(Tasks::Table)
                    .col(Tasks::OwnerId)
                    .col(Tasks::DueDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tasks_owner_id_due_date")
                    .table(Tasks::Table)
                    .to_owned(),
            )
            .await
    }
}
