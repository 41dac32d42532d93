use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20250901_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub(crate) enum Tasks {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    TaskType,
    Completed,
    CompletedAt,
    DueDate,
}

const FK_TASKS_TO_USERS: &str = "fk-tasks-owner_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(integer(Tasks::OwnerId))
                    .col(string_len(Tasks::Title, 50))
                    .col(text_null(Tasks::Description))
                    .col(string_len(Tasks::TaskType, 20).default("daily"))
                    .col(boolean(Tasks::Completed).default(false))
                    .col(date_time_null(Tasks::CompletedAt))
                    .col(date_time_null(Tasks::DueDate))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASKS_TO_USERS)
                            .from(Tasks::Table, Tasks::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}
