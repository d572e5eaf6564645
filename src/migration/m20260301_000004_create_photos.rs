//! Create photos table.

use sea_orm_migration::prelude::*;

use super::m20260301_000003_create_sessions::Sessions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Photos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Photos::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Photos::SessionId).string().not_null())
                    .col(ColumnDef::new(Photos::AngleIndex).integer().not_null())
                    .col(ColumnDef::new(Photos::AngleLabel).string().not_null())
                    .col(ColumnDef::new(Photos::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(Photos::CapturedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Photos::IsValid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Photos::ValidationMessage).string())
                    .col(
                        ColumnDef::new(Photos::UploadStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Photos::Table, Photos::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photos_session_id")
                    .table(Photos::Table)
                    .col(Photos::SessionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Photos {
    Table,
    Id,
    SessionId,
    AngleIndex,
    AngleLabel,
    FilePath,
    CapturedAt,
    IsValid,
    ValidationMessage,
    UploadStatus,
}
