//! Create analysis_results and damages tables.
//!
//! `session_id` is unique: a re-run overwrites the session's single result.

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
                    .table(AnalysisResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalysisResults::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalysisResults::SessionId).string().not_null())
                    .col(
                        ColumnDef::new(AnalysisResults::Status)
                            .string()
                            .not_null()
                            .default("processing"),
                    )
                    .col(
                        ColumnDef::new(AnalysisResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AnalysisResults::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(AnalysisResults::RawResponse).text())
                    .foreign_key(
                        ForeignKey::create()
                            .from(AnalysisResults::Table, AnalysisResults::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_analysis_results_session_id")
                    .table(AnalysisResults::Table)
                    .col(AnalysisResults::SessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Damages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Damages::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Damages::AnalysisId).string().not_null())
                    .col(ColumnDef::new(Damages::DamageType).string().not_null())
                    .col(ColumnDef::new(Damages::Severity).string().not_null())
                    .col(ColumnDef::new(Damages::Zone).string().not_null())
                    .col(ColumnDef::new(Damages::Description).text())
                    .col(ColumnDef::new(Damages::BoundingBox).string())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Damages::Table, Damages::AnalysisId)
                            .to(AnalysisResults::Table, AnalysisResults::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_damages_analysis_id")
                    .table(Damages::Table)
                    .col(Damages::AnalysisId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Damages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AnalysisResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnalysisResults {
    Table,
    Id,
    SessionId,
    Status,
    CreatedAt,
    CompletedAt,
    RawResponse,
}

#[derive(DeriveIden)]
enum Damages {
    Table,
    Id,
    AnalysisId,
    DamageType,
    Severity,
    Zone,
    Description,
    BoundingBox,
}
