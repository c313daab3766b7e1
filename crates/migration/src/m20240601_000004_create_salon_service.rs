//! Create `salon_service` table.
//!
//! Catalog of bookable services. `slug` is unique and set once at creation.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SalonService::Table)
                    .if_not_exists()
                    .col(uuid(SalonService::Id).primary_key())
                    .col(string_len(SalonService::Title, 100).not_null())
                    .col(string_len(SalonService::Slug, 120).unique_key().not_null())
                    .col(text(SalonService::Description).not_null())
                    .col(ColumnDef::new(SalonService::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(SalonService::DurationMinutes).integer().null())
                    .col(ColumnDef::new(SalonService::ImageRef).string_len(255).null())
                    .col(timestamp_with_time_zone(SalonService::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(SalonService::UpdatedAt).not_null())
                    .check(Expr::col(SalonService::Price).gte(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SalonService::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SalonService { Table, Id, Title, Slug, Description, Price, DurationMinutes, ImageRef, CreatedAt, UpdatedAt }
