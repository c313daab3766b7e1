//! Create `client` table.
//!
//! Contact records for salon customers; email is the natural identity.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(uuid(Client::Id).primary_key())
                    .col(string_len(Client::FirstName, 50).not_null())
                    .col(string_len(Client::LastName, 50).not_null())
                    .col(string_len(Client::Email, 254).unique_key().not_null())
                    .col(string_len(Client::Phone, 15).not_null())
                    .col(ColumnDef::new(Client::DateOfBirth).date().null())
                    .col(timestamp_with_time_zone(Client::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Client::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Client::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Client { Table, Id, FirstName, LastName, Email, Phone, DateOfBirth, CreatedAt, UpdatedAt }
