//! Create `client_interaction` table with FK to `client`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientInteraction::Table)
                    .if_not_exists()
                    .col(uuid(ClientInteraction::Id).primary_key())
                    .col(uuid(ClientInteraction::ClientId).not_null())
                    .col(string_len(ClientInteraction::Kind, 16).not_null())
                    .col(text(ClientInteraction::Notes).not_null())
                    .col(timestamp_with_time_zone(ClientInteraction::OccurredAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_interaction_client")
                            .from(ClientInteraction::Table, ClientInteraction::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ClientInteraction::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ClientInteraction { Table, Id, ClientId, Kind, Notes, OccurredAt }

#[derive(DeriveIden)]
enum Client { Table, Id }
