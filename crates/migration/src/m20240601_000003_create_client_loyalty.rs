//! Create `client_loyalty` table, one row per client.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientLoyalty::Table)
                    .if_not_exists()
                    .col(uuid(ClientLoyalty::Id).primary_key())
                    .col(uuid(ClientLoyalty::ClientId).unique_key().not_null())
                    .col(integer(ClientLoyalty::Points).not_null().default(0))
                    .col(timestamp_with_time_zone(ClientLoyalty::UpdatedAt).not_null())
                    .check(Expr::col(ClientLoyalty::Points).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_loyalty_client")
                            .from(ClientLoyalty::Table, ClientLoyalty::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ClientLoyalty::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ClientLoyalty { Table, Id, ClientId, Points, UpdatedAt }

#[derive(DeriveIden)]
enum Client { Table, Id }
