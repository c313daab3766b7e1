//! Create `appointment` table.
//!
//! Aggregate root of the booking workflow. Client and service rows are
//! referenced with RESTRICT so ledger history survives catalog edits;
//! appointments themselves are soft-deleted via `is_deleted`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(uuid(Appointment::Id).primary_key())
                    .col(uuid(Appointment::ClientId).not_null())
                    .col(uuid(Appointment::ServiceId).not_null())
                    .col(timestamp_with_time_zone(Appointment::ScheduledAt).not_null())
                    .col(string_len(Appointment::Status, 16).not_null())
                    .col(ColumnDef::new(Appointment::ServicePrice).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Appointment::ReservationFee).decimal_len(10, 2).not_null())
                    .col(text(Appointment::Notes).not_null())
                    .col(boolean(Appointment::IsDeleted).not_null().default(false))
                    .col(timestamp_with_time_zone(Appointment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Appointment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_client")
                            .from(Appointment::Table, Appointment::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_service")
                            .from(Appointment::Table, Appointment::ServiceId)
                            .to(SalonService::Table, SalonService::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appointment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Appointment {
    Table,
    Id,
    ClientId,
    ServiceId,
    ScheduledAt,
    Status,
    ServicePrice,
    ReservationFee,
    Notes,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Client { Table, Id }

#[derive(DeriveIden)]
enum SalonService { Table, Id }
