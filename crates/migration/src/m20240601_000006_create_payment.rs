//! Create `payment` table: append-only ledger keyed by appointment.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(uuid(Payment::Id).primary_key())
                    .col(uuid(Payment::AppointmentId).not_null())
                    .col(ColumnDef::new(Payment::Amount).decimal_len(10, 2).not_null())
                    .col(string_len(Payment::Kind, 16).not_null())
                    .col(timestamp_with_time_zone(Payment::CreatedAt).not_null())
                    .check(Expr::col(Payment::Amount).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_appointment")
                            .from(Payment::Table, Payment::AppointmentId)
                            .to(Appointment::Table, Appointment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Payment { Table, Id, AppointmentId, Amount, Kind, CreatedAt }

#[derive(DeriveIden)]
enum Appointment { Table, Id }
