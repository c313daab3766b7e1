//! Create `reminder` table with FK to `appointment`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reminder::Table)
                    .if_not_exists()
                    .col(uuid(Reminder::Id).primary_key())
                    .col(uuid(Reminder::AppointmentId).not_null())
                    .col(timestamp_with_time_zone(Reminder::SendAt).not_null())
                    .col(string_len(Reminder::Channel, 8).not_null())
                    .col(boolean(Reminder::Sent).not_null().default(false))
                    .col(
                        ColumnDef::new(Reminder::SentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reminder_appointment")
                            .from(Reminder::Table, Reminder::AppointmentId)
                            .to(Appointment::Table, Appointment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Reminder::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Reminder { Table, Id, AppointmentId, SendAt, Channel, Sent, SentAt }

#[derive(DeriveIden)]
enum Appointment { Table, Id }
