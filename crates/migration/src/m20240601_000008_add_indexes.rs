use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Appointment: per-client listing
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_client")
                    .table(Appointment::Table)
                    .col(Appointment::ClientId)
                    .to_owned(),
            )
            .await?;

        // Appointment: active listing ordered by time
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_active_schedule")
                    .table(Appointment::Table)
                    .col(Appointment::IsDeleted)
                    .col(Appointment::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_appointment")
                    .table(Payment::Table)
                    .col(Payment::AppointmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reminder_appointment")
                    .table(Reminder::Table)
                    .col(Reminder::AppointmentId)
                    .to_owned(),
            )
            .await?;

        // Reminder: dispatcher scans unsent rows by send time
        manager
            .create_index(
                Index::create()
                    .name("idx_reminder_due")
                    .table(Reminder::Table)
                    .col(Reminder::Sent)
                    .col(Reminder::SendAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_client_interaction_client")
                    .table(ClientInteraction::Table)
                    .col(ClientInteraction::ClientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_client_interaction_client").table(ClientInteraction::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_reminder_due").table(Reminder::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_reminder_appointment").table(Reminder::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_payment_appointment").table(Payment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_active_schedule").table(Appointment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_client").table(Appointment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Appointment { Table, ClientId, IsDeleted, ScheduledAt }

#[derive(DeriveIden)]
enum Payment { Table, AppointmentId }

#[derive(DeriveIden)]
enum Reminder { Table, AppointmentId, Sent, SendAt }

#[derive(DeriveIden)]
enum ClientInteraction { Table, ClientId }
