//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_client;
mod m20240601_000002_create_client_interaction;
mod m20240601_000003_create_client_loyalty;
mod m20240601_000004_create_salon_service;
mod m20240601_000005_create_appointment;
mod m20240601_000006_create_payment;
mod m20240601_000007_create_reminder;
mod m20240601_000008_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_client::Migration),
            Box::new(m20240601_000002_create_client_interaction::Migration),
            Box::new(m20240601_000003_create_client_loyalty::Migration),
            Box::new(m20240601_000004_create_salon_service::Migration),
            Box::new(m20240601_000005_create_appointment::Migration),
            Box::new(m20240601_000006_create_payment::Migration),
            Box::new(m20240601_000007_create_reminder::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000008_add_indexes::Migration),
        ]
    }
}
