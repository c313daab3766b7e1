//! Load the starter service menu into the configured database.
//! Safe to rerun: services whose slug already exists are skipped.
use anyhow::Context;
use configs::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let cfg = AppConfig::load_or_env().context("load configuration")?;
    let db = models::db::connect_with_config(&cfg.database).await.context("connect to database")?;
    models::db::migrate(&db).await.context("run migrations")?;

    let created = service::catalog_service::seed_services(&db, service::catalog_service::default_catalog()).await?;
    info!(event = "seed_done", created, "service catalog seeded");
    Ok(())
}
