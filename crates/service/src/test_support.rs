#![cfg(test)]
use std::time::Duration;

use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

// Migrations run once per test process; `false` means no database is reachable.
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    let mut cfg = DatabaseConfig::from_file().unwrap_or_else(|_| DatabaseConfig::from_env());
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.connect_timeout_secs = 3;
    cfg.acquire_timeout_secs = 3;
    cfg
}

/// A migrated connection, or `None` when `SKIP_DB_TESTS` is set or PostgreSQL is down.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let ready = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&test_config()).await else { return false };
            migration::Migrator::up(&db, None).await.is_ok()
        })
        .await;
    if !ready {
        return None;
    }
    tokio::time::timeout(Duration::from_secs(5), connect_with_config(&test_config()))
        .await
        .ok()?
        .ok()
}
