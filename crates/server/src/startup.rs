use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use chrono::Utc;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::auth::TokenService;
use service::booking::{repo::seaorm::SeaOrmBookingRepository, BookingPolicy, BookingService};
use service::notifications::{self, ReminderDispatcher};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire configuration, database and services into the shared handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::migrate(&db).await?;

    let tokens = TokenService::from_config(&cfg.auth);
    let policy = BookingPolicy::from_config(&cfg.booking)
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let repo = Arc::new(SeaOrmBookingRepository::new(db.clone()));
    let booking = Arc::new(BookingService::new(repo.clone(), policy));
    let notifier = notifications::from_config(&cfg.notifier)
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let dispatcher = Arc::new(ReminderDispatcher::new(repo, notifier.clone(), cfg.notifier.dispatch_batch_size));

    Ok(ServerState {
        db,
        tokens,
        booking,
        dispatcher,
        notifier,
        salon_address: cfg.notifier.salon_address.clone(),
    })
}

/// Periodic reminder dispatch; a failed tick is logged and retried on the next one.
fn spawn_dispatcher(dispatcher: Arc<ReminderDispatcher>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match dispatcher.dispatch_due(Utc::now()).await {
                Ok(report) if report.sent + report.failed > 0 => {
                    info!(sent = report.sent, failed = report.failed, "reminder dispatch tick");
                }
                Ok(_) => {}
                Err(e) => warn!(err = %e, "reminder dispatch tick failed"),
            }
        }
    });
}

/// Serve `cfg` until `shutdown` resolves, then drain in-flight requests.
/// Logging and configuration loading belong to the caller.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    let state = build_state(&cfg).await?;

    if cfg.notifier.dispatch_interval_secs > 0 {
        spawn_dispatcher(state.dispatcher.clone(), Duration::from_secs(cfg.notifier.dispatch_interval_secs));
        info!(every_secs = cfg.notifier.dispatch_interval_secs, "reminder dispatcher started");
    }

    let app: Router = routes::build_router(state, build_cors());

    info!(%addr, "starting salon server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(anyhow::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_bind_address_fails_before_touching_the_database() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "not a host".into();
        let err = run(cfg, std::future::ready(())).await.unwrap_err();
        assert!(matches!(err, StartupError::InvalidConfig(ref m) if m.starts_with("bind address")));
    }
}
