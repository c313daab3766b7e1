use std::process::ExitCode;

use configs::AppConfig;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // .env 先于日志加载，RUST_LOG / LOG_FORMAT 才能生效
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let instance = Uuid::new_v4();
    install_panic_hook(instance);

    let cfg = match AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(event = "config_invalid", error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };

    let rt = match runtime(cfg.server.worker_threads) {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        event = "start",
        %instance,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "salon server starting"
    );

    match rt.block_on(server::run(cfg, shutdown_signal(instance))) {
        Ok(()) => {
            info!(event = "stop", %instance, "salon server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(event = "run_failed", %instance, error = %e, "salon server exited with error");
            ExitCode::FAILURE
        }
    }
}

fn install_panic_hook(instance: Uuid) {
    std::panic::set_hook(Box::new(move |info| {
        error!(event = "panic", %instance, message = %info, "unhandled panic");
    }));
}

fn runtime(worker_threads: Option<usize>) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(n) = worker_threads {
        builder.worker_threads(n);
    }
    builder.build()
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server runs until killed.
async fn shutdown_signal(instance: Uuid) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(event = "signal_handler_failed", error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", %instance, "received Ctrl+C, draining connections");
}
