pub mod auth;
pub mod clients;
pub mod catalog;
pub mod appointments;
pub mod payments;
pub mod reminders;
pub mod contact;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::{metrics::encode_metrics, types::Health};

use crate::openapi::ApiDoc;
pub use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (StatusCode, String) {
    encode_metrics()
}

/// Build the full application router: public routes plus the bearer-protected `/api` tree
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/contact", post(contact::submit));

    let api = Router::new()
        .route("/api/clients", get(clients::list).post(clients::create))
        .route("/api/clients/:id", get(clients::get).put(clients::update))
        .route("/api/clients/:id/interactions", get(clients::list_interactions).post(clients::record_interaction))
        .route("/api/clients/:id/loyalty", get(clients::get_loyalty).post(clients::add_loyalty))
        .route("/api/services", get(catalog::list).post(catalog::create))
        .route("/api/services/popular", get(catalog::popular))
        .route("/api/services/slug/:slug", get(catalog::get_by_slug))
        .route("/api/services/:id", get(catalog::get).put(catalog::update).delete(catalog::delete))
        .route("/api/appointments", get(appointments::list).post(appointments::create))
        .route("/api/appointments/:id", get(appointments::get).delete(appointments::soft_delete))
        .route("/api/appointments/:id/confirm", post(appointments::confirm))
        .route("/api/appointments/:id/cancel", post(appointments::cancel))
        .route("/api/appointments/:id/complete-payment", post(appointments::complete_payment))
        .route("/api/appointments/:id/payments", get(payments::ledger).post(payments::record))
        .route("/api/appointments/:id/balance", get(payments::balance))
        .route("/api/appointments/:id/reminders", get(reminders::list))
        .route("/api/reminders/dispatch", post(reminders::dispatch))
        .route("/api/reminders/:id/sent", post(reminders::mark_sent))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    public
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
