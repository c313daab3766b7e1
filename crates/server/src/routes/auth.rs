use std::sync::Arc;

use axum::{extract::{Request, State}, http::header, middleware::Next, response::Response};
use sea_orm::DatabaseConnection;

use service::auth::{Principal, TokenService};
use service::booking::BookingService;
use service::notifications::{Notifier, ReminderDispatcher};

use crate::errors::JsonApiError;
use axum::http::StatusCode;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub tokens: TokenService,
    pub booking: Arc<BookingService>,
    pub dispatcher: Arc<ReminderDispatcher>,
    pub notifier: Arc<dyn Notifier>,
    pub salon_address: String,
}

/// Bearer token from `Authorization`, falling back to the `auth_token` cookie.
fn extract_token(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("expected 'Authorization: Bearer <token>'".into()))),
        };
    }
    // Cookie 回退：解析 Cookie 头获取 auth_token
    let cookie_header = req.headers().get(header::COOKIE).and_then(|v| v.to_str().ok()).unwrap_or("");
    Ok(cookie_header
        .split(';')
        .filter_map(|kv| kv.trim().strip_prefix("auth_token="))
        .find(|t| !t.is_empty())
        .map(str::to_string))
}

/// Verifies the caller's token and stores the resulting `Principal` in request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let Some(token) = extract_token(&req)? else {
        tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("missing bearer token".into())));
    };
    match state.tokens.verify(&token) {
        Ok(principal) => {
            tracing::debug!(path = %path, principal = %principal.id, role = ?principal.role, "authenticated");
            req.extensions_mut().insert::<Principal>(principal);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(e.into())
        }
    }
}

/// 403 unless the caller is staff or admin.
pub fn require_staff(principal: &Principal, action: &str) -> Result<(), JsonApiError> {
    principal.role.ensure_staff(action).map_err(JsonApiError::from)
}
