use axum::{extract::{Path, State}, http::StatusCode, Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use models::payment::{self, PaymentKind};
use service::auth::Principal;
use service::booking::Balance;

use crate::errors::JsonApiError;
use super::appointments::load_for;
use super::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub amount: Decimal,
    #[serde(default = "default_kind")]
    pub kind: PaymentKind,
}

fn default_kind() -> PaymentKind { PaymentKind::Installment }

#[utoipa::path(get, path = "/api/appointments/{id}/payments", tag = "payments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "Ledger in time order"), (status = 404, description = "Not Found")))]
pub async fn ledger(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<Vec<payment::Model>>, JsonApiError> {
    load_for(&state, &who, id).await?;
    Ok(Json(state.booking.ledger(id).await?))
}

#[utoipa::path(post, path = "/api/appointments/{id}/payments", tag = "payments", params(("id" = Uuid, Path, description = "Appointment ID")), request_body = crate::openapi::PaymentInputDoc, responses((status = 201, description = "Recorded"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn record(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>, Json(input): Json<PaymentInput>) -> Result<(StatusCode, Json<payment::Model>), JsonApiError> {
    load_for(&state, &who, id).await?;
    let saved = state.booking.record_payment(id, input.amount, input.kind).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(get, path = "/api/appointments/{id}/balance", tag = "payments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "Price, paid and outstanding"), (status = 404, description = "Not Found")))]
pub async fn balance(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<Balance>, JsonApiError> {
    load_for(&state, &who, id).await?;
    Ok(Json(state.booking.balance(id).await?))
}
