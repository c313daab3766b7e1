use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::appointment;
use service::auth::Principal;
use service::booking::{ActiveFilter, BookingReceipt, BookingRequest, CompletionReceipt};
use service::pagination::{Page, Pagination};

use crate::errors::JsonApiError;
use super::auth::{require_staff, ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Staff only; clients always see their own appointments
    pub client_id: Option<Uuid>,
}

/// Load an appointment the caller is allowed to see.
pub(crate) async fn load_for(state: &ServerState, who: &Principal, id: Uuid) -> Result<appointment::Model, JsonApiError> {
    let found = state.booking.get(id).await?;
    who.ensure_can_act_for(found.client_id)?;
    Ok(found)
}

#[utoipa::path(get, path = "/api/appointments", tag = "appointments", params(ListQuery), responses((status = 200, description = "Active appointments")))]
pub async fn list(State(state): State<ServerState>, Extension(who): Extension<Principal>, Query(q): Query<ListQuery>) -> Result<Json<Page<appointment::Model>>, JsonApiError> {
    let client_id = if who.is_staff() { q.client_id } else { Some(who.id) };
    let pagination = Pagination { page: q.page.unwrap_or(1), per_page: q.per_page.unwrap_or(20) };
    Ok(Json(state.booking.list_active(ActiveFilter { client_id }, pagination).await?))
}

#[utoipa::path(post, path = "/api/appointments", tag = "appointments", request_body = crate::openapi::BookingRequestDoc, responses((status = 201, description = "Booked"), (status = 400, description = "Validation Error"), (status = 403, description = "Forbidden"), (status = 404, description = "Client or service not found")))]
pub async fn create(State(state): State<ServerState>, Extension(who): Extension<Principal>, Json(req): Json<BookingRequest>) -> Result<(StatusCode, Json<BookingReceipt>), JsonApiError> {
    let receipt = state.booking.create_appointment(&who, req).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

#[utoipa::path(get, path = "/api/appointments/{id}", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<appointment::Model>, JsonApiError> {
    load_for(&state, &who, id).await?;
    Ok(Json(state.booking.confirm_booking(id).await?))
}

#[utoipa::path(delete, path = "/api/appointments/{id}", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "Soft-deleted"), (status = 404, description = "Not Found")))]
pub async fn soft_delete(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<appointment::Model>, JsonApiError> {
    load_for(&state, &who, id).await?;
    Ok(Json(state.booking.soft_delete(id).await?))
}

#[utoipa::path(post, path = "/api/appointments/{id}/confirm", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "Confirmed"), (status = 400, description = "Illegal transition"), (status = 403, description = "Forbidden")))]
pub async fn confirm(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<appointment::Model>, JsonApiError> {
    require_staff(&who, "confirming appointments")?;
    Ok(Json(state.booking.confirm(id).await?))
}

#[utoipa::path(post, path = "/api/appointments/{id}/cancel", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "Canceled"), (status = 400, description = "Illegal transition")))]
pub async fn cancel(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<appointment::Model>, JsonApiError> {
    load_for(&state, &who, id).await?;
    Ok(Json(state.booking.cancel(id).await?))
}

#[utoipa::path(post, path = "/api/appointments/{id}/complete-payment", tag = "appointments", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "Completed"), (status = 400, description = "Canceled, completed or deleted"), (status = 404, description = "Not Found")))]
pub async fn complete_payment(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<CompletionReceipt>, JsonApiError> {
    load_for(&state, &who, id).await?;
    Ok(Json(state.booking.complete_payment(id).await?))
}
