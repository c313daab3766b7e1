use axum::{extract::{Path, State}, Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use models::reminder;
use service::auth::Principal;
use service::notifications::DispatchReport;

use crate::errors::JsonApiError;
use super::appointments::load_for;
use super::auth::{require_staff, ServerState};

#[utoipa::path(get, path = "/api/appointments/{id}/reminders", tag = "reminders", params(("id" = Uuid, Path, description = "Appointment ID")), responses((status = 200, description = "Reminders by send time"), (status = 404, description = "Not Found")))]
pub async fn list(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<Vec<reminder::Model>>, JsonApiError> {
    load_for(&state, &who, id).await?;
    Ok(Json(state.booking.reminders(id).await?))
}

#[utoipa::path(post, path = "/api/reminders/{id}/sent", tag = "reminders", params(("id" = Uuid, Path, description = "Reminder ID")), responses((status = 200, description = "Marked sent"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn mark_sent(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<reminder::Model>, JsonApiError> {
    require_staff(&who, "marking reminders")?;
    Ok(Json(state.booking.mark_sent(id).await?))
}

#[utoipa::path(post, path = "/api/reminders/dispatch", tag = "reminders", responses((status = 200, description = "Dispatch report"), (status = 403, description = "Forbidden")))]
pub async fn dispatch(State(state): State<ServerState>, Extension(who): Extension<Principal>) -> Result<Json<DispatchReport>, JsonApiError> {
    require_staff(&who, "dispatching reminders")?;
    Ok(Json(state.dispatcher.dispatch_due(Utc::now()).await?))
}
