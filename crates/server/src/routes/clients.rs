use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::client::{self, ClientInput, ClientUpdate};
use models::client_interaction::{self, InteractionKind};
use service::auth::Principal;
use service::client_service::{self, LoyaltyBalance};
use service::errors::ServiceError;
use service::pagination::{Page, Pagination};

use crate::errors::JsonApiError;
use super::auth::{require_staff, ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Case-insensitive match on name or email
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionInput {
    pub kind: InteractionKind,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct LoyaltyInput {
    pub delta: i32,
}

#[utoipa::path(get, path = "/api/clients", tag = "clients", params(ListQuery), responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn list(State(state): State<ServerState>, Extension(who): Extension<Principal>, Query(q): Query<ListQuery>) -> Result<Json<Page<client::Model>>, JsonApiError> {
    require_staff(&who, "listing clients")?;
    let pagination = Pagination { page: q.page.unwrap_or(1), per_page: q.per_page.unwrap_or(20) };
    Ok(Json(client_service::list_clients(&state.db, pagination, q.q.as_deref()).await?))
}

#[utoipa::path(post, path = "/api/clients", tag = "clients", request_body = crate::openapi::ClientInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Conflict")))]
pub async fn create(State(state): State<ServerState>, Extension(who): Extension<Principal>, Json(input): Json<ClientInput>) -> Result<(StatusCode, Json<client::Model>), JsonApiError> {
    require_staff(&who, "registering clients")?;
    let created = client_service::create_client(&state.db, input).await?;
    info!(client_id = %created.id, by = %who.id, "client registered via api");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/clients/{id}", tag = "clients", params(("id" = Uuid, Path, description = "Client ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<client::Model>, JsonApiError> {
    who.ensure_can_act_for(id)?;
    let found = client_service::get_client(&state.db, id).await?.ok_or_else(|| ServiceError::not_found("client"))?;
    Ok(Json(found))
}

#[utoipa::path(put, path = "/api/clients/{id}", tag = "clients", params(("id" = Uuid, Path, description = "Client ID")), request_body = crate::openapi::ClientUpdateDoc, responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>, Json(upd): Json<ClientUpdate>) -> Result<Json<client::Model>, JsonApiError> {
    who.ensure_can_act_for(id)?;
    Ok(Json(client_service::update_client(&state.db, id, upd).await?))
}

pub async fn list_interactions(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<Vec<client_interaction::Model>>, JsonApiError> {
    who.ensure_can_act_for(id)?;
    Ok(Json(client_service::list_interactions(&state.db, id).await?))
}

pub async fn record_interaction(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>, Json(input): Json<InteractionInput>) -> Result<(StatusCode, Json<client_interaction::Model>), JsonApiError> {
    require_staff(&who, "recording interactions")?;
    let created = client_service::record_interaction(&state.db, id, input.kind, &input.notes).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_loyalty(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<Json<LoyaltyBalance>, JsonApiError> {
    who.ensure_can_act_for(id)?;
    Ok(Json(client_service::get_loyalty(&state.db, id).await?))
}

pub async fn add_loyalty(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>, Json(input): Json<LoyaltyInput>) -> Result<Json<LoyaltyBalance>, JsonApiError> {
    Ok(Json(client_service::add_loyalty_points(&state.db, who.role, id, input.delta).await?))
}
