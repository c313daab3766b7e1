use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::catalog::{self, ServiceInput, ServiceUpdate};
use service::auth::Principal;
use service::catalog_service;
use service::errors::ServiceError;
use service::pagination::{Page, Pagination};

use crate::errors::JsonApiError;
use super::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PopularQuery {
    /// Defaults to 3
    pub limit: Option<u64>,
}

#[utoipa::path(get, path = "/api/services", tag = "catalog", params(ListQuery), responses((status = 200, description = "OK")))]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Page<catalog::Model>>, JsonApiError> {
    let pagination = Pagination { page: q.page.unwrap_or(1), per_page: q.per_page.unwrap_or(20) };
    Ok(Json(catalog_service::list_services(&state.db, pagination).await?))
}

#[utoipa::path(get, path = "/api/services/popular", tag = "catalog", params(PopularQuery), responses((status = 200, description = "OK")))]
pub async fn popular(State(state): State<ServerState>, Query(q): Query<PopularQuery>) -> Result<Json<Vec<catalog::Model>>, JsonApiError> {
    Ok(Json(catalog_service::popular_services(&state.db, q.limit.unwrap_or(3)).await?))
}

#[utoipa::path(get, path = "/api/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Service ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<catalog::Model>, JsonApiError> {
    let found = catalog_service::get_service(&state.db, id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    Ok(Json(found))
}

#[utoipa::path(get, path = "/api/services/slug/{slug}", tag = "catalog", params(("slug" = String, Path, description = "Service slug")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_by_slug(State(state): State<ServerState>, Path(slug): Path<String>) -> Result<Json<catalog::Model>, JsonApiError> {
    let found = catalog_service::get_service_by_slug(&state.db, &slug).await?.ok_or_else(|| ServiceError::not_found("service"))?;
    Ok(Json(found))
}

#[utoipa::path(post, path = "/api/services", tag = "catalog", request_body = crate::openapi::ServiceInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 403, description = "Forbidden"), (status = 409, description = "Conflict")))]
pub async fn create(State(state): State<ServerState>, Extension(who): Extension<Principal>, Json(input): Json<ServiceInput>) -> Result<(StatusCode, Json<catalog::Model>), JsonApiError> {
    let created = catalog_service::create_service(&state.db, who.role, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Service ID")), request_body = crate::openapi::ServiceUpdateDoc, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn update(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>, Json(upd): Json<ServiceUpdate>) -> Result<Json<catalog::Model>, JsonApiError> {
    Ok(Json(catalog_service::update_service(&state.db, who.role, id, upd).await?))
}

#[utoipa::path(delete, path = "/api/services/{id}", tag = "catalog", params(("id" = Uuid, Path, description = "Service ID")), responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found"), (status = 409, description = "Still booked")))]
pub async fn delete(State(state): State<ServerState>, Extension(who): Extension<Principal>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    catalog_service::delete_service(&state.db, who.role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
