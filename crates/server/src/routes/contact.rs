use axum::{extract::State, http::StatusCode, Json};

use service::notifications::{send_contact_inquiry, ContactInquiry};

use crate::errors::JsonApiError;
use super::auth::ServerState;

#[utoipa::path(post, path = "/contact", tag = "contact", request_body = crate::openapi::ContactInquiryDoc, responses((status = 202, description = "Forwarded to the salon"), (status = 400, description = "Validation Error")))]
pub async fn submit(State(state): State<ServerState>, Json(inquiry): Json<ContactInquiry>) -> Result<StatusCode, JsonApiError> {
    send_contact_inquiry(state.notifier.as_ref(), &state.salon_address, &inquiry).await?;
    Ok(StatusCode::ACCEPTED)
}
