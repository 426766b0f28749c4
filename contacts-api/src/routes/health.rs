//! Liveness and upstream connectivity checks.

use crate::contacts::ContactService;
use crate::error::ApiError;
use rocket::serde::json::Json;
use rocket::{get, State};
use rocket_okapi::openapi;

/// Process liveness; always answers `UP`.
#[openapi(tag = "Health")]
#[get("/health_checker")]
pub fn health_checker() -> String {
    "UP".to_string()
}

/// Relay the provider's ping payload, or a 500 when upstream is unreachable.
#[openapi(tag = "Health")]
#[get("/health_mailchimp")]
pub async fn health_mailchimp(
    service: &State<ContactService>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payload = service.provider().ping().await?;
    Ok(Json(payload))
}
