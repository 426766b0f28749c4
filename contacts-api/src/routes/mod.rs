//! HTTP route handlers, mounted under `/v1`.
//!
//! Handlers stay thin: they check that required inputs are present, hand
//! off to [`ContactService`](crate::contacts::ContactService), and let
//! [`ApiError`](crate::error::ApiError) shape every failure.

pub mod contacts;
pub mod health;
pub mod params;

use crate::error::ErrorResponse;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, Request};

/// Render any uncaught status (unmatched route, malformed body) as
/// `{"error": "<reason>"}`.
#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    let reason = status.reason().unwrap_or("Unknown Error");
    (
        status,
        Json(ErrorResponse {
            error: reason.to_string(),
        }),
    )
}
