use crate::contacts::{ExportError, ImportError, MappingError};
use crate::mailchimp::ProviderError;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse, Responses};
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::OpenApiError;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

pub const NO_FILE_UPLOADED: &str = "No file uploaded";

#[derive(Debug)]
pub enum ApiError {
    Provider(ProviderError),
    BadRequest(String),
    Validation(String),
    InternalError(String),
}

/// Uniform JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn json(message: impl Into<String>) -> String {
        let body = ErrorResponse {
            error: message.into(),
        };
        serde_json::to_string(&body)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error"}"#.to_string())
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, message) = match self {
            ApiError::Provider(e) => {
                match e.status() {
                    Some(upstream) => log::error!("provider error ({}): {}", upstream, e),
                    None => log::error!("provider error: {}", e),
                }
                (Status::InternalServerError, e.to_string())
            }
            ApiError::BadRequest(msg) => {
                log::debug!("bad request: {}", msg);
                (Status::BadRequest, msg)
            }
            ApiError::Validation(msg) => {
                log::warn!("validation error: {}", msg);
                (Status::InternalServerError, msg)
            }
            ApiError::InternalError(msg) => {
                log::error!("internal error: {}", msg);
                (Status::InternalServerError, msg)
            }
        };

        let json = ErrorResponse::json(message);

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(_: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "No file was attached to the upload."),
            (
                "500",
                "Upstream provider or validation failure; `error` carries the message.",
            ),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Provider(err)
    }
}

impl From<MappingError> for ApiError {
    fn from(err: MappingError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
