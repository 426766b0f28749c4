//! Contact CRUD plus CSV bulk import, replace, and export.

use crate::contacts::{ContactService, EXPORT_FILENAME};
use crate::error::{ApiError, NO_FILE_UPLOADED};
use crate::models::{ContactBody, ContactListResponse, CsvImportResponse, Member, MessageResponse};
use crate::routes::params::ContactListParams;
use rocket::form::Form;
use rocket::http::ContentType;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, FromForm, Request, Response, State};
use rocket_okapi::openapi;

/// List members, newest change first unless `sort=asc`.
#[openapi(tag = "Contacts")]
#[get("/contacts?<params..>")]
pub async fn list_contacts(
    params: ContactListParams,
    service: &State<ContactService>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let listing = service
        .list(params.page(), params.limit(), params.sort())
        .await?;
    Ok(Json(listing))
}

/// Add a contact; fails when the email is missing or already on the list.
#[openapi(tag = "Contacts")]
#[post("/contacts", data = "<body>")]
pub async fn add_contact(
    body: Json<ContactBody>,
    service: &State<ContactService>,
) -> Result<Json<Member>, ApiError> {
    let member = service.add(body.into_inner()).await?;
    Ok(Json(member))
}

/// Update an existing contact identified by its email.
#[openapi(tag = "Contacts")]
#[put("/contacts", data = "<body>")]
pub async fn update_contact(
    body: Json<ContactBody>,
    service: &State<ContactService>,
) -> Result<Json<Member>, ApiError> {
    let member = service.update(body.into_inner()).await?;
    Ok(Json(member))
}

/// Archive a contact by email.
#[openapi(tag = "Contacts")]
#[delete("/contacts/<email>")]
pub async fn delete_contact(
    email: String,
    service: &State<ContactService>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete(&email).await?;
    Ok(Json(MessageResponse {
        message: "Succesful".to_string(),
    }))
}

/// Multipart upload carrying the CSV in its `file` field. The bytes are held
/// in memory for the lifetime of the request only.
#[derive(Debug, FromForm)]
pub struct CsvUpload<'r> {
    pub file: Option<&'r [u8]>,
}

fn uploaded_file<'r>(upload: Option<Form<CsvUpload<'r>>>) -> Result<&'r [u8], ApiError> {
    upload
        .and_then(|form| form.into_inner().file)
        .ok_or_else(|| ApiError::BadRequest(NO_FILE_UPLOADED.to_string()))
}

/// Add or update every contact in the uploaded CSV.
#[openapi(skip)]
#[post("/contacts/csv", data = "<upload>")]
pub async fn import_contacts_csv(
    upload: Option<Form<CsvUpload<'_>>>,
    service: &State<ContactService>,
) -> Result<Json<CsvImportResponse>, ApiError> {
    let data = uploaded_file(upload)?;
    let result = service.import_csv(data).await?;
    Ok(Json(result.into()))
}

/// Delete every contact on the list, then import the uploaded CSV.
#[openapi(skip)]
#[post("/contacts/csv/replace", data = "<upload>")]
pub async fn replace_contacts_csv(
    upload: Option<Form<CsvUpload<'_>>>,
    service: &State<ContactService>,
) -> Result<Json<CsvImportResponse>, ApiError> {
    let data = uploaded_file(upload)?;
    let result = service.replace_csv(data).await?;
    Ok(Json(result.into()))
}

/// CSV body served as a file download.
pub struct CsvDownload {
    body: String,
    filename: &'static str,
}

impl<'r> Responder<'r, 'static> for CsvDownload {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(self.body.respond_to(request)?)
            .header(ContentType::CSV)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename={}", self.filename),
            )
            .ok()
    }
}

/// Download the whole list (up to 500 members) as CSV.
#[openapi(skip)]
#[get("/contacts/csv")]
pub async fn export_contacts_csv(
    service: &State<ContactService>,
) -> Result<CsvDownload, ApiError> {
    let body = service.export_csv().await?;
    Ok(CsvDownload {
        body,
        filename: EXPORT_FILENAME,
    })
}
