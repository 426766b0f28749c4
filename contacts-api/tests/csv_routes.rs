use contacts_api::models::CsvImportResponse;
use contacts_api::test_support::{InMemoryProvider, MultipartBody, TestRocketBuilder};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::Value;
use std::sync::Arc;

const HEADER: &str = "First name,Last/Organization/Group/Household name,Email Addresses\\Email address,Phones\\Number,Addresses\\Address line 1,Addresses\\Address line 2,Addresses\\City,Addresses\\State abbreviation,Addresses\\ZIP,Addresses\\Country abbreviation";

fn csv(rows: &[&str]) -> Vec<u8> {
    let mut text = HEADER.to_string();
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text.into_bytes()
}

async fn client_with(provider: Arc<InMemoryProvider>) -> Client {
    TestRocketBuilder::new()
        .provider(provider)
        .async_client()
        .await
}

async fn upload(client: &Client, uri: &'static str, contents: &[u8]) -> (Status, Value) {
    let (content_type, body) = MultipartBody::new()
        .text("Content-Type", "text/csv")
        .file("file", "sample.csv", contents)
        .finish();

    let response = client
        .post(uri)
        .header(content_type)
        .body(body)
        .dispatch()
        .await;
    let status = response.status();
    let payload = response.into_json().await.expect("JSON payload");
    (status, payload)
}

fn import_response(payload: Value) -> CsvImportResponse {
    serde_json::from_value(payload).expect("import response shape")
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let client = client_with(Arc::new(InMemoryProvider::new())).await;

    for uri in ["/v1/contacts/csv", "/v1/contacts/csv/replace"] {
        let (content_type, body) = MultipartBody::new().text("Content-Type", "text/csv").finish();
        let response = client
            .post(uri)
            .header(content_type)
            .body(body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let payload: Value = response.into_json().await.expect("error payload");
        assert_eq!(payload["error"], "No file uploaded");
    }
}

#[tokio::test]
async fn request_without_body_is_rejected() {
    let client = client_with(Arc::new(InMemoryProvider::new())).await;

    let response = client.post("/v1/contacts/csv").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn import_creates_then_updates_members() {
    let provider = Arc::new(InMemoryProvider::new());
    let client = client_with(provider.clone()).await;

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["Test,Unit,testunit@gmail.com,555-0100,1 Main St,,Springfield,IL,62701,US"]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    let result = import_response(payload);
    assert_eq!(result.new_members.len(), 1);
    assert_eq!(result.new_members[0].email_address, "testunit@gmail.com");
    assert!(result.updated_members.is_empty());
    assert!(result.failed_members.is_empty());

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["Unit Update,Unit,testunit@gmail.com,,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    let result = import_response(payload);
    assert!(result.new_members.is_empty());
    assert_eq!(result.updated_members.len(), 1);
    assert_eq!(
        result.updated_members[0].merge_fields.fname.as_deref(),
        Some("Unit Update")
    );
}

#[tokio::test]
async fn reimport_with_blank_phone_clears_it() {
    let provider = Arc::new(InMemoryProvider::new());
    let client = client_with(provider.clone()).await;

    let (status, _) = upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["Ada,Lovelace,ada@x.com,555-0100,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["Ada,Lovelace,ada@x.com,,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(payload["updated_members"][0]["merge_fields"]["PHONE"], "");

    let submitted = provider.last_upsert();
    assert_eq!(submitted[0].merge_fields.phone.as_deref(), Some(""));
    assert_eq!(provider.members()[0].merge_fields.phone.as_deref(), Some(""));
}

#[tokio::test]
async fn blank_email_rows_are_submitted_once() {
    let provider = Arc::new(InMemoryProvider::new());
    let client = client_with(provider.clone()).await;

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["No,Email,,,,,,,,", "Also,Missing,,,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);

    assert_eq!(provider.last_upsert().len(), 1);
    assert_eq!(payload["failed_members"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn duplicate_rows_are_submitted_once() {
    let provider = Arc::new(InMemoryProvider::new());
    let client = client_with(provider.clone()).await;

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["First,Row,dup@x.com,,,,,,,", "Second,Row,DUP@x.com,,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);

    let submitted = provider.last_upsert();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].merge_fields.fname.as_deref(), Some("First"));
    assert_eq!(import_response(payload).new_members.len(), 1);
}

#[tokio::test]
async fn blank_email_row_is_reported_as_failure() {
    let client = client_with(Arc::new(InMemoryProvider::new())).await;

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["No,Email,,555-0100,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);

    let failed = &payload["failed_members"][0];
    assert_eq!(failed["field"], "email_address");
    assert_eq!(failed["field_message"], "This value should not be blank.");
}

#[tokio::test]
async fn replace_into_empty_list_creates_every_row() {
    let provider = Arc::new(InMemoryProvider::new());
    let client = client_with(provider.clone()).await;

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv/replace",
        &csv(&[
            "One,Unit,testunit1@gmail.com,,,,,,,",
            "Two,Unit,testunit2@gmail.com,,,,,,,",
            "Three,Unit,testunit3@gmail.com,,,,,,,",
        ]),
    )
    .await;
    assert_eq!(status, Status::Ok);

    let result = import_response(payload);
    assert_eq!(result.new_members.len(), 3);
    assert!(result.updated_members.is_empty());
    assert!(result.failed_members.is_empty());
    assert_eq!(provider.call_count("start_batch"), 0);
}

#[tokio::test]
async fn replace_drops_members_missing_from_upload() {
    let provider = Arc::new(InMemoryProvider::new().with_pending_polls(1));
    provider.seed(&["old1@x.com", "old2@x.com", "keep@x.com"]);
    let client = client_with(provider.clone()).await;

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv/replace",
        &csv(&["Keep,Me,keep@x.com,,,,,,,", "New,Me,new@x.com,,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);

    let result = import_response(payload);
    assert_eq!(result.new_members.len(), 2);
    assert!(result.updated_members.is_empty());

    let mut remaining: Vec<_> = provider
        .members()
        .into_iter()
        .map(|member| member.email_address)
        .collect();
    remaining.sort();
    assert_eq!(remaining, vec!["keep@x.com", "new@x.com"]);
    assert_eq!(provider.call_count("start_batch"), 1);
}

#[tokio::test]
async fn replace_proceeds_when_delete_batch_times_out() {
    let provider = Arc::new(InMemoryProvider::new().with_pending_polls(1_000));
    provider.seed(&["old@x.com"]);
    let client = client_with(provider.clone()).await;

    let (status, payload) = upload(
        &client,
        "/v1/contacts/csv/replace",
        &csv(&["New,Me,new@x.com,,,,,,,"]),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(import_response(payload).new_members.len(), 1);
}

#[tokio::test]
async fn export_serves_csv_attachment() {
    let provider = Arc::new(InMemoryProvider::new());
    let client = client_with(provider.clone()).await;

    upload(
        &client,
        "/v1/contacts/csv",
        &csv(&["Ada,Lovelace,ada@x.com,555-0100,1 Main St,,London,,,UK"]),
    )
    .await;

    let response = client.get("/v1/contacts/csv").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::CSV));
    assert_eq!(
        response.headers().get_one("Content-Type"),
        Some("text/csv; charset=utf-8")
    );
    assert_eq!(
        response.headers().get_one("Content-Disposition"),
        Some("attachment; filename=sgs_contacts.csv")
    );

    let body = response.into_string().await.expect("CSV body");
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("First Name,Last Name,Email,Phone No.,Address 1,Address 2,City,State,Zip Code,Country,Last Changed")
    );
    let row = lines.next().expect("member row");
    assert!(row.starts_with("Ada,Lovelace,ada@x.com,555-0100,1 Main St,,London,,,UK,"));
    assert_eq!(lines.next(), None);
}
