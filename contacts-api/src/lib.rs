#[macro_use]
extern crate rocket;

pub mod config;
pub mod contacts;
pub mod error;
pub mod mailchimp;
pub mod models;
pub mod request_logger;
pub mod routes;

use crate::config::AppConfig;
use crate::contacts::ContactService;
use crate::mailchimp::MailchimpClient;
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::data::{Limits, ToByteUnit};
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{make_rapidoc, GeneralConfig, HideShowConfig, RapiDocConfig},
    settings::UrlObject,
    swagger_ui::{make_swagger_ui, SwaggerUIConfig},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

/// Request body limits. CSV uploads are read into memory, never spooled to
/// disk.
pub fn upload_limits() -> Limits {
    Limits::default()
        .limit("bytes", 2.mebibytes())
        .limit("file", 2.mebibytes())
        .limit("data-form", 4.mebibytes())
}

/// Production entry point: configuration from the environment, a live
/// Mailchimp client, and the listen address from `HOST`/`PORT`.
pub fn rocket() -> Rocket<Build> {
    init_logger();

    let config = AppConfig::from_env();
    let client = MailchimpClient::new(&config.mailchimp).expect("Failed to build Mailchimp client");
    log::info!(
        "using Mailchimp list '{}' via {}",
        config.mailchimp.list_id,
        config.mailchimp.api_root()
    );

    let service = ContactService::new(Arc::new(client), config.replace_poll);
    let figment = rocket::Config::figment()
        .merge(("address", config.host.clone()))
        .merge(("port", config.port))
        .merge(("limits", upload_limits()));

    mount_app(rocket::custom(figment), service)
}

/// Attach fairings, state, catchers, and routes to a Rocket instance.
pub fn mount_app(rocket: Rocket<Build>, service: ContactService) -> Rocket<Build> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Put, Method::Delete]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .to_cors()
        .expect("Error creating CORS");

    rocket
        .attach(RequestLogger)
        .attach(cors)
        .manage(service)
        .register("/", catchers![routes::default_catcher])
        .mount(
            "/v1",
            openapi_get_routes![
                // Health routes
                routes::health::health_checker,
                routes::health::health_mailchimp,
                // Contact routes
                routes::contacts::list_contacts,
                routes::contacts::add_contact,
                routes::contacts::update_contact,
                routes::contacts::delete_contact,
                // CSV routes
                routes::contacts::import_contacts_csv,
                routes::contacts::replace_contacts_csv,
                routes::contacts::export_contacts_csv,
            ],
        )
        .mount(
            "/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Contacts API", "../../v1/openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::contacts::{subscriber_hash, ContactService, PollSettings};
    use crate::mailchimp::{
        BatchJob, BatchOperation, ContactProvider, MemberPage, MemberQuery, ProviderError,
        ProviderResult, SortDirection,
    };
    use crate::models::{BatchResult, Member, MemberFailure, MergeFields};
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::{Build, Rocket};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    pub const BLANK_FIELD_MESSAGE: &str = "This value should not be blank.";

    struct StoredMember {
        member: Member,
        seq: u64,
    }

    struct PendingBatch {
        remaining_polls: usize,
        operations: u64,
    }

    #[derive(Default)]
    struct ProviderState {
        members: Vec<StoredMember>,
        batches: HashMap<String, PendingBatch>,
        next_seq: u64,
        calls: HashMap<&'static str, usize>,
        last_upsert: Vec<Member>,
    }

    impl ProviderState {
        fn track(&mut self, method: &'static str) {
            *self.calls.entry(method).or_insert(0) += 1;
        }

        fn position_by_hash(&self, hash: &str) -> Option<usize> {
            self.members
                .iter()
                .position(|stored| subscriber_hash(&stored.member.email_address) == hash)
        }

        fn insert(&mut self, member: &Member) -> Member {
            self.next_seq += 1;
            let mut stored = member.clone();
            stored.id = Some(subscriber_hash(&member.email_address));
            stored.status = member.status.clone().or_else(|| Some("subscribed".into()));
            stored.last_changed = Some(chrono::Utc::now().to_rfc3339());
            self.members.push(StoredMember {
                member: stored.clone(),
                seq: self.next_seq,
            });
            stored
        }

        fn patch(&mut self, index: usize, incoming: &Member) -> Member {
            self.next_seq += 1;
            let stored = &mut self.members[index];
            stored.seq = self.next_seq;
            merge_fields(&mut stored.member.merge_fields, &incoming.merge_fields);
            if incoming.status.is_some() {
                stored.member.status = incoming.status.clone();
            }
            stored.member.last_changed = Some(chrono::Utc::now().to_rfc3339());
            stored.member.clone()
        }
    }

    fn merge_fields(target: &mut MergeFields, incoming: &MergeFields) {
        let pairs = [
            (&mut target.fname, &incoming.fname),
            (&mut target.lname, &incoming.lname),
            (&mut target.birthday, &incoming.birthday),
            (&mut target.phone, &incoming.phone),
            (&mut target.addr1, &incoming.addr1),
            (&mut target.addr2, &incoming.addr2),
            (&mut target.city, &incoming.city),
            (&mut target.state, &incoming.state),
            (&mut target.zip, &incoming.zip),
            (&mut target.country, &incoming.country),
        ];
        for (slot, value) in pairs {
            if value.is_some() {
                *slot = value.clone();
            }
        }
    }

    fn problem(status: StatusCode, title: &str, detail: &str) -> ProviderError {
        let body = serde_json::json!({
            "title": title,
            "status": status.as_u16(),
            "detail": detail,
        });
        ProviderError::from_status(status, &body.to_string())
    }

    fn not_found() -> ProviderError {
        problem(
            StatusCode::NOT_FOUND,
            "Resource Not Found",
            "The requested resource could not be found.",
        )
    }

    /// In-memory stand-in for the provider with upstream's observable
    /// semantics: duplicate adds fail, unknown members are 404s, and blank
    /// emails land in the batch failure partition.
    pub struct InMemoryProvider {
        list_id: String,
        pending_polls: usize,
        ping_fails: bool,
        state: Mutex<ProviderState>,
    }

    impl Default for InMemoryProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl InMemoryProvider {
        pub fn new() -> Self {
            Self {
                list_id: "test-list".to_string(),
                pending_polls: 0,
                ping_fails: false,
                state: Mutex::new(ProviderState::default()),
            }
        }

        /// Batch jobs report a non-finished status for the first `polls`
        /// status queries.
        pub fn with_pending_polls(mut self, polls: usize) -> Self {
            self.pending_polls = polls;
            self
        }

        /// Ping answers with an authentication failure.
        pub fn unreachable(mut self) -> Self {
            self.ping_fails = true;
            self
        }

        /// Seed members directly, bypassing call tracking.
        pub fn seed(&self, emails: &[&str]) {
            let mut state = self.state.lock();
            for email in emails {
                let member = Member {
                    email_address: email.to_string(),
                    ..Member::default()
                };
                state.insert(&member);
            }
        }

        pub fn members(&self) -> Vec<Member> {
            let state = self.state.lock();
            state.members.iter().map(|stored| stored.member.clone()).collect()
        }

        pub fn call_count(&self, method: &str) -> usize {
            let state = self.state.lock();
            state.calls.get(method).copied().unwrap_or(0)
        }

        /// Members submitted by the most recent batch upsert.
        pub fn last_upsert(&self) -> Vec<Member> {
            self.state.lock().last_upsert.clone()
        }
    }

    #[rocket::async_trait]
    impl ContactProvider for InMemoryProvider {
        fn list_id(&self) -> &str {
            &self.list_id
        }

        async fn ping(&self) -> ProviderResult<serde_json::Value> {
            self.state.lock().track("ping");
            if self.ping_fails {
                return Err(problem(
                    StatusCode::UNAUTHORIZED,
                    "API Key Invalid",
                    "Your API key may be invalid, or you've attempted to access the wrong datacenter.",
                ));
            }
            Ok(serde_json::json!({ "health_status": "Everything's Chimpy!" }))
        }

        async fn list_members(&self, query: &MemberQuery) -> ProviderResult<MemberPage> {
            let mut state = self.state.lock();
            state.track("list_members");

            let mut ordered: Vec<&StoredMember> = state.members.iter().collect();
            ordered.sort_by_key(|stored| stored.seq);
            if query.sort_dir == Some(SortDirection::Desc) {
                ordered.reverse();
            }

            let members = ordered
                .into_iter()
                .skip(query.offset as usize)
                .take(query.count as usize)
                .map(|stored| stored.member.clone())
                .collect();

            Ok(MemberPage {
                members,
                total_items: state.members.len() as u64,
            })
        }

        async fn add_member(&self, member: &Member) -> ProviderResult<Member> {
            let mut state = self.state.lock();
            state.track("add_member");

            if member.email_address.trim().is_empty() {
                return Err(problem(
                    StatusCode::BAD_REQUEST,
                    "Invalid Resource",
                    "The resource submitted could not be validated. For field-specific details, see the 'errors' array.",
                ));
            }
            if state
                .position_by_hash(&subscriber_hash(&member.email_address))
                .is_some()
            {
                return Err(problem(
                    StatusCode::BAD_REQUEST,
                    "Member Exists",
                    &format!(
                        "{} is already a list member. Use PUT to insert or update list members.",
                        member.email_address
                    ),
                ));
            }

            Ok(state.insert(member))
        }

        async fn update_member(
            &self,
            subscriber_hash: &str,
            member: &Member,
        ) -> ProviderResult<Member> {
            let mut state = self.state.lock();
            state.track("update_member");

            let index = state.position_by_hash(subscriber_hash).ok_or_else(not_found)?;
            Ok(state.patch(index, member))
        }

        async fn delete_member(&self, subscriber_hash: &str) -> ProviderResult<()> {
            let mut state = self.state.lock();
            state.track("delete_member");

            let index = state.position_by_hash(subscriber_hash).ok_or_else(not_found)?;
            state.members.remove(index);
            Ok(())
        }

        async fn batch_upsert(&self, members: &[Member]) -> ProviderResult<BatchResult> {
            let mut state = self.state.lock();
            state.track("batch_upsert");
            state.last_upsert = members.to_vec();

            let mut result = BatchResult::default();
            for member in members {
                if member.email_address.trim().is_empty() {
                    result.errors.push(MemberFailure {
                        email_address: member.email_address.clone(),
                        error: BLANK_FIELD_MESSAGE.to_string(),
                        error_code: Some("ERROR_GENERIC".to_string()),
                        field: "email_address".to_string(),
                        field_message: BLANK_FIELD_MESSAGE.to_string(),
                    });
                    continue;
                }

                match state.position_by_hash(&subscriber_hash(&member.email_address)) {
                    Some(index) => {
                        let updated = state.patch(index, member);
                        result.updated_members.push(updated);
                    }
                    None => {
                        let created = state.insert(member);
                        result.new_members.push(created);
                    }
                }
            }

            Ok(result)
        }

        async fn start_batch(&self, operations: &[BatchOperation]) -> ProviderResult<BatchJob> {
            let mut state = self.state.lock();
            state.track("start_batch");

            for operation in operations {
                if operation.method != "DELETE" {
                    continue;
                }
                let hash = operation.path.rsplit('/').next().unwrap_or_default();
                if let Some(index) = state.position_by_hash(hash) {
                    state.members.remove(index);
                }
            }

            let id = uuid::Uuid::new_v4().simple().to_string();
            state.batches.insert(
                id.clone(),
                PendingBatch {
                    remaining_polls: self.pending_polls,
                    operations: operations.len() as u64,
                },
            );
            let status = if self.pending_polls == 0 { "finished" } else { "pending" };

            Ok(BatchJob {
                id,
                status: status.to_string(),
                total_operations: operations.len() as u64,
                ..BatchJob::default()
            })
        }

        async fn batch_status(&self, batch_id: &str) -> ProviderResult<BatchJob> {
            let mut state = self.state.lock();
            state.track("batch_status");

            let batch = state.batches.get_mut(batch_id).ok_or_else(not_found)?;
            let (status, finished) = if batch.remaining_polls == 0 {
                ("finished", batch.operations)
            } else {
                batch.remaining_polls -= 1;
                ("started", 0)
            };

            Ok(BatchJob {
                id: batch_id.to_string(),
                status: status.to_string(),
                total_operations: batch.operations,
                finished_operations: finished,
                errored_operations: 0,
            })
        }
    }

    /// Poll timing short enough for tests.
    pub fn fast_poll() -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(10),
            deadline: Duration::from_millis(50),
        }
    }

    const BOUNDARY: &str = "contacts-api-test-boundary";

    /// Hand-rolled `multipart/form-data` body for local-client requests.
    #[derive(Default)]
    pub struct MultipartBody {
        body: Vec<u8>,
    }

    impl MultipartBody {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn text(mut self, name: &str, value: &str) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
            self
        }

        pub fn file(mut self, name: &str, filename: &str, contents: &[u8]) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n"
                )
                .as_bytes(),
            );
            self.body.extend_from_slice(contents);
            self.body.extend_from_slice(b"\r\n");
            self
        }

        pub fn finish(mut self) -> (ContentType, Vec<u8>) {
            self.body
                .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
            let content_type =
                ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY));
            (content_type, self.body)
        }
    }

    /// Builder for the full application wired to a test provider.
    pub struct TestRocketBuilder {
        figment: Figment,
        provider: Arc<dyn ContactProvider>,
        poll: PollSettings,
    }

    impl Default for TestRocketBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestRocketBuilder {
        /// Start a builder with sensible defaults: random port, logging
        /// disabled, an empty [`InMemoryProvider`].
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false))
                .merge(("limits", crate::upload_limits()));

            Self {
                figment,
                provider: Arc::new(InMemoryProvider::new()),
                poll: fast_poll(),
            }
        }

        pub fn provider(mut self, provider: Arc<dyn ContactProvider>) -> Self {
            self.provider = provider;
            self
        }

        pub fn poll_settings(mut self, poll: PollSettings) -> Self {
            self.poll = poll;
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let service = ContactService::new(self.provider, self.poll);
            crate::mount_app(rocket::custom(self.figment), service)
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
