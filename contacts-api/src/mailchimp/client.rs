use super::config::MailchimpConfig;
use super::error::{ProviderError, ProviderResult};
use super::types::{BatchJob, BatchOperation, MemberPage, MemberQuery};
use super::ContactProvider;
use crate::models::{BatchResult, Member};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Mailchimp Marketing API client.
///
/// Built once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct MailchimpClient {
    http: reqwest::Client,
    api_root: String,
    api_key: String,
    list_id: String,
}

#[derive(Serialize)]
struct BatchUpsertRequest<'a> {
    members: &'a [Member],
    update_existing: bool,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    operations: &'a [BatchOperation],
}

impl MailchimpClient {
    pub fn new(config: &MailchimpConfig) -> ProviderResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("contacts-api/0.1")
            .build()?;

        Ok(Self {
            http,
            api_root: config.api_root(),
            api_key: config.api_key.clone(),
            list_id: config.list_id.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_root, path))
            .basic_auth("anystring", Some(&self.api_key))
    }

    fn members_path(&self) -> String {
        format!("/lists/{}/members", self.list_id)
    }

    fn member_path(&self, subscriber_hash: &str) -> String {
        format!("/lists/{}/members/{}", self.list_id, subscriber_hash)
    }

    async fn check(response: Response) -> ProviderResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = ProviderError::from_status(status, &body);
        log::debug!("provider returned {}: {}", status, err);
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ProviderResult<T> {
        let response = Self::check(request.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[rocket::async_trait]
impl ContactProvider for MailchimpClient {
    fn list_id(&self) -> &str {
        &self.list_id
    }

    async fn ping(&self) -> ProviderResult<serde_json::Value> {
        Self::send_json(self.request(Method::GET, "/ping")).await
    }

    async fn list_members(&self, query: &MemberQuery) -> ProviderResult<MemberPage> {
        let request = self
            .request(Method::GET, &self.members_path())
            .query(&query.to_pairs());
        Self::send_json(request).await
    }

    async fn add_member(&self, member: &Member) -> ProviderResult<Member> {
        let request = self
            .request(Method::POST, &self.members_path())
            .query(&[("skip_merge_validation", "true")])
            .json(member);
        Self::send_json(request).await
    }

    async fn update_member(&self, subscriber_hash: &str, member: &Member) -> ProviderResult<Member> {
        let request = self
            .request(Method::PATCH, &self.member_path(subscriber_hash))
            .query(&[("skip_merge_validation", "true")])
            .json(member);
        Self::send_json(request).await
    }

    async fn delete_member(&self, subscriber_hash: &str) -> ProviderResult<()> {
        let request = self.request(Method::DELETE, &self.member_path(subscriber_hash));
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn batch_upsert(&self, members: &[Member]) -> ProviderResult<BatchResult> {
        let payload = BatchUpsertRequest {
            members,
            update_existing: true,
        };
        let request = self
            .request(Method::POST, &format!("/lists/{}", self.list_id))
            .json(&payload);
        Self::send_json(request).await
    }

    async fn start_batch(&self, operations: &[BatchOperation]) -> ProviderResult<BatchJob> {
        let request = self
            .request(Method::POST, "/batches")
            .json(&BatchRequest { operations });
        Self::send_json(request).await
    }

    async fn batch_status(&self, batch_id: &str) -> ProviderResult<BatchJob> {
        Self::send_json(self.request(Method::GET, &format!("/batches/{batch_id}"))).await
    }
}
