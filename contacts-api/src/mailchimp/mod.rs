//! Mailing-list provider seam: the [`ContactProvider`] capability, its
//! Mailchimp implementation, configuration, and wire types.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::MailchimpClient;
pub use config::MailchimpConfig;
pub use error::{ProviderError, ProviderResult};
pub use types::{BatchJob, BatchOperation, MemberPage, MemberQuery, SortDirection};

use crate::models::{BatchResult, Member};

/// Operations the service needs from the upstream mailing-list provider.
///
/// One instance is constructed at startup and handed to Rocket as managed
/// state (`Arc<dyn ContactProvider>`), so tests can substitute their own.
#[rocket::async_trait]
pub trait ContactProvider: Send + Sync {
    /// Identifier of the list every member operation targets.
    fn list_id(&self) -> &str;

    async fn ping(&self) -> ProviderResult<serde_json::Value>;

    async fn list_members(&self, query: &MemberQuery) -> ProviderResult<MemberPage>;

    /// Create a member; fails if the address is already on the list.
    async fn add_member(&self, member: &Member) -> ProviderResult<Member>;

    /// Update an existing member addressed by subscriber hash.
    async fn update_member(&self, subscriber_hash: &str, member: &Member) -> ProviderResult<Member>;

    async fn delete_member(&self, subscriber_hash: &str) -> ProviderResult<()>;

    /// Add-or-update many members in one call. Upstream decides per row
    /// whether it is a create or an update.
    async fn batch_upsert(&self, members: &[Member]) -> ProviderResult<BatchResult>;

    /// Submit an asynchronous batch job.
    async fn start_batch(&self, operations: &[BatchOperation]) -> ProviderResult<BatchJob>;

    async fn batch_status(&self, batch_id: &str) -> ProviderResult<BatchJob>;
}
