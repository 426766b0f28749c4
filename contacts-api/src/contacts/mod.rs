//! Contact operations layered over the [`ContactProvider`] seam.
//!
//! Each request builds the values it needs, hands them to the provider, and
//! drops them; nothing is persisted locally.

pub mod export;
pub mod hash;
pub mod import;
pub mod mapper;
pub mod replace;

pub use export::{EXPORT_FILENAME, ExportError, members_to_csv};
pub use hash::subscriber_hash;
pub use import::{ImportError, parse_members};
pub use mapper::{MappingError, to_member, to_member_with_email};
pub use replace::{BatchWait, MAX_CONTACT_LIST, PollSettings};

use crate::error::ApiError;
use crate::mailchimp::{ContactProvider, MemberQuery, SortDirection};
use crate::models::{BatchResult, ContactBody, ContactListResponse, Member};
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

const LISTING_FIELDS: [&str; 5] = [
    "members.id",
    "members.email_address",
    "members.merge_fields",
    "members.last_changed",
    "total_items",
];

/// Handle on the provider plus the knobs the contact flows need.
#[derive(Clone)]
pub struct ContactService {
    provider: Arc<dyn ContactProvider>,
    poll: PollSettings,
}

impl ContactService {
    pub fn new(provider: Arc<dyn ContactProvider>, poll: PollSettings) -> Self {
        Self { provider, poll }
    }

    pub fn provider(&self) -> &dyn ContactProvider {
        self.provider.as_ref()
    }

    /// One page of members ordered by `last_changed`.
    pub async fn list(
        &self,
        page: u32,
        limit: u32,
        sort: SortDirection,
    ) -> Result<ContactListResponse, ApiError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let page = page.max(1);
        let query = MemberQuery {
            count: limit,
            offset: (page - 1).saturating_mul(limit),
            sort_dir: Some(sort),
            fields: LISTING_FIELDS.to_vec(),
        };

        let result = self.provider.list_members(&query).await?;
        Ok(ContactListResponse {
            members: result.members,
            total_items: result.total_items,
            total_pages: result.total_items.div_ceil(u64::from(limit)),
        })
    }

    pub async fn add(&self, contact: ContactBody) -> Result<Member, ApiError> {
        let member = to_member_with_email(contact)?;
        Ok(self.provider.add_member(&member).await?)
    }

    pub async fn update(&self, contact: ContactBody) -> Result<Member, ApiError> {
        let member = to_member_with_email(contact)?;
        let hash = subscriber_hash(&member.email_address);
        Ok(self.provider.update_member(&hash, &member).await?)
    }

    pub async fn delete(&self, email: &str) -> Result<(), ApiError> {
        Ok(self.provider.delete_member(&subscriber_hash(email)).await?)
    }

    /// Add or update every contact in an uploaded CSV with one batch call.
    pub async fn import_csv(&self, data: &[u8]) -> Result<BatchResult, ApiError> {
        let members = parse_members(data)?;
        log::info!("importing {} contacts from CSV", members.len());
        Ok(self.provider.batch_upsert(&members).await?)
    }

    /// Replace the whole list with the contents of an uploaded CSV.
    ///
    /// The upload is parsed before anything is deleted, so a malformed file
    /// leaves the list untouched.
    pub async fn replace_csv(&self, data: &[u8]) -> Result<BatchResult, ApiError> {
        let members = parse_members(data)?;
        let outcome = replace::clear_list(self.provider.as_ref(), self.poll).await?;
        log::info!("delete phase ended: {:?}", outcome);
        Ok(self.provider.batch_upsert(&members).await?)
    }

    /// Full list (up to [`MAX_CONTACT_LIST`]) rendered as CSV text.
    pub async fn export_csv(&self) -> Result<String, ApiError> {
        let query = MemberQuery {
            count: MAX_CONTACT_LIST,
            offset: 0,
            sort_dir: Some(SortDirection::Desc),
            fields: LISTING_FIELDS.to_vec(),
        };
        let page = self.provider.list_members(&query).await?;
        Ok(members_to_csv(&page.members)?)
    }
}
