use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== Request Bodies =====

/// Flat contact representation accepted by `POST /contacts` and `PUT /contacts`.
///
/// Every field is optional at the deserialization boundary; the mapper
/// decides which ones are required for a given operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ContactBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address_1: Option<String>,
    #[serde(default)]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

// ===== Member Models (provider shape) =====

/// Merge fields attached to a list member.
///
/// Keys are the provider's uppercase merge tags. `None` values are never
/// serialized because upstream rejects explicit nulls on optional fields.
/// Merge fields configured on the list but unknown here (for example the
/// nested `ADDRESS` field) are carried through `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MergeFields {
    #[serde(rename = "FNAME", default, skip_serializing_if = "Option::is_none")]
    pub fname: Option<String>,
    #[serde(rename = "LNAME", default, skip_serializing_if = "Option::is_none")]
    pub lname: Option<String>,
    #[serde(rename = "BIRTHDAY", default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(rename = "PHONE", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "ADDR1", default, skip_serializing_if = "Option::is_none")]
    pub addr1: Option<String>,
    #[serde(rename = "ADDR2", default, skip_serializing_if = "Option::is_none")]
    pub addr2: Option<String>,
    #[serde(rename = "CITY", default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "STATE", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "ZIP", default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(rename = "COUNTRY", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A single entry in the mailing list, keyed by email address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Member {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub email_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub merge_fields: MergeFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<String>,
}

/// Per-row failure reported by the provider's batch endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MemberFailure {
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub field_message: String,
}

/// Outcome of a batch add-or-update call, partitioned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchResult {
    #[serde(default)]
    pub new_members: Vec<Member>,
    #[serde(default)]
    pub updated_members: Vec<Member>,
    #[serde(default)]
    pub errors: Vec<MemberFailure>,
}

// ===== API Responses =====

/// Paginated member listing returned by `GET /contacts`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContactListResponse {
    pub members: Vec<Member>,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Response shape shared by the CSV import and replace endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CsvImportResponse {
    pub new_members: Vec<Member>,
    pub updated_members: Vec<Member>,
    pub failed_members: Vec<MemberFailure>,
}

impl From<BatchResult> for CsvImportResponse {
    fn from(result: BatchResult) -> Self {
        Self {
            new_members: result.new_members,
            updated_members: result.updated_members,
            failed_members: result.errors,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}
