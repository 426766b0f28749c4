//! Wire types for the provider endpoints that are not part of the public
//! contact model.

use crate::models::Member;
use rocket::FromFormField;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

/// Sort direction applied to `last_changed`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, FromFormField,
)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Parameters for `GET /lists/{list_id}/members`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberQuery {
    pub count: u32,
    pub offset: u32,
    pub sort_dir: Option<SortDirection>,
    pub fields: Vec<&'static str>,
}

impl MemberQuery {
    /// Render the query as `(key, value)` pairs for the HTTP client.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("count", self.count.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(dir) = self.sort_dir {
            pairs.push(("sort_field", "last_changed".to_string()));
            pairs.push(("sort_dir", dir.as_str().to_string()));
        }
        if !self.fields.is_empty() {
            pairs.push(("fields", self.fields.join(",")));
        }
        pairs
    }
}

/// One page of list members as reported by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberPage {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub total_items: u64,
}

/// A single operation inside a provider batch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOperation {
    pub method: String,
    pub path: String,
}

impl BatchOperation {
    pub fn delete(path: String) -> Self {
        Self {
            method: "DELETE".to_string(),
            path,
        }
    }
}

/// Status snapshot of a provider batch job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchJob {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_operations: u64,
    #[serde(default)]
    pub finished_operations: u64,
    #[serde(default)]
    pub errored_operations: u64,
}

impl BatchJob {
    pub fn is_finished(&self) -> bool {
        self.status == "finished"
    }
}
