//! Query parameters for the contact listing endpoint.

use crate::contacts::DEFAULT_PAGE_SIZE;
use crate::mailchimp::SortDirection;
use rocket::FromForm;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, FromForm)]
pub struct ContactListParams {
    /// One-based page index (defaults to 1).
    pub page: Option<u32>,
    /// Members per page (defaults to 10, capped at 1000).
    pub limit: Option<u32>,
    /// `asc` or `desc` by last change (defaults to `desc`).
    pub sort: Option<SortDirection>,
}

impl ContactListParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn sort(&self) -> SortDirection {
        self.sort.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_missing() {
        let params = ContactListParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.sort(), SortDirection::Desc);
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        let params = ContactListParams {
            page: Some(0),
            limit: Some(25),
            sort: Some(SortDirection::Asc),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 25);
        assert_eq!(params.sort(), SortDirection::Asc);
    }
}
