//! CSV upload parsing: column extraction, mapping, and in-file
//! de-duplication ahead of a single batch upsert.

use super::mapper;
use crate::models::{ContactBody, Member};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use thiserror::Error;

pub const COL_EMAIL: &str = "Email Addresses\\Email address";
pub const COL_FIRST_NAME: &str = "First name";
pub const COL_LAST_NAME: &str = "Last/Organization/Group/Household name";
pub const COL_PHONE: &str = "Phones\\Number";
pub const COL_ADDRESS_1: &str = "Addresses\\Address line 1";
pub const COL_ADDRESS_2: &str = "Addresses\\Address line 2";
pub const COL_CITY: &str = "Addresses\\City";
pub const COL_STATE: &str = "Addresses\\State abbreviation";
pub const COL_ZIP: &str = "Addresses\\ZIP";
pub const COL_COUNTRY: &str = "Addresses\\Country abbreviation";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid CSV upload: {0}")]
    Csv(#[from] csv::Error),
}

/// Column positions resolved from the header row.
struct Columns {
    headers: Vec<String>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let headers = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Self { headers }
    }

    /// Trimmed cell value. An empty cell stays `Some("")` so the upsert
    /// clears the field upstream; only a missing column yields `None`.
    fn get(&self, record: &StringRecord, name: &str) -> Option<String> {
        let index = self.headers.iter().position(|h| h == name)?;
        Some(record.get(index).unwrap_or_default().trim().to_string())
    }

    fn contact(&self, record: &StringRecord) -> ContactBody {
        ContactBody {
            email: self.get(record, COL_EMAIL),
            first_name: self.get(record, COL_FIRST_NAME),
            last_name: self.get(record, COL_LAST_NAME),
            phone_number: self.get(record, COL_PHONE),
            address_1: self.get(record, COL_ADDRESS_1),
            address_2: self.get(record, COL_ADDRESS_2),
            city: self.get(record, COL_CITY),
            state: self.get(record, COL_STATE),
            zip: self.get(record, COL_ZIP),
            country: self.get(record, COL_COUNTRY),
        }
    }
}

/// Parse an uploaded CSV into members ready for a batch upsert.
///
/// The first row for a given email (compared case-insensitively) wins; later
/// duplicates are dropped. Rows without an email share the empty key, so
/// only the first of them is kept and the provider reports it as a failure.
pub fn parse_members(data: &[u8]) -> Result<Vec<Member>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let columns = Columns::new(reader.headers()?);
    let mut seen = HashSet::new();
    let mut members = Vec::new();

    for record in reader.records() {
        let record = record?;
        let member = mapper::to_member(columns.contact(&record));
        let key = member.email_address.trim().to_lowercase();
        if !seen.insert(key) {
            log::debug!("dropping duplicate CSV row for '{}'", member.email_address);
            continue;
        }
        members.push(member);
    }

    Ok(members)
}
