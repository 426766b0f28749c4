//! Conversion from the flat contact representation into the provider's
//! member shape.

use crate::models::{ContactBody, Member, MergeFields};
use thiserror::Error;

pub const DEFAULT_STATUS: &str = "subscribed";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("email is required")]
    MissingEmail,
}

/// Map a contact into a member record.
///
/// Name and phone stay absent when not supplied; address parts are
/// normalized to empty strings. Nothing is ever mapped to `null`. A missing
/// email maps to an empty address so upstream can report it per row.
pub fn to_member(contact: ContactBody) -> Member {
    let ContactBody {
        email,
        first_name,
        last_name,
        phone_number,
        address_1,
        address_2,
        city,
        state,
        zip,
        country,
    } = contact;

    Member {
        id: None,
        email_address: email.unwrap_or_default(),
        status: Some(DEFAULT_STATUS.to_string()),
        merge_fields: MergeFields {
            fname: first_name,
            lname: last_name,
            phone: phone_number,
            addr1: Some(address_1.unwrap_or_default()),
            addr2: Some(address_2.unwrap_or_default()),
            city: Some(city.unwrap_or_default()),
            state: Some(state.unwrap_or_default()),
            zip: Some(zip.unwrap_or_default()),
            country: Some(country.unwrap_or_default()),
            ..MergeFields::default()
        },
        last_changed: None,
    }
}

/// Like [`to_member`], but rejects contacts without a usable email.
pub fn to_member_with_email(contact: ContactBody) -> Result<Member, MappingError> {
    let has_email = contact
        .email
        .as_deref()
        .is_some_and(|email| !email.trim().is_empty());
    if !has_email {
        return Err(MappingError::MissingEmail);
    }
    Ok(to_member(contact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn full_contact() -> ContactBody {
        ContactBody {
            email: Some("a@x.com".into()),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            phone_number: Some("555-0100".into()),
            address_1: Some("1 Main St".into()),
            address_2: Some("Apt 2".into()),
            city: Some("Springfield".into()),
            state: Some("IL".into()),
            zip: Some("62701".into()),
            country: Some("US".into()),
        }
    }

    fn merge_fields_json(member: &Member) -> serde_json::Map<String, Value> {
        match serde_json::to_value(member).unwrap()["merge_fields"].clone() {
            Value::Object(map) => map,
            other => panic!("merge_fields should be an object, got {other:?}"),
        }
    }

    #[test]
    fn full_contact_maps_every_merge_field() {
        let member = to_member_with_email(full_contact()).unwrap();
        assert_eq!(member.email_address, "a@x.com");
        assert_eq!(member.status.as_deref(), Some("subscribed"));

        let fields = merge_fields_json(&member);
        assert_eq!(fields["FNAME"], "Ada");
        assert_eq!(fields["LNAME"], "Lovelace");
        assert_eq!(fields["PHONE"], "555-0100");
        assert_eq!(fields["ADDR1"], "1 Main St");
        assert_eq!(fields["ADDR2"], "Apt 2");
        assert_eq!(fields["CITY"], "Springfield");
        assert_eq!(fields["STATE"], "IL");
        assert_eq!(fields["ZIP"], "62701");
        assert_eq!(fields["COUNTRY"], "US");
        assert!(fields.values().all(|value| !value.is_null()));
    }

    #[test]
    fn absent_fields_never_serialize_as_null() {
        let member = to_member(ContactBody {
            email: Some("b@x.com".into()),
            ..ContactBody::default()
        });

        let fields = merge_fields_json(&member);
        assert!(fields.values().all(|value| !value.is_null()));
        assert!(!fields.contains_key("FNAME"));
        assert!(!fields.contains_key("PHONE"));
        for key in ["ADDR1", "ADDR2", "CITY", "STATE", "ZIP", "COUNTRY"] {
            assert_eq!(fields[key], "", "{key} should default to an empty string");
        }

        let json = serde_json::to_value(&member).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("last_changed").is_none());
    }

    #[test]
    fn missing_or_blank_email_is_rejected() {
        let mut contact = full_contact();
        contact.email = None;
        assert_eq!(
            to_member_with_email(contact.clone()),
            Err(MappingError::MissingEmail)
        );

        contact.email = Some("   ".into());
        assert_eq!(to_member_with_email(contact), Err(MappingError::MissingEmail));
    }
}
