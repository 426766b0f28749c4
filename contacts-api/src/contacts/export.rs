use crate::models::Member;
use thiserror::Error;

pub const EXPORT_FILENAME: &str = "sgs_contacts.csv";

const EXPORT_HEADERS: [&str; 11] = [
    "First Name",
    "Last Name",
    "Email",
    "Phone No.",
    "Address 1",
    "Address 2",
    "City",
    "State",
    "Zip Code",
    "Country",
    "Last Changed",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render members as the downloadable contact-list CSV.
pub fn members_to_csv(members: &[Member]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;

    for member in members {
        let fields = &member.merge_fields;
        let cell = |value: &Option<String>| value.clone().unwrap_or_default();
        writer.write_record([
            cell(&fields.fname),
            cell(&fields.lname),
            member.email_address.clone(),
            cell(&fields.phone),
            cell(&fields.addr1),
            cell(&fields.addr2),
            cell(&fields.city),
            cell(&fields.state),
            cell(&fields.zip),
            cell(&fields.country),
            cell(&member.last_changed),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
