//! Flat facility records produced by the two directory extractors.
//!
//! The two sources are independent; their records share no schema.

use serde::Serialize;

/// A record type that can be written as one CSV row.
///
/// `HEADERS` lists the serialized field names in declaration order, so the
/// header row can be written even when there are no records.
pub trait CsvRecord: Serialize {
    const HEADERS: &'static [&'static str];
}

/// One entry from the AWO Sachsen search result list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SachsenRecord {
    pub name: String,
    /// Street line and postcode/city line, newline separated.
    pub address: String,
    pub contact_person: String,
    pub telephone: String,
    pub fax: String,
    pub email: String,
    pub website: String,
    pub organisation: String,
    pub organisation_website: String,
}

impl CsvRecord for SachsenRecord {
    const HEADERS: &'static [&'static str] = &[
        "name",
        "address",
        "contact_person",
        "telephone",
        "fax",
        "email",
        "website",
        "organisation",
        "organisation_website",
    ];
}

/// One facility detail page from the AWO Weser-Ems location list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeserRecord {
    pub name: String,
    pub address: String,
    pub contact_person: String,
    pub telephone: String,
    pub email: String,
}

impl CsvRecord for WeserRecord {
    const HEADERS: &'static [&'static str] =
        &["name", "address", "contact_person", "telephone", "email"];
}
