use chrono::{DateTime, Utc};

use super::resolver::RawResolvedRecord;
use crate::models::document::*;

/// Map a registry record to the canonical shape, stamping a missing
/// identifier with the current time.
pub fn normalize(raw: RawResolvedRecord) -> DocumentRecord {
    normalize_at(raw, Utc::now())
}

/// Pure normalization: every absent, null or blank field becomes its
/// placeholder; present values are kept verbatim.
///
/// A missing identifier is replaced by one derived from `acquired_at`
/// instead of a shared literal, so id-less records stay distinguishable
/// inside a collection.
pub fn normalize_at(raw: RawResolvedRecord, acquired_at: DateTime<Utc>) -> DocumentRecord {
    DocumentRecord {
        id: present(raw.id).unwrap_or_else(|| generated_id(acquired_at)),
        holder_name: or_placeholder(raw.holder_name, UNKNOWN_HOLDER_NAME),
        national_id: or_placeholder(raw.national_id, UNKNOWN_NATIONAL_ID),
        birth_date: or_placeholder(raw.birth_date, UNKNOWN_BIRTH_DATE),
        institution: or_placeholder(raw.institution, UNKNOWN_INSTITUTION),
        program: or_placeholder(raw.program, UNKNOWN_PROGRAM),
        issuer: or_placeholder(raw.issuer, UNKNOWN_ISSUER),
        validity: or_placeholder(raw.validity, UNKNOWN_VALIDITY),
        portrait_ref: present(raw.portrait_ref),
    }
}

/// Substitute identifier, e.g. `unidentified-20261018T141502.123456789Z`.
pub fn generated_id(acquired_at: DateTime<Utc>) -> String {
    format!(
        "{GENERATED_ID_PREFIX}{}",
        acquired_at.format("%Y%m%dT%H%M%S%.9fZ")
    )
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    present(value).unwrap_or_else(|| placeholder.to_string())
}

impl From<DocumentRecord> for RawResolvedRecord {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: Some(record.id),
            holder_name: Some(record.holder_name),
            national_id: Some(record.national_id),
            birth_date: Some(record.birth_date),
            institution: Some(record.institution),
            program: Some(record.program),
            issuer: Some(record.issuer),
            validity: Some(record.validity),
            portrait_ref: record.portrait_ref,
        }
    }
}
