use serde::{Deserialize, Serialize};

/// Canonical, persisted document record.
///
/// Every string field is always populated; absence in the registry response
/// is replaced by a placeholder during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub holder_name: String,
    pub national_id: String,
    pub birth_date: String,
    pub institution: String,
    pub program: String,
    pub issuer: String,
    pub validity: String,
    pub portrait_ref: Option<String>,
}

/// Ordered document collection of one user scope, oldest first.
pub type DocumentCollection = Vec<DocumentRecord>;

pub const UNKNOWN_HOLDER_NAME: &str = "Unknown holderName";
pub const UNKNOWN_NATIONAL_ID: &str = "Unknown nationalId";
pub const UNKNOWN_BIRTH_DATE: &str = "Unknown birthDate";
pub const UNKNOWN_INSTITUTION: &str = "Unknown institution";
pub const UNKNOWN_PROGRAM: &str = "Unknown program";
pub const UNKNOWN_ISSUER: &str = "Unknown issuer";
pub const UNKNOWN_VALIDITY: &str = "Unknown validity";

/// Prefix of identifiers generated for records the registry returned without one.
pub const GENERATED_ID_PREFIX: &str = "unidentified-";

impl DocumentRecord {
    /// Whether `id` was generated locally rather than issued by the registry.
    pub fn has_generated_id(&self) -> bool {
        self.id.starts_with(GENERATED_ID_PREFIX)
    }
}
