//! Home feed — collection listing and document detail.
//!
//! Read-only views over the document store. Every call reloads the
//! collection, so a record committed from another view shows up on the
//! next visit.

use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;
use crate::models::{DocumentRecord, UserScope};
use crate::storage::DocumentStore;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A document card for the home feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCard {
    pub id: String,
    pub holder_name: String,
    pub institution: String,
    pub program: String,
    pub validity: String,
    pub has_portrait: bool,
}

impl From<&DocumentRecord> for DocumentCard {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id.clone(),
            holder_name: record.holder_name.clone(),
            institution: record.institution.clone(),
            program: record.program.clone(),
            validity: record.validity.clone(),
            has_portrait: record.portrait_ref.is_some(),
        }
    }
}

/// Complete home screen payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeData {
    /// Most recently added first.
    pub documents: Vec<DocumentCard>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Repository functions
// ---------------------------------------------------------------------------

pub fn home_data<S: DocumentStore + ?Sized>(
    store: &S,
    scope: &UserScope,
) -> Result<HomeData, CoreError> {
    let collection = store.load(scope)?;
    let documents: Vec<DocumentCard> = collection.iter().rev().map(DocumentCard::from).collect();

    tracing::debug!(scope = %scope, total = documents.len(), "Home feed loaded");
    Ok(HomeData {
        total: documents.len(),
        documents,
    })
}

/// Full record for the detail view. With duplicate ids the earliest
/// stored copy wins.
pub fn document_detail<S: DocumentStore + ?Sized>(
    store: &S,
    scope: &UserScope,
    id: &str,
) -> Result<DocumentRecord, CoreError> {
    store
        .get(scope, id)?
        .ok_or_else(|| CoreError::NotFound(id.to_string()))
}
