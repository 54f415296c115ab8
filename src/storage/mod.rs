pub mod blob;
pub mod documents;

pub use blob::*;
pub use documents::*;

use std::sync::Arc;

use thiserror::Error;

use crate::models::{DocumentCollection, DocumentRecord, UserScope};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Stored documents for {scope} are corrupted: {reason}")]
    Corrupt { scope: UserScope, reason: String },

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Durable, per-user document collection.
///
/// `append` is the only mutator. Records are never edited or removed and
/// insertion order is preserved (newest last).
pub trait DocumentStore {
    /// Collection for `scope`; empty when nothing was ever stored.
    fn load(&self, scope: &UserScope) -> Result<DocumentCollection, StoreError>;

    /// Add `record` at the tail. On failure the previously stored
    /// collection is left untouched.
    fn append(&self, scope: &UserScope, record: &DocumentRecord) -> Result<(), StoreError>;

    /// First record with the given id, in insertion order.
    fn get(&self, scope: &UserScope, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.load(scope)?.into_iter().find(|d| d.id == id))
    }
}

impl<S: DocumentStore> DocumentStore for Arc<S> {
    fn load(&self, scope: &UserScope) -> Result<DocumentCollection, StoreError> {
        (**self).load(scope)
    }

    fn append(&self, scope: &UserScope, record: &DocumentRecord) -> Result<(), StoreError> {
        (**self).append(scope, record)
    }

    fn get(&self, scope: &UserScope, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        (**self).get(scope, id)
    }
}
