use std::path::Path;
use std::sync::Mutex;

use super::blob::{BlobStore, FileBlobStore, MemoryBlobStore};
use super::{DocumentStore, StoreError};
use crate::models::{DocumentCollection, DocumentRecord, UserScope};

/// Blob name of a scope's document collection.
const COLLECTION_BLOB: &str = "documents";

/// Document collection persisted as one JSON array blob per user scope.
///
/// Appends are read-modify-write of the whole blob. They are serialized
/// within this instance; separate processes writing the same scope are
/// not coordinated (last writer wins).
pub struct JsonDocumentStore<B> {
    blobs: B,
    write_lock: Mutex<()>,
}

impl<B: BlobStore> JsonDocumentStore<B> {
    pub fn new(blobs: B) -> Self {
        Self {
            blobs,
            write_lock: Mutex::new(()),
        }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }
}

impl JsonDocumentStore<FileBlobStore> {
    /// Store rooted at the wallet data directory.
    pub fn open(data_dir: &Path) -> Self {
        Self::new(FileBlobStore::new(data_dir))
    }
}

impl JsonDocumentStore<MemoryBlobStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryBlobStore::new())
    }
}

impl<B: BlobStore> DocumentStore for JsonDocumentStore<B> {
    fn load(&self, scope: &UserScope) -> Result<DocumentCollection, StoreError> {
        let Some(bytes) = self.blobs.read(scope, COLLECTION_BLOB)? else {
            return Ok(Vec::new());
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            scope: scope.clone(),
            reason: e.to_string(),
        })
    }

    fn append(&self, scope: &UserScope, record: &DocumentRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut documents = self.load(scope)?;
        documents.push(record.clone());

        let bytes = serde_json::to_vec_pretty(&documents)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.blobs.write(scope, COLLECTION_BLOB, &bytes)?;

        tracing::info!(
            scope = %scope,
            document_id = %record.id,
            total = documents.len(),
            "Document appended to collection"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize_at;
    use crate::pipeline::RawResolvedRecord;
    use crate::storage::blob::FailingBlobStore;
    use chrono::Utc;

    fn scope() -> UserScope {
        UserScope::new("maria@esuda.edu.br").unwrap()
    }

    fn record(id: &str, holder: &str) -> DocumentRecord {
        normalize_at(
            RawResolvedRecord {
                id: Some(id.into()),
                holder_name: Some(holder.into()),
                institution: Some("Esuda".into()),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn first_use_loads_empty_collection() {
        let store = JsonDocumentStore::in_memory();
        assert!(store.load(&scope()).unwrap().is_empty());
    }

    #[test]
    fn append_to_empty_collection() {
        let store = JsonDocumentStore::in_memory();
        let a = record("A", "Ana");
        store.append(&scope(), &a).unwrap();
        assert_eq!(store.load(&scope()).unwrap(), vec![a]);
    }

    #[test]
    fn append_keeps_insertion_order() {
        let store = JsonDocumentStore::in_memory();
        let a = record("A", "Ana");
        let b = record("B", "Bruno");
        store.append(&scope(), &a).unwrap();
        store.append(&scope(), &b).unwrap();
        assert_eq!(store.load(&scope()).unwrap(), vec![a, b]);
    }

    #[test]
    fn append_extends_prefix_with_tail() {
        let store = JsonDocumentStore::in_memory();
        for i in 0..5 {
            let before = store.load(&scope()).unwrap();
            let next = record(&format!("D{i}"), "Holder");
            store.append(&scope(), &next).unwrap();

            let after = store.load(&scope()).unwrap();
            assert_eq!(after.len(), before.len() + 1);
            assert_eq!(&after[..before.len()], before.as_slice());
            assert_eq!(after.last(), Some(&next));
        }
    }

    #[test]
    fn failed_append_leaves_collection_unchanged() {
        let store = JsonDocumentStore::new(FailingBlobStore::new(MemoryBlobStore::new()));
        let a = record("A", "Ana");
        store.append(&scope(), &a).unwrap();

        store.blobs().set_fail_writes(true);
        let err = store.append(&scope(), &record("B", "Bruno")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        store.blobs().set_fail_writes(false);
        assert_eq!(store.load(&scope()).unwrap(), vec![a]);
    }

    // Re-scanning a credential is not deduplicated; both copies are kept.
    #[test]
    fn duplicate_records_accumulate() {
        let store = JsonDocumentStore::in_memory();
        let a = record("A", "Ana");
        store.append(&scope(), &a).unwrap();
        store.append(&scope(), &a).unwrap();
        assert_eq!(store.load(&scope()).unwrap(), vec![a.clone(), a]);
    }

    #[test]
    fn scopes_are_isolated() {
        let store = JsonDocumentStore::in_memory();
        let other = UserScope::new("joao").unwrap();
        store.append(&scope(), &record("A", "Ana")).unwrap();
        assert!(store.load(&other).unwrap().is_empty());
    }

    #[test]
    fn get_returns_first_match() {
        let store = JsonDocumentStore::in_memory();
        let a = record("A", "Ana");
        store.append(&scope(), &a).unwrap();
        store.append(&scope(), &record("B", "Bruno")).unwrap();

        assert_eq!(store.get(&scope(), "A").unwrap(), Some(a));
        assert_eq!(store.get(&scope(), "Z").unwrap(), None);
    }

    #[test]
    fn corrupt_blob_is_reported_not_replaced() {
        let store = JsonDocumentStore::in_memory();
        store
            .blobs()
            .write(&scope(), COLLECTION_BLOB, b"{ not json")
            .unwrap();

        assert!(matches!(
            store.load(&scope()),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(store.append(&scope(), &record("A", "Ana")).is_err());
        assert_eq!(
            store.blobs().read(&scope(), COLLECTION_BLOB).unwrap().unwrap(),
            b"{ not json"
        );
    }

    #[test]
    fn blank_blob_loads_empty() {
        let store = JsonDocumentStore::in_memory();
        store.blobs().write(&scope(), COLLECTION_BLOB, b"\n").unwrap();
        assert!(store.load(&scope()).unwrap().is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let a = record("A", "Ana");
        let b = record("B", "Bruno");
        {
            let store = JsonDocumentStore::open(dir.path());
            store.append(&scope(), &a).unwrap();
            store.append(&scope(), &b).unwrap();
        }

        let reopened = JsonDocumentStore::open(dir.path());
        assert_eq!(reopened.load(&scope()).unwrap(), vec![a, b]);
    }

    #[test]
    fn file_blob_is_camel_case_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDocumentStore::open(dir.path());
        store.append(&scope(), &record("A", "Ana")).unwrap();

        let path = store.blobs().blob_path(&scope(), COLLECTION_BLOB);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        let first = &json.as_array().unwrap()[0];
        assert_eq!(first["id"], "A");
        assert_eq!(first["holderName"], "Ana");
        assert_eq!(first["nationalId"], "Unknown nationalId");
        assert!(first["portraitRef"].is_null());
    }

    #[test]
    fn concurrent_appends_through_one_store_all_survive() {
        let store = JsonDocumentStore::in_memory();
        std::thread::scope(|s| {
            for i in 0..8 {
                let store = &store;
                s.spawn(move || {
                    store
                        .append(&scope(), &record(&format!("T{i}"), "Holder"))
                        .unwrap();
                });
            }
        });
        assert_eq!(store.load(&scope()).unwrap().len(), 8);
    }
}
