//! Blob persistence boundary: one opaque byte blob per (scope, name).
//!
//! `FileBlobStore` lays blobs out as `<root>/profiles/<scope>/<name>.json`
//! and replaces them atomically (temp file in the same directory, fsync,
//! rename). `MemoryBlobStore` backs tests and ephemeral wallets.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::UserScope;

pub trait BlobStore {
    /// Current blob, or `None` if it was never written.
    fn read(&self, scope: &UserScope, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Replace the blob. All-or-nothing: on error the previous blob remains.
    fn write(&self, scope: &UserScope, name: &str, bytes: &[u8]) -> io::Result<()>;
}

// ═══════════════════════════════════════════════════════════
// File-backed blobs
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn scope_dir(&self, scope: &UserScope) -> PathBuf {
        self.root.join("profiles").join(scope.as_str())
    }

    pub fn blob_path(&self, scope: &UserScope, name: &str) -> PathBuf {
        self.scope_dir(scope).join(format!("{name}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, scope: &UserScope, name: &str) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.blob_path(scope, name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, scope: &UserScope, name: &str, bytes: &[u8]) -> io::Result<()> {
        let dir = self.scope_dir(scope);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            set_dir_permissions(&dir)?;
        }

        // Temp file dropped (and removed) on any error before persist.
        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.blob_path(scope, name)).map_err(|e| e.error)?;

        tracing::debug!(scope = %scope, blob = name, size = bytes.len(), "Blob written");
        Ok(())
    }
}

/// Restrict a scope directory to owner-only access (0o700 on Unix).
#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// In-memory blobs
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<(UserScope, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> io::Error {
    io::Error::other("blob store lock poisoned")
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, scope: &UserScope, name: &str) -> io::Result<Option<Vec<u8>>> {
        let blobs = self.blobs.lock().map_err(|_| poisoned())?;
        Ok(blobs.get(&(scope.clone(), name.to_string())).cloned())
    }

    fn write(&self, scope: &UserScope, name: &str, bytes: &[u8]) -> io::Result<()> {
        let mut blobs = self.blobs.lock().map_err(|_| poisoned())?;
        blobs.insert((scope.clone(), name.to_string()), bytes.to_vec());
        Ok(())
    }
}

/// Wraps a blob store and rejects writes on demand (simulated disk failure).
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FailingBlobStore<B> {
    inner: B,
    fail_writes: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl<B: BlobStore> FailingBlobStore<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            fail_writes: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl<B: BlobStore> BlobStore for FailingBlobStore<B> {
    fn read(&self, scope: &UserScope, name: &str) -> io::Result<Option<Vec<u8>>> {
        self.inner.read(scope, name)
    }

    fn write(&self, scope: &UserScope, name: &str, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(io::Error::other("simulated write failure"));
        }
        self.inner.write(scope, name, bytes)
    }
}
