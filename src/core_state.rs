//! Shared wallet state.
//!
//! `WalletState` owns the injected services (registry resolver and document
//! store) and the signed-in session. Each sign-in binds a fresh acquisition
//! pipeline to the user's scope; signing out drops it.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use crate::config::ConfigError;
use crate::home::{self, HomeData};
use crate::models::{DocumentRecord, UserScope};
use crate::pipeline::{AcquisitionError, AcquisitionPipeline, DocumentResolver, ResolverError};
use crate::storage::{DocumentStore, StoreError};

/// Pipeline as handed out to callers: services are shared with the state.
pub type SharedPipeline<R, S> = Arc<AcquisitionPipeline<Arc<R>, Arc<S>>>;

// ═══════════════════════════════════════════════════════════
// WalletState
// ═══════════════════════════════════════════════════════════

struct WalletSession<R, S> {
    scope: UserScope,
    pipeline: SharedPipeline<R, S>,
}

pub struct WalletState<R, S> {
    resolver: Arc<R>,
    store: Arc<S>,
    /// Signed-in user. `None` when signed out.
    session: RwLock<Option<WalletSession<R, S>>>,
}

impl<R: DocumentResolver, S: DocumentStore> WalletState<R, S> {
    pub fn new(resolver: R, store: S) -> Self {
        Self {
            resolver: Arc::new(resolver),
            store: Arc::new(store),
            session: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ── Session ─────────────────────────────────────────────

    /// Activate `scope` with an idle pipeline. Replaces any previous session;
    /// an acquisition left in review there is discarded.
    pub fn sign_in(&self, scope: UserScope) -> Result<(), CoreError> {
        let pipeline = Arc::new(AcquisitionPipeline::new(
            self.resolver.clone(),
            self.store.clone(),
            scope.clone(),
        ));

        let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        *guard = Some(WalletSession {
            scope: scope.clone(),
            pipeline,
        });
        tracing::info!(scope = %scope, "Signed in");
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), CoreError> {
        let mut guard = self.session.write().map_err(|_| CoreError::LockPoisoned)?;
        if let Some(session) = guard.take() {
            tracing::info!(scope = %session.scope, "Signed out");
        }
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    pub fn active_scope(&self) -> Result<UserScope, CoreError> {
        let guard = self.read_session()?;
        let session = guard.as_ref().ok_or(CoreError::NoActiveSession)?;
        Ok(session.scope.clone())
    }

    /// Acquisition pipeline of the signed-in user.
    pub fn pipeline(&self) -> Result<SharedPipeline<R, S>, CoreError> {
        let guard = self.read_session()?;
        let session = guard.as_ref().ok_or(CoreError::NoActiveSession)?;
        Ok(session.pipeline.clone())
    }

    // ── Views ───────────────────────────────────────────────

    /// Home feed of the signed-in user, read fresh from the store.
    pub fn home_data(&self) -> Result<HomeData, CoreError> {
        let scope = self.active_scope()?;
        home::home_data(&*self.store, &scope)
    }

    pub fn document_detail(&self, id: &str) -> Result<DocumentRecord, CoreError> {
        let scope = self.active_scope()?;
        home::document_detail(&*self.store, &scope, id)
    }

    fn read_session(
        &self,
    ) -> Result<RwLockReadGuard<'_, Option<WalletSession<R, S>>>, CoreError> {
        self.session.read().map_err(|_| CoreError::LockPoisoned)
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No user signed in")]
    NoActiveSession,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Registry client error: {0}")]
    Resolver(#[from] ResolverError),
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
