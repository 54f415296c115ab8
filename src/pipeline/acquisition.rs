//! Document acquisition state machine.
//!
//! ```text
//! Idle → Scanning → Resolving → Reviewing → Committing → Done
//!                       ↓           ↓             ↓
//!                 ResolveFailed    Idle      CommitFailed
//!                               (cancel)
//! ```
//!
//! `Done`, `ResolveFailed` and `CommitFailed` are at rest: they report how
//! the last attempt ended and accept a new capture like `Idle`. Nothing is
//! carried over between attempts. A record is only stored after an explicit
//! `confirm()`, and only a successfully resolved record can be confirmed.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::capture::ScannedPayload;
use super::normalize::normalize_at;
use super::resolver::DocumentResolver;
use super::AcquisitionError;
use crate::models::{AcquisitionPhase, DocumentRecord, UserScope};
use crate::storage::DocumentStore;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,
    Scanning,
    Resolving,
    /// Normalized record awaiting the user's decision.
    Reviewing(DocumentRecord),
    /// Confirmed record being appended to the store.
    Committing(DocumentRecord),
    /// Record that was stored by the last attempt.
    Done(DocumentRecord),
    ResolveFailed(String),
    CommitFailed(String),
}

impl AcquisitionState {
    pub fn phase(&self) -> AcquisitionPhase {
        match self {
            Self::Idle => AcquisitionPhase::Idle,
            Self::Scanning => AcquisitionPhase::Scanning,
            Self::Resolving => AcquisitionPhase::Resolving,
            Self::Reviewing(_) => AcquisitionPhase::Reviewing,
            Self::Committing(_) => AcquisitionPhase::Committing,
            Self::Done(_) => AcquisitionPhase::Done,
            Self::ResolveFailed(_) => AcquisitionPhase::ResolveFailed,
            Self::CommitFailed(_) => AcquisitionPhase::CommitFailed,
        }
    }
}

/// Result of handing a payload to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Another acquisition was in flight; nothing changed.
    Ignored { phase: AcquisitionPhase },
    /// Payload resolved; the record is waiting for confirmation.
    Reviewing(DocumentRecord),
}

// ═══════════════════════════════════════════════════════════
// AcquisitionPipeline
// ═══════════════════════════════════════════════════════════

/// Drives one acquisition at a time for a single user scope.
///
/// The state lock is never held across the resolver await, so a second
/// capture arriving mid-flight sees the in-flight phase and is ignored.
pub struct AcquisitionPipeline<R, S> {
    resolver: R,
    store: S,
    scope: UserScope,
    state: Mutex<AcquisitionState>,
}

impl<R: DocumentResolver, S: DocumentStore> AcquisitionPipeline<R, S> {
    pub fn new(resolver: R, store: S, scope: UserScope) -> Self {
        Self {
            resolver,
            store,
            scope,
            state: Mutex::new(AcquisitionState::Idle),
        }
    }

    pub fn scope(&self) -> &UserScope {
        &self.scope
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> Result<AcquisitionState, AcquisitionError> {
        Ok(self.lock_state()?.clone())
    }

    pub fn phase(&self) -> Result<AcquisitionPhase, AcquisitionError> {
        Ok(self.lock_state()?.phase())
    }

    /// Start an acquisition from a captured payload.
    ///
    /// Ignored unless the pipeline is at rest. Otherwise resolves the
    /// payload, normalizes the response and parks it in `Reviewing`.
    pub async fn capture(
        &self,
        payload: ScannedPayload,
    ) -> Result<CaptureOutcome, AcquisitionError> {
        {
            let mut state = self.lock_state()?;
            let phase = state.phase();
            if !phase.is_at_rest() {
                tracing::debug!(
                    phase = %phase,
                    source = %payload.source(),
                    "Capture ignored, acquisition already in flight"
                );
                return Ok(CaptureOutcome::Ignored { phase });
            }
            *state = AcquisitionState::Scanning;
        }

        let mut in_flight = InFlight::arm(&self.state);

        tracing::info!(scope = %self.scope, source = %payload.source(), "Payload captured");
        self.set_state(AcquisitionState::Resolving)?;

        let resolved = self.resolver.resolve(&payload).await;
        in_flight.disarm();

        match resolved {
            Ok(raw) => {
                let record = normalize_at(raw, Utc::now());
                tracing::info!(
                    scope = %self.scope,
                    document_id = %record.id,
                    generated_id = record.has_generated_id(),
                    "Document resolved, awaiting review"
                );
                self.set_state(AcquisitionState::Reviewing(record.clone()))?;
                Ok(CaptureOutcome::Reviewing(record))
            }
            Err(e) => {
                tracing::warn!(scope = %self.scope, error = %e, "Document lookup failed");
                self.set_state(AcquisitionState::ResolveFailed(e.to_string()))?;
                Err(AcquisitionError::FetchFailed(e))
            }
        }
    }

    /// User accepted the reviewed record: store it exactly as shown.
    pub fn confirm(&self) -> Result<DocumentRecord, AcquisitionError> {
        let record = {
            let mut state = self.lock_state()?;
            let AcquisitionState::Reviewing(record) = &*state else {
                return Err(AcquisitionError::InvalidTransition {
                    action: "confirm",
                    phase: state.phase(),
                });
            };
            let record = record.clone();
            *state = AcquisitionState::Committing(record.clone());
            record
        };

        match self.store.append(&self.scope, &record) {
            Ok(()) => {
                tracing::info!(scope = %self.scope, document_id = %record.id, "Document committed");
                self.set_state(AcquisitionState::Done(record.clone()))?;
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    scope = %self.scope,
                    document_id = %record.id,
                    error = %e,
                    "Document commit failed"
                );
                self.set_state(AcquisitionState::CommitFailed(e.to_string()))?;
                Err(AcquisitionError::PersistFailure(e))
            }
        }
    }

    /// User rejected the reviewed record. Nothing is stored.
    pub fn cancel(&self) -> Result<(), AcquisitionError> {
        let mut state = self.lock_state()?;
        match state.phase() {
            AcquisitionPhase::Reviewing => {
                *state = AcquisitionState::Idle;
                tracing::info!(scope = %self.scope, "Review cancelled");
                Ok(())
            }
            phase => Err(AcquisitionError::InvalidTransition {
                action: "cancel",
                phase,
            }),
        }
    }

    // ── Internal ────────────────────────────────────────────

    fn lock_state(&self) -> Result<MutexGuard<'_, AcquisitionState>, AcquisitionError> {
        self.state.lock().map_err(|_| AcquisitionError::LockPoisoned)
    }

    fn set_state(&self, next: AcquisitionState) -> Result<(), AcquisitionError> {
        let mut state = self.lock_state()?;
        tracing::debug!(from = %state.phase(), to = %next.phase(), "Acquisition transition");
        *state = next;
        Ok(())
    }
}

impl<R, S> std::fmt::Debug for AcquisitionPipeline<R, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = self.state.lock().map(|s| s.phase()).ok();
        f.debug_struct("AcquisitionPipeline")
            .field("scope", &self.scope)
            .field("phase", &phase)
            .finish()
    }
}

/// Returns the pipeline to `Idle` if a capture future is dropped while the
/// lookup is still pending, so an abandoned scan cannot wedge the pipeline.
struct InFlight<'a> {
    state: &'a Mutex<AcquisitionState>,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn arm(state: &'a Mutex<AcquisitionState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            if matches!(*state, AcquisitionState::Scanning | AcquisitionState::Resolving) {
                tracing::debug!("Capture abandoned mid-lookup, back to idle");
                *state = AcquisitionState::Idle;
            }
        }
    }
}
