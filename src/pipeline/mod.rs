pub mod capture;
pub mod resolver;
pub mod normalize;
pub mod acquisition; // Scan → resolve → review → commit state machine

pub use capture::*;
pub use resolver::*;
pub use normalize::*;
pub use acquisition::*;

use thiserror::Error;

use crate::models::AcquisitionPhase;
use crate::storage::StoreError;

/// Failures talking to the document registry. All of them surface to the
/// user as a failed lookup.
#[derive(Error, Debug, Clone)]
pub enum ResolverError {
    #[error("Registry is not reachable at {0}")]
    Connection(String),

    #[error("Registry request timed out after {0}s")]
    Timeout(u64),

    #[error("Registry returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed registry response: {0}")]
    MalformedResponse(String),

    #[error("Registry rejected the lookup: {0}")]
    Rejected(String),

    #[error("Invalid registry URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Scanned payload is empty")]
    EmptyPayload,

    #[error("Could not fetch document data: {0}")]
    FetchFailed(#[from] ResolverError),

    #[error("Could not save document: {0}")]
    PersistFailure(#[from] StoreError),

    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: AcquisitionPhase,
    },

    #[error("Internal lock error")]
    LockPoisoned,
}
