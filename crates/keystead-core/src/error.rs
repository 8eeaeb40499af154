//! Error taxonomy shared by the membership and secret engines

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by core operations.
///
/// The core never recovers from these locally; each one is handed back to the
/// caller, which decides how to present it.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced user, project, membership or secret does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// The acting principal lacks the required role or capability
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation would violate an invariant
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A stored secret failed its integrity check during projection
    #[error("Invalid secret {id}: {reason}")]
    InvalidSecret { id: Uuid, reason: String },

    /// A collaborator store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse classification of [`Error`], for callers mapping errors onto a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    InvalidSecret,
    Store,
}

impl Error {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    pub fn invalid_secret(id: Uuid, reason: impl Into<String>) -> Self {
        Self::InvalidSecret {
            id,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InvalidSecret { .. } => ErrorKind::InvalidSecret,
            Self::Store(_) => ErrorKind::Store,
        }
    }
}

impl ErrorKind {
    /// Suggested HTTP status for a transport layer. The core itself never uses it.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Forbidden => 403,
            ErrorKind::InvalidState => 409,
            ErrorKind::InvalidSecret => 422,
            ErrorKind::Store => 500,
        }
    }
}

/// Failure reported by a collaborator store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not complete the request
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A stored row could not be decoded
    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

/// Failure reported by the capability oracle while answering a question
#[derive(Debug, Clone, Error)]
#[error("Capability lookup failed: {0}")]
pub struct OracleError(pub String);

pub type Result<T, E = Error> = std::result::Result<T, E>;
