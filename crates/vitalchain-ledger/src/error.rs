use crate::validation::IntegrityFault;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The payload has no canonical encoding; nothing was appended.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("no block at position {position} (ledger length {length})")]
    NotFound { position: u64, length: u64 },

    /// The chain failed verification. Never retried or auto-corrected.
    #[error("integrity violation at position {position}: {fault}")]
    IntegrityViolation { position: u64, fault: IntegrityFault },
}
