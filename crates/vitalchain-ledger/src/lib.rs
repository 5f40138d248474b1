//! Append-only, hash-linked record ledger for VitalChain.
//!
//! This crate is the heart of VitalChain. It provides:
//! - [`Block`]: an immutable record whose digest binds its position, creation
//!   time, payload, and predecessor digest
//! - [`LedgerWriter`] / [`LedgerReader`] trait boundaries
//! - [`Ledger`]: the in-memory, single-writer implementation
//! - [`Validator`]: fail-fast integrity audit of a whole chain
//!
//! The ledger lives only as long as the process that owns it; nothing is
//! persisted.

pub mod block;
pub mod error;
pub mod ledger;
pub mod traits;
pub mod validation;

pub use block::{Block, GENESIS_PREVIOUS_DIGEST};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{IntegrityFault, Validator, Verdict};

#[cfg(test)]
mod tests {
    use vitalchain_types::{DiagnosticRecord, Payload};

    use super::*;

    #[test]
    fn two_diagnostic_records_form_a_valid_chain() {
        let ledger = Ledger::new();

        ledger
            .append(Payload::from(DiagnosticRecord::new("A", "x", 0.8)))
            .unwrap();
        ledger
            .append(Payload::from(DiagnosticRecord::new("B", "y", 0.3)))
            .unwrap();

        assert_eq!(Validator::verify(&ledger), Verdict::Valid);
        assert_eq!(ledger.len(), 3);
        assert_eq!(
            ledger.block_at(2).unwrap().previous_digest(),
            ledger.block_at(1).unwrap().digest()
        );
    }
}
