//! Foundation types for the VitalChain ledger.
//!
//! Every other VitalChain crate depends on `vitalchain-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — 32-byte block digest, rendered as lowercase hex
//! - [`Payload`] — what a block attests to: the genesis marker or a diagnostic record
//! - [`DiagnosticRecord`] — anonymized subject, classification label, and confidence
//! - [`Confidence`] — a finite model confidence score

pub mod digest;
pub mod error;
pub mod payload;

pub use digest::Digest;
pub use error::TypeError;
pub use payload::{Confidence, DiagnosticRecord, Payload};
