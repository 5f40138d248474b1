//! Cryptographic primitives for the VitalChain ledger.
//!
//! Provides domain-separated BLAKE3 hashing over canonical JSON bytes.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
