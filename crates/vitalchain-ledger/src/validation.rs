use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::{Block, GENESIS_PREVIOUS_DIGEST};
use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Which invariant a block broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityFault {
    /// `previous_digest` is not the predecessor's digest (or, for genesis,
    /// not the sentinel).
    LinkMismatch,
    /// Stored digest differs from the digest of the block's own fields.
    DigestMismatch,
    /// Stored position differs from the block's offset in the sequence.
    PositionMismatch,
}

impl fmt::Display for IntegrityFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkMismatch => write!(f, "link mismatch"),
            Self::DigestMismatch => write!(f, "digest mismatch"),
            Self::PositionMismatch => write!(f, "position mismatch"),
        }
    }
}

/// Outcome of a full-chain audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    /// First failing block, in position order.
    Invalid { position: u64, fault: IntegrityFault },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// `Valid` becomes `Ok(())`; `Invalid` becomes
    /// [`LedgerError::IntegrityViolation`].
    pub fn into_result(self) -> Result<(), LedgerError> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid { position, fault } => {
                Err(LedgerError::IntegrityViolation { position, fault })
            }
        }
    }
}

/// Chain integrity validator.
///
/// Walks positions in order and stops at the first failure. For each block
/// it checks, in this order: position equals offset, previous digest links
/// to the predecessor (sentinel for genesis), stored digest equals the
/// recomputed one. Passing the whole walk is the only definition of a valid
/// ledger.
pub struct Validator;

impl Validator {
    /// Audit a live ledger against a consistent snapshot of its blocks.
    pub fn verify<R: LedgerReader>(reader: &R) -> Verdict {
        Self::verify_blocks(&reader.all())
    }

    /// Audit an ordered block sequence, e.g. a chain exported as JSON.
    ///
    /// An empty sequence has no genesis block and is reported invalid at
    /// position 0.
    pub fn verify_blocks(blocks: &[Block]) -> Verdict {
        if blocks.is_empty() {
            warn!("chain has no genesis block");
            return Verdict::Invalid {
                position: 0,
                fault: IntegrityFault::PositionMismatch,
            };
        }

        for (index, block) in blocks.iter().enumerate() {
            let expected_position = index as u64;
            if let Some(fault) = check_block(block, expected_position, blocks) {
                warn!(position = expected_position, %fault, "chain verification failed");
                return Verdict::Invalid {
                    position: expected_position,
                    fault,
                };
            }
        }

        Verdict::Valid
    }
}

fn check_block(
    block: &Block,
    expected_position: u64,
    blocks: &[Block],
) -> Option<IntegrityFault> {
    if block.position != expected_position {
        return Some(IntegrityFault::PositionMismatch);
    }

    let expected_prev = match expected_position {
        0 => GENESIS_PREVIOUS_DIGEST,
        n => blocks[(n - 1) as usize].digest,
    };
    if block.previous_digest != expected_prev {
        return Some(IntegrityFault::LinkMismatch);
    }

    // A payload that no longer encodes can only be the product of tampering.
    match block.recompute_digest() {
        Ok(digest) if digest == block.digest => None,
        _ => Some(IntegrityFault::DigestMismatch),
    }
}
