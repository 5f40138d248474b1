use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info};
use vitalchain_types::Payload;

use crate::block::{Block, GENESIS_PREVIOUS_DIGEST};
use crate::error::LedgerError;
use crate::traits::{LedgerReader, LedgerWriter};
use crate::validation::{Validator, Verdict};

/// In-memory, hash-linked ledger.
///
/// Appends are serialized behind the write half of an `RwLock`: reading the
/// tail, building the block, and pushing it happen under one guard, so two
/// appends can never link to the same tail. Reads share the lock and only
/// ever see fully linked blocks.
///
/// Share it as `Arc<Ledger>`; there is no process-wide instance.
pub struct Ledger {
    inner: RwLock<LedgerState>,
}

struct LedgerState {
    blocks: Vec<Block>,
}

impl Ledger {
    /// Create a ledger holding only a genesis block with the plain marker
    /// payload.
    pub fn new() -> Self {
        Self::seeded(Block::genesis(Utc::now(), None))
    }

    /// Create a ledger whose genesis block carries `payload`.
    pub fn with_genesis(payload: Payload) -> Result<Self, LedgerError> {
        let genesis = Block::new(0, Utc::now(), payload, GENESIS_PREVIOUS_DIGEST)?;
        Ok(Self::seeded(genesis))
    }

    fn seeded(genesis: Block) -> Self {
        info!(digest = %genesis.digest().short_hex(), "ledger created");
        Self {
            inner: RwLock::new(LedgerState {
                blocks: vec![genesis],
            }),
        }
    }

    /// Run the full-chain audit against this ledger.
    pub fn verify(&self) -> Verdict {
        Validator::verify(self)
    }

    // A block is pushed only once fully built, so a writer that panicked
    // cannot have left a half-linked block behind.
    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for Ledger {
    fn append(&self, payload: Payload) -> Result<Block, LedgerError> {
        let mut state = self.write_state();

        let (position, previous_digest) = match state.blocks.last() {
            Some(tail) => (tail.position() + 1, tail.digest()),
            None => (0, GENESIS_PREVIOUS_DIGEST),
        };

        let block = Block::new(position, Utc::now(), payload, previous_digest)?;
        state.blocks.push(block.clone());

        debug!(position, digest = %block.digest().short_hex(), "block appended");
        Ok(block)
    }
}

impl LedgerReader for Ledger {
    fn len(&self) -> u64 {
        self.read_state().blocks.len() as u64
    }

    fn block_at(&self, position: u64) -> Result<Block, LedgerError> {
        let state = self.read_state();
        usize::try_from(position)
            .ok()
            .and_then(|index| state.blocks.get(index))
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                position,
                length: state.blocks.len() as u64,
            })
    }

    fn all(&self) -> Vec<Block> {
        self.read_state().blocks.clone()
    }

    fn head(&self) -> Option<Block> {
        self.read_state().blocks.last().cloned()
    }
}
