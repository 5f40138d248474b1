use vitalchain_types::Payload;

use crate::block::Block;
use crate::error::LedgerError;

/// Write boundary for ledger append operations.
pub trait LedgerWriter: Send + Sync {
    /// Link a new block carrying `payload` onto the current tail.
    ///
    /// Atomic: on error the ledger is unchanged.
    fn append(&self, payload: Payload) -> Result<Block, LedgerError>;
}

/// Read boundary for ledger queries.
///
/// Every method returns owned copies; nothing handed out can reach back into
/// the ledger's storage.
pub trait LedgerReader: Send + Sync {
    /// Number of blocks, genesis included.
    fn len(&self) -> u64;

    /// A ledger always holds its genesis block, so this is `false` for any
    /// ledger built through the normal constructors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn block_at(&self, position: u64) -> Result<Block, LedgerError>;

    /// Snapshot of the full chain in position order.
    fn all(&self) -> Vec<Block>;

    /// The most recently appended block.
    fn head(&self) -> Option<Block>;
}
