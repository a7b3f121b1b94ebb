//! Structural validation
//!
//! Checks that a transaction or block is well-formed before evaluation
//! touches any state. Validation never mutates; execution (the
//! evaluator pipeline) happens only after these checks pass.

pub mod errors;

pub use errors::{BlockApplyError, BlockApplyResult, OpError, OpResult};

use crate::block::{SignedBlock, SignedTransaction};
use crate::types::{Hash, Timestamp};

/// Structural transaction checks that need no object lookups.
pub fn validate_transaction_structure(
    tx: &SignedTransaction,
    head_time: Timestamp,
) -> OpResult<()> {
    if tx.operations.is_empty() {
        return Err(OpError::EmptyTransaction);
    }
    if tx.expiration <= head_time {
        return Err(OpError::TransactionExpired {
            expiration: tx.expiration,
            now: head_time,
        });
    }
    Ok(())
}

/// Structural block checks against the current head.
///
/// Verifies height continuity, previous-id linkage, timestamp
/// monotonicity and the declared transaction merkle root.
pub fn validate_block_structure(
    block: &SignedBlock,
    head_number: u64,
    head_id: Hash,
    head_time: Timestamp,
) -> BlockApplyResult<()> {
    let header = &block.header;

    if header.block_num != head_number + 1 {
        return Err(BlockApplyError::HeightMismatch {
            expected: head_number + 1,
            actual: header.block_num,
        });
    }
    if header.previous != head_id {
        return Err(BlockApplyError::PreviousIdMismatch {
            expected: head_id,
            actual: header.previous,
        });
    }
    if header.timestamp <= head_time {
        return Err(BlockApplyError::TimestampBeforeHead {
            timestamp: header.timestamp,
            head: head_time,
        });
    }

    let computed = crate::block::transaction_merkle_root(&block.transactions);
    if header.merkle_root != computed {
        return Err(BlockApplyError::InvalidMerkleRoot {
            declared: header.merkle_root,
            computed,
        });
    }

    Ok(())
}
