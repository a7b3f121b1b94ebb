//! Blocks and signed transactions
//!
//! Wire structures consumed by the database facade. A signed transaction
//! is an ordered list of operations plus the public keys whose
//! signatures the caller verified; a block commits to its transactions
//! through a blake3 merkle root.
//!
//! | header field  | commits to                                        |
//! |---------------|---------------------------------------------------|
//! | `previous`    | id (digest) of the parent block                   |
//! | `merkle_root` | the complete, ordered set of transactions         |
//! | `block_num`   | height, parent height + 1                         |

use serde::{Deserialize, Serialize};

use crate::operations::Operation;
use crate::types::{blake3_hash, Hash, Hashable, PublicKey, Timestamp, WitnessId};

/// Ordered operations plus the keys that signed them.
///
/// Signature-byte verification is wallet-side; the core consumes the
/// verified key set (`signed_by`) for authority checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub operations: Vec<Operation>,
    /// Transaction is invalid once head time reaches this
    pub expiration: Timestamp,
    pub signed_by: Vec<PublicKey>,
}

impl SignedTransaction {
    pub fn new(operations: Vec<Operation>, expiration: Timestamp, signed_by: Vec<PublicKey>) -> Self {
        Self {
            operations,
            expiration,
            signed_by,
        }
    }

    /// Transaction id: digest over operations and expiration, excluding
    /// signatures, so the id is stable across signature sets.
    pub fn id(&self) -> Hash {
        #[derive(Serialize)]
        struct SigningPayload<'a> {
            operations: &'a [Operation],
            expiration: Timestamp,
        }
        impl Hashable for SigningPayload<'_> {}

        SigningPayload {
            operations: &self.operations,
            expiration: self.expiration,
        }
        .digest()
    }
}

/// Block header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub previous: Hash,
    pub timestamp: Timestamp,
    pub block_num: u64,
    pub merkle_root: Hash,
    /// Witness that produced the block
    pub witness: WitnessId,
}

impl Hashable for BlockHeader {}

/// A block as handed to `Database::apply_block`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBlock {
    pub header: BlockHeader,
    pub transactions: Vec<SignedTransaction>,
}

impl SignedBlock {
    /// Block id is the header digest
    pub fn id(&self) -> Hash {
        self.header.digest()
    }
}

/// Merkle root over transaction ids.
///
/// Pairwise blake3 over concatenated child digests; an odd node is
/// paired with itself. The empty transaction list hashes to zero.
pub fn transaction_merkle_root(transactions: &[SignedTransaction]) -> Hash {
    if transactions.is_empty() {
        return Hash::ZERO;
    }

    let mut layer: Vec<Hash> = transactions.iter().map(|tx| tx.id()).collect();
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        for pair in layer.chunks(2) {
            let left = pair[0];
            let right = if pair.len() == 2 { pair[1] } else { pair[0] };
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(left.as_bytes());
            buf[32..].copy_from_slice(right.as_bytes());
            next.push(blake3_hash(&buf));
        }
        layer = next;
    }
    layer[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(expiration: Timestamp) -> SignedTransaction {
        SignedTransaction::new(vec![], expiration, vec![])
    }

    #[test]
    fn test_merkle_root_empty_is_zero() {
        assert_eq!(transaction_merkle_root(&[]), Hash::ZERO);
    }

    #[test]
    fn test_merkle_root_commits_to_order() {
        let a = tx(1);
        let b = tx(2);
        let ab = transaction_merkle_root(&[a.clone(), b.clone()]);
        let ba = transaction_merkle_root(&[b, a]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_merkle_root_single_tx_is_its_id() {
        let a = tx(7);
        assert_eq!(transaction_merkle_root(&[a.clone()]), a.id());
    }

    #[test]
    fn test_tx_id_ignores_signatures() {
        let mut a = tx(1);
        let id = a.id();
        a.signed_by.push(PublicKey::new([3u8; 32]));
        assert_eq!(a.id(), id);
    }
}
