//! Hash primitives
//!
//! 32-byte blake3 digests used for transaction ids, block ids and the
//! per-block transaction merkle root. All consensus hashing goes through
//! `blake3_hash` so every node derives identical digests from identical
//! canonical (bincode) encodings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 32-byte hash value
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Zero hash (genesis parent, empty merkle root)
    pub const ZERO: Hash = Hash([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hash arbitrary bytes with blake3
pub fn blake3_hash(data: &[u8]) -> Hash {
    Hash(*blake3::hash(data).as_bytes())
}

/// Types with a canonical consensus digest.
///
/// The digest is blake3 over the bincode encoding. Field order in the
/// struct definition is therefore part of the serialization contract.
pub trait Hashable: Serialize {
    fn digest(&self) -> Hash {
        let bytes = bincode::serialize(self).expect("canonical encoding cannot fail");
        blake3_hash(&bytes)
    }
}
