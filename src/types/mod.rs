//! Core ledger types
//!
//! Fundamental type definitions: hashes, object identifiers, asset
//! amounts and public keys. Everything here is consensus-critical and
//! serde-serializable.

pub mod amount;
pub mod hash;
pub mod keys;
pub mod object_id;

pub use amount::AssetAmount;
pub use hash::{blake3_hash, Hash, Hashable};
pub use keys::PublicKey;
pub use object_id::{
    AccountId, AssetId, BalanceId, ChequeId, CommitteeMemberId, FundId, GlobalPropertiesId,
    ObjectId, ProposalId, SettingsId, WitnessId, CORE_ASSET, SPACE_IMPLEMENTATION, SPACE_PROTOCOL,
};

/// Chain timestamp, seconds since the unix epoch
pub type Timestamp = u64;
