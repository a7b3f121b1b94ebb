//! Witness and committee member objects
//!
//! Account-linked governance records. Witnesses produce blocks and carry
//! a sequentially assigned vote id scoped to the witness pool; committee
//! members authorize parameter and settings updates.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, CommitteeMemberId, PublicKey, WitnessId};

use super::DbObject;

/// Witness record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Witness {
    pub id: WitnessId,
    pub witness_account: AccountId,
    /// Key blocks signed by this witness are attributed to
    pub signing_key: PublicKey,
    pub url: String,
    /// Sequential vote id allocated from global properties
    pub vote_id: u32,
    pub total_missed: u64,
}

impl DbObject for Witness {
    const SPACE_ID: u8 = WitnessId::SPACE_ID;
    const TYPE_ID: u8 = WitnessId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }
}

/// Committee member record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeMember {
    pub id: CommitteeMemberId,
    pub committee_member_account: AccountId,
    pub url: String,
}

impl DbObject for CommitteeMember {
    const SPACE_ID: u8 = CommitteeMemberId::SPACE_ID;
    const TYPE_ID: u8 = CommitteeMemberId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }
}
