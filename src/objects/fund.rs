//! Fund objects
//!
//! A fund holds time-locked deposits. Depositors lock an amount for a
//! period; the maintenance pass returns matured principal to the
//! depositor. Funds can be disabled by their owner, which blocks new
//! deposits but never existing payouts.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, AssetId, FundId, Timestamp};

use super::DbObject;

/// One time-locked deposit inside a fund
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundDeposit {
    pub depositor: AccountId,
    pub amount: i64,
    /// Maintenance returns the principal once head time reaches this
    pub matures_at: Timestamp,
}

/// Fund record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fund {
    pub id: FundId,
    /// Unique fund name (secondary key)
    pub name: String,
    pub owner: AccountId,
    pub asset_id: AssetId,
    /// Sum of all unmatured deposits
    pub balance: i64,
    pub deposits: Vec<FundDeposit>,
    pub enabled: bool,
}

impl DbObject for Fund {
    const SPACE_ID: u8 = FundId::SPACE_ID;
    const TYPE_ID: u8 = FundId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }

    fn secondary_key(&self) -> Option<Vec<u8>> {
        Some(self.name.as_bytes().to_vec())
    }
}
