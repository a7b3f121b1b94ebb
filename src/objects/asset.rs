//! Asset and balance objects
//!
//! An asset is identified by id and precision; a balance binds
//! `(account, asset)` to a signed amount. Balance amounts for circulating
//! assets never go negative - `db::Database::debit` enforces this as an
//! evaluation precondition. Total supply changes only through explicitly
//! defined issuance/burn paths (genesis issuance here; fees accumulate
//! into the asset's fee pool without changing supply).

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, AssetId, BalanceId};

use super::DbObject;

/// Asset record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    /// Ticker symbol, unique chain-wide (secondary key)
    pub symbol: String,
    /// Number of decimal digits in one full unit
    pub precision: u8,
    pub issuer: AccountId,
    pub current_supply: i64,
    pub max_supply: i64,
    /// Fees collected in this asset, awaiting governance withdrawal
    pub accumulated_fees: i64,
}

impl DbObject for Asset {
    const SPACE_ID: u8 = AssetId::SPACE_ID;
    const TYPE_ID: u8 = AssetId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }

    fn secondary_key(&self) -> Option<Vec<u8>> {
        Some(self.symbol.as_bytes().to_vec())
    }
}

/// Balance of one account in one asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub id: BalanceId,
    pub owner: AccountId,
    pub asset_id: AssetId,
    pub balance: i64,
}

impl Balance {
    /// Secondary key bytes for an (owner, asset) pair
    pub fn key_for(owner: AccountId, asset_id: AssetId) -> Vec<u8> {
        let mut key = Vec::with_capacity(16);
        key.extend_from_slice(&owner.0.to_le_bytes());
        key.extend_from_slice(&asset_id.0.to_le_bytes());
        key
    }
}

impl DbObject for Balance {
    const SPACE_ID: u8 = BalanceId::SPACE_ID;
    const TYPE_ID: u8 = BalanceId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }

    fn secondary_key(&self) -> Option<Vec<u8>> {
        Some(Self::key_for(self.owner, self.asset_id))
    }
}
