//! Asset amounts
//!
//! An `AssetAmount` binds a signed integer quantity to an asset id.
//! Quantities are expressed in the asset's smallest unit; precision is a
//! display concern carried by the asset object, not by amounts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::object_id::{AssetId, CORE_ASSET};

/// Signed quantity of a specific asset
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub amount: i64,
    pub asset_id: AssetId,
}

impl AssetAmount {
    pub fn new(amount: i64, asset_id: AssetId) -> Self {
        Self { amount, asset_id }
    }

    /// Amount of the core asset (1.3.0)
    pub fn core(amount: i64) -> Self {
        Self::new(amount, CORE_ASSET)
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }
}

impl fmt::Debug for AssetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset_id)
    }
}

impl fmt::Display for AssetAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset_id)
    }
}
