//! Singleton configuration objects
//!
//! Process-wide configuration mutated only through dedicated governance
//! operations and read by every evaluator. Both singletons live in the
//! object index at well-known ids (global properties at 2.0.0, settings
//! at 2.1.0) so mutations flow through the same undo machinery as any
//! other object.
//!
//! Governance-tunable bounds (maximum authority depth, daily limits,
//! maintenance interval) are chain state with genesis defaults, never
//! compile-time constants.

use serde::{Deserialize, Serialize};

use crate::fees::FeeSchedule;
use crate::types::{GlobalPropertiesId, Hash, SettingsId, Timestamp};

use super::DbObject;

/// Percentage fee expressed in basis points (1/100th of a percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentFee {
    pub basis_points: u16,
}

impl PercentFee {
    pub fn new(basis_points: u16) -> Self {
        Self { basis_points }
    }

    /// Fee owed on `amount`, rounded down
    pub fn fee_on(&self, amount: i64) -> i64 {
        ((amount as i128 * self.basis_points as i128) / 10_000) as i64
    }
}

/// Chain-wide settings singleton (2.1.0)
///
/// Updated exclusively by `SettingsUpdate`, which applies a sparse patch:
/// each optional field of the operation overwrites its stored counterpart
/// only when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub id: SettingsId,
    pub transfer_fees: PercentFee,
    pub cheque_fees: PercentFee,
    /// Per-account daily core-asset transfer cap; 0 disables the cap
    pub edc_transfers_daily_limit: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: SettingsId(0),
            transfer_fees: PercentFee::new(0),
            cheque_fees: PercentFee::new(0),
            edc_transfers_daily_limit: 0,
        }
    }
}

impl DbObject for Settings {
    const SPACE_ID: u8 = SettingsId::SPACE_ID;
    const TYPE_ID: u8 = SettingsId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }
}

/// Governance-controlled chain parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainParameters {
    /// Blocks between maintenance passes
    pub maintenance_interval: u64,
    /// Maximum recursion depth when resolving nested account authorities
    pub max_authority_depth: u8,
    /// Upper bound on proposal lifetime in seconds
    pub maximum_proposal_lifetime: u64,
    pub fee_schedule: FeeSchedule,
}

impl Default for ChainParameters {
    fn default() -> Self {
        Self {
            maintenance_interval: 1,
            max_authority_depth: 2,
            maximum_proposal_lifetime: 60 * 60 * 24 * 28,
            fee_schedule: FeeSchedule::default(),
        }
    }
}

/// Global properties singleton (2.0.0)
///
/// Holds chain parameters plus head-block bookkeeping and the monotonic
/// vote-id allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalProperties {
    pub id: GlobalPropertiesId,
    pub parameters: ChainParameters,
    pub head_block_number: u64,
    pub head_block_id: Hash,
    pub head_block_time: Timestamp,
    /// Next sequential vote id handed to a new witness
    pub next_vote_id: u32,
}

impl GlobalProperties {
    pub fn at_genesis(parameters: ChainParameters, genesis_time: Timestamp) -> Self {
        Self {
            id: GlobalPropertiesId(0),
            parameters,
            head_block_number: 0,
            head_block_id: Hash::ZERO,
            head_block_time: genesis_time,
            next_vote_id: 0,
        }
    }
}

impl DbObject for GlobalProperties {
    const SPACE_ID: u8 = GlobalPropertiesId::SPACE_ID;
    const TYPE_ID: u8 = GlobalPropertiesId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }
}
