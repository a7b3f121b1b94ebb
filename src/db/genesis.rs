//! Genesis configuration
//!
//! Initial chain state: the core asset, seed accounts and their
//! balances, committee membership and the first witnesses. Set once at
//! database construction; everything here is ordinary chain state
//! afterwards and changes only through governance operations.

use serde::{Deserialize, Serialize};

use crate::objects::settings::{ChainParameters, Settings};
use crate::types::{PublicKey, Timestamp};

/// One account seeded at genesis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub name: String,
    /// Single key controlling both owner and active authority
    pub key: PublicKey,
    pub initial_balance: i64,
    pub is_committee_member: bool,
    pub is_lifetime_member: bool,
    /// Register this account as a block-producing witness
    pub is_witness: bool,
}

impl GenesisAccount {
    pub fn new(name: &str, key: PublicKey, initial_balance: i64) -> Self {
        Self {
            name: name.to_string(),
            key,
            initial_balance,
            is_committee_member: false,
            is_lifetime_member: false,
            is_witness: false,
        }
    }
}

/// Complete genesis state description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub genesis_time: Timestamp,
    pub core_asset_symbol: String,
    pub core_asset_precision: u8,
    pub core_asset_max_supply: i64,
    pub parameters: ChainParameters,
    pub settings: Settings,
    pub accounts: Vec<GenesisAccount>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            genesis_time: 0,
            core_asset_symbol: "EDC".to_string(),
            core_asset_precision: 3,
            core_asset_max_supply: 1_000_000_000_000,
            parameters: ChainParameters::default(),
            settings: Settings::default(),
            accounts: Vec::new(),
        }
    }
}
