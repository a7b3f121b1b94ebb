//! Account objects and authorities
//!
//! An account is a balance-bearing identity protected by two weighted
//! threshold authorities: `owner` (can change everything, including the
//! owner authority itself) and `active` (day-to-day operations). An
//! authority is satisfied when the summed weight of present keys and
//! satisfied nested account authorities reaches its threshold.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, PublicKey};

use super::DbObject;

/// Weighted threshold authority: keys and/or nested accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    /// Minimum summed weight required for satisfaction
    pub weight_threshold: u32,
    /// Nested account entries; each resolves through that account's
    /// own active authority, recursively
    pub account_auths: BTreeMap<AccountId, u16>,
    /// Directly listed keys
    pub key_auths: BTreeMap<PublicKey, u16>,
}

impl Authority {
    /// Authority satisfied by a single key
    pub fn single_key(key: PublicKey) -> Self {
        let mut key_auths = BTreeMap::new();
        key_auths.insert(key, 1);
        Self {
            weight_threshold: 1,
            account_auths: BTreeMap::new(),
            key_auths,
        }
    }

    /// A zero threshold is trivially satisfied
    pub fn is_trivially_satisfied(&self) -> bool {
        self.weight_threshold == 0
    }

    /// Total weight if every entry were satisfied
    pub fn total_weight(&self) -> u64 {
        self.account_auths.values().map(|w| *w as u64).sum::<u64>()
            + self.key_auths.values().map(|w| *w as u64).sum::<u64>()
    }

    /// An authority that can never be satisfied (total weight below
    /// threshold) locks the account; evaluators reject these on update.
    pub fn is_impossible(&self) -> bool {
        self.total_weight() < self.weight_threshold as u64
    }
}

/// Membership tier affecting fees and privileged-operation eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    Basic,
    Annual,
    Lifetime,
}

/// Account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique account name (secondary key)
    pub name: String,
    /// Account that paid for this account's registration
    pub registrar: AccountId,
    pub owner: Authority,
    pub active: Authority,
    pub membership: MembershipStatus,
    /// Accounts this account explicitly trusts
    pub whitelisted_accounts: BTreeSet<AccountId>,
    /// Accounts barred from sending to this account
    pub blacklisted_accounts: BTreeSet<AccountId>,
    /// Core-asset volume transferred during the current day window
    pub transferred_today: i64,
    /// Day index (timestamp / 86400) the counter belongs to
    pub transfer_day: u64,
}

impl Account {
    pub fn is_lifetime_member(&self) -> bool {
        self.membership == MembershipStatus::Lifetime
    }

    pub fn authority_for(&self, level: AuthorityLevel) -> &Authority {
        match level {
            AuthorityLevel::Owner => &self.owner,
            AuthorityLevel::Active => &self.active,
        }
    }
}

/// Privilege level an operation demands from an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityLevel {
    Active,
    Owner,
}

impl DbObject for Account {
    const SPACE_ID: u8 = AccountId::SPACE_ID;
    const TYPE_ID: u8 = AccountId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }

    fn secondary_key(&self) -> Option<Vec<u8>> {
        Some(self.name.as_bytes().to_vec())
    }
}
