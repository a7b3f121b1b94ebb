//! Proposal objects
//!
//! A proposal holds a pending multi-signature transaction plus the sets
//! of required and collected approvals. It becomes executable when the
//! available approvals are a superset of the required approvals, subject
//! to an optional review-period delay, and is removed upon execution or
//! expiration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::operations::Operation;
use crate::types::{AccountId, ProposalId, PublicKey, Timestamp};

use super::DbObject;

/// Proposal record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: AccountId,
    /// Operations executed once the proposal is fully approved
    pub proposed_ops: Vec<Operation>,
    pub expiration: Timestamp,
    /// When set, the proposal never executes before
    /// `expiration - review_period_seconds`, even if fully approved
    pub review_period_seconds: Option<u64>,
    pub required_active_approvals: BTreeSet<AccountId>,
    pub required_owner_approvals: BTreeSet<AccountId>,
    pub available_active_approvals: BTreeSet<AccountId>,
    pub available_owner_approvals: BTreeSet<AccountId>,
    pub available_key_approvals: BTreeSet<PublicKey>,
}

impl Proposal {
    /// True when every required approval has been collected
    pub fn is_authorized(&self) -> bool {
        self.required_active_approvals
            .is_subset(&self.available_active_approvals)
            && self
                .required_owner_approvals
                .is_subset(&self.available_owner_approvals)
    }

    /// True when the review period (if any) still blocks execution
    pub fn in_review_period(&self, now: Timestamp) -> bool {
        match self.review_period_seconds {
            Some(secs) => now + secs < self.expiration,
            None => false,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expiration
    }
}

impl DbObject for Proposal {
    const SPACE_ID: u8 = ProposalId::SPACE_ID;
    const TYPE_ID: u8 = ProposalId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }
}
