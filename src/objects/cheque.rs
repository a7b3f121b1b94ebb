//! Cheque objects
//!
//! A cheque is an activation-code-protected, time-windowed payment
//! voucher. The drawer escrows `amount_payee * payee_count` on creation;
//! each claim consumes one payee slot. The aggregate status becomes
//! `Used` exactly when the last slot transitions to used; expiry reverses
//! remaining slots and refunds the drawer.
//!
//! # Invariant
//!
//! `amount_remaining == amount_payee * (slots with status Unused)` holds
//! at all times.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, AssetId, ChequeId, Timestamp};

use super::DbObject;

/// Required length of an activation code
pub const CHEQUE_CODE_LENGTH: usize = 16;

/// Returns true when `code` is a well-formed activation code:
/// exactly 16 alphanumeric ASCII characters.
pub fn is_valid_cheque_code(code: &str) -> bool {
    code.len() == CHEQUE_CODE_LENGTH && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Aggregate cheque status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChequeStatus {
    /// At least one payee slot is still claimable
    New,
    /// Every payee slot has been claimed
    Used,
    /// Expired; unused slots were reversed and refunded
    Undone,
}

/// Status of one payee slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayeeStatus {
    Unused,
    Used,
    Reversed,
}

/// One claimable slot within a cheque
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChequePayee {
    /// Account that claimed the slot, once used
    pub payee: Option<AccountId>,
    pub status: PayeeStatus,
    pub datetime_used: Option<Timestamp>,
}

impl ChequePayee {
    pub fn unused() -> Self {
        Self {
            payee: None,
            status: PayeeStatus::Unused,
            datetime_used: None,
        }
    }
}

/// Cheque record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cheque {
    pub id: ChequeId,
    pub drawer: AccountId,
    /// Activation code, unique among live cheques (secondary key)
    pub code: String,
    pub asset_id: AssetId,
    /// Amount paid out per claimed slot
    pub amount_payee: i64,
    /// Escrowed amount still claimable
    pub amount_remaining: i64,
    pub payees: Vec<ChequePayee>,
    /// Claims are valid within [valid_from, expiration)
    pub valid_from: Timestamp,
    pub expiration: Timestamp,
    pub status: ChequeStatus,
    /// Stamped once, when the last slot is consumed
    pub datetime_used: Option<Timestamp>,
}

impl Cheque {
    pub fn unused_slot_count(&self) -> usize {
        self.payees
            .iter()
            .filter(|p| p.status == PayeeStatus::Unused)
            .count()
    }

    /// Index of the first unused payee slot, if any
    pub fn first_unused_slot(&self) -> Option<usize> {
        self.payees.iter().position(|p| p.status == PayeeStatus::Unused)
    }

    /// True when `now` falls inside the claim window
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        now >= self.valid_from && now < self.expiration
    }
}

impl DbObject for Cheque {
    const SPACE_ID: u8 = ChequeId::SPACE_ID;
    const TYPE_ID: u8 = ChequeId::TYPE_ID;

    fn instance(&self) -> u64 {
        self.id.0
    }

    fn secondary_key(&self) -> Option<Vec<u8>> {
        Some(self.code.as_bytes().to_vec())
    }
}
