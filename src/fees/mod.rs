//! Fee schedule
//!
//! Deterministic per-operation fee computation. The active schedule
//! lives inside the global-properties singleton and is updated only by
//! committee governance; evaluators never read fee constants from
//! anywhere else.
//!
//! # Design Principles
//!
//! 1. **Determinism**: same operation, same schedule, same fee
//! 2. **Purity**: no state access; the caller passes the schedule
//! 3. **Overflow safety**: u128 internally for multiplicative terms

use serde::{Deserialize, Serialize};

use crate::operations::Operation;

/// Fee parameters for every operation kind, in core-asset smallest units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub transfer_fee: u64,
    pub account_create_fee: u64,
    pub account_update_fee: u64,
    /// One-time charge for upgrading to lifetime membership
    pub account_upgrade_fee: u64,
    /// Flat component of cheque creation
    pub cheque_create_fee: u64,
    /// Added per payee slot on cheque creation
    pub cheque_per_payee_fee: u64,
    pub cheque_use_fee: u64,
    pub fund_create_fee: u64,
    pub fund_deposit_fee: u64,
    pub witness_create_fee: u64,
    pub settings_update_fee: u64,
    pub committee_params_update_fee: u64,
    pub proposal_create_fee: u64,
    pub proposal_update_fee: u64,
    pub proposal_delete_fee: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            transfer_fee: 10,
            account_create_fee: 100,
            account_update_fee: 20,
            account_upgrade_fee: 10_000,
            cheque_create_fee: 20,
            cheque_per_payee_fee: 5,
            cheque_use_fee: 0,
            fund_create_fee: 100,
            fund_deposit_fee: 10,
            witness_create_fee: 5_000,
            settings_update_fee: 0,
            committee_params_update_fee: 0,
            proposal_create_fee: 50,
            proposal_update_fee: 10,
            proposal_delete_fee: 0,
        }
    }
}

impl FeeSchedule {
    /// Minimum fee required for `op` under this schedule
    pub fn required_fee(&self, op: &Operation) -> u64 {
        match op {
            Operation::Transfer(_) => self.transfer_fee,
            Operation::AccountCreate(_) => self.account_create_fee,
            Operation::AccountUpdate(_) => self.account_update_fee,
            Operation::AccountUpgrade(_) => self.account_upgrade_fee,
            Operation::ChequeCreate(o) => {
                let per_payee = self.cheque_per_payee_fee as u128 * o.payee_count as u128;
                (self.cheque_create_fee as u128 + per_payee).min(u64::MAX as u128) as u64
            }
            Operation::ChequeUse(_) => self.cheque_use_fee,
            Operation::FundCreate(_) => self.fund_create_fee,
            Operation::FundDeposit(_) => self.fund_deposit_fee,
            Operation::WitnessCreate(_) => self.witness_create_fee,
            Operation::SettingsUpdate(_) => self.settings_update_fee,
            Operation::CommitteeParamsUpdate(_) => self.committee_params_update_fee,
            Operation::ProposalCreate(_) => self.proposal_create_fee,
            Operation::ProposalUpdate(_) => self.proposal_update_fee,
            Operation::ProposalDelete(_) => self.proposal_delete_fee,
        }
    }
}
