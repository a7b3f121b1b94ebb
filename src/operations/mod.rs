//! Operation variants
//!
//! The closed sum type over everything a transaction can do. Each
//! variant carries its fee, variant-specific fields and an `extensions`
//! set for forward-compatible optional fields: unknown extensions
//! round-trip unchanged (opaque tagged payloads), and known-but-absent
//! optional fields never alter stored values (sparse patch, enforced by
//! the evaluators).
//!
//! Dispatch to evaluators is by exhaustive match - adding a variant
//! without wiring an evaluator is a compile error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fees::FeeSchedule;
use crate::objects::account::Authority;
use crate::objects::settings::PercentFee;
use crate::types::{
    AccountId, AssetAmount, AssetId, FundId, ProposalId, PublicKey, Timestamp,
};

/// One forward-compatible extension slot.
///
/// The payload is an encoded value this version does not interpret;
/// it is carried through serialization untouched so newer operation
/// fields survive a round trip through older nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionEntry {
    pub type_tag: u16,
    pub payload: Vec<u8>,
}

/// Extension set attached to every operation
pub type Extensions = Vec<ExtensionEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOperation {
    pub fee: AssetAmount,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: AssetAmount,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountCreateOperation {
    pub fee: AssetAmount,
    /// Pays the fee and is recorded on the new account
    pub registrar: AccountId,
    pub name: String,
    pub owner: Authority,
    pub active: Authority,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdateOperation {
    pub fee: AssetAmount,
    pub account: AccountId,
    /// Replaces the owner authority when present
    pub owner: Option<Authority>,
    /// Replaces the active authority when present
    pub active: Option<Authority>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpgradeOperation {
    pub fee: AssetAmount,
    pub account_to_upgrade: AccountId,
    pub upgrade_to_lifetime: bool,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChequeCreateOperation {
    pub fee: AssetAmount,
    pub drawer: AccountId,
    /// 16 alphanumeric characters, unique among live cheques
    pub code: String,
    /// Escrowed per claimable slot
    pub amount_payee: AssetAmount,
    pub payee_count: u32,
    pub valid_from: Timestamp,
    pub expiration: Timestamp,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChequeUseOperation {
    pub fee: AssetAmount,
    /// Account claiming a payee slot
    pub account: AccountId,
    pub code: String,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundCreateOperation {
    pub fee: AssetAmount,
    pub owner: AccountId,
    pub name: String,
    pub asset_id: AssetId,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundDepositOperation {
    pub fee: AssetAmount,
    pub depositor: AccountId,
    pub fund: FundId,
    pub amount: AssetAmount,
    /// Seconds until the deposit matures and principal returns
    pub period_seconds: u64,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessCreateOperation {
    pub fee: AssetAmount,
    /// Must hold lifetime membership
    pub witness_account: AccountId,
    pub signing_key: PublicKey,
    pub url: String,
    pub extensions: Extensions,
}

/// Sparse patch over the settings singleton: absent fields preserve the
/// stored values, present fields overwrite them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdateOperation {
    pub fee: AssetAmount,
    /// Must be a committee member account
    pub account: AccountId,
    pub transfer_fees: Option<PercentFee>,
    pub cheque_fees: Option<PercentFee>,
    pub edc_transfers_daily_limit: Option<i64>,
    pub extensions: Extensions,
}

/// Sparse patch over governance chain parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitteeParamsUpdateOperation {
    pub fee: AssetAmount,
    /// Must be a committee member account
    pub account: AccountId,
    pub maintenance_interval: Option<u64>,
    pub max_authority_depth: Option<u8>,
    pub maximum_proposal_lifetime: Option<u64>,
    pub fee_schedule: Option<FeeSchedule>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalCreateOperation {
    pub fee: AssetAmount,
    pub proposer: AccountId,
    pub proposed_ops: Vec<Operation>,
    pub expiration: Timestamp,
    pub review_period_seconds: Option<u64>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalUpdateOperation {
    pub fee: AssetAmount,
    pub payer: AccountId,
    pub proposal: ProposalId,
    pub active_approvals_to_add: BTreeSet<AccountId>,
    pub active_approvals_to_remove: BTreeSet<AccountId>,
    pub owner_approvals_to_add: BTreeSet<AccountId>,
    pub owner_approvals_to_remove: BTreeSet<AccountId>,
    pub key_approvals_to_add: BTreeSet<PublicKey>,
    pub key_approvals_to_remove: BTreeSet<PublicKey>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalDeleteOperation {
    pub fee: AssetAmount,
    pub payer: AccountId,
    pub proposal: ProposalId,
    /// Deleting with owner authority of the payer instead of active
    pub using_owner_authority: bool,
    pub extensions: Extensions,
}

/// Everything a transaction can do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Transfer(TransferOperation),
    AccountCreate(AccountCreateOperation),
    AccountUpdate(AccountUpdateOperation),
    AccountUpgrade(AccountUpgradeOperation),
    ChequeCreate(ChequeCreateOperation),
    ChequeUse(ChequeUseOperation),
    FundCreate(FundCreateOperation),
    FundDeposit(FundDepositOperation),
    WitnessCreate(WitnessCreateOperation),
    SettingsUpdate(SettingsUpdateOperation),
    CommitteeParamsUpdate(CommitteeParamsUpdateOperation),
    ProposalCreate(ProposalCreateOperation),
    ProposalUpdate(ProposalUpdateOperation),
    ProposalDelete(ProposalDeleteOperation),
}

impl Operation {
    /// Declared fee carried by the operation
    pub fn fee(&self) -> AssetAmount {
        match self {
            Operation::Transfer(o) => o.fee,
            Operation::AccountCreate(o) => o.fee,
            Operation::AccountUpdate(o) => o.fee,
            Operation::AccountUpgrade(o) => o.fee,
            Operation::ChequeCreate(o) => o.fee,
            Operation::ChequeUse(o) => o.fee,
            Operation::FundCreate(o) => o.fee,
            Operation::FundDeposit(o) => o.fee,
            Operation::WitnessCreate(o) => o.fee,
            Operation::SettingsUpdate(o) => o.fee,
            Operation::CommitteeParamsUpdate(o) => o.fee,
            Operation::ProposalCreate(o) => o.fee,
            Operation::ProposalUpdate(o) => o.fee,
            Operation::ProposalDelete(o) => o.fee,
        }
    }

    /// Account debited for the fee
    pub fn fee_payer(&self) -> AccountId {
        match self {
            Operation::Transfer(o) => o.from,
            Operation::AccountCreate(o) => o.registrar,
            Operation::AccountUpdate(o) => o.account,
            Operation::AccountUpgrade(o) => o.account_to_upgrade,
            Operation::ChequeCreate(o) => o.drawer,
            Operation::ChequeUse(o) => o.account,
            Operation::FundCreate(o) => o.owner,
            Operation::FundDeposit(o) => o.depositor,
            Operation::WitnessCreate(o) => o.witness_account,
            Operation::SettingsUpdate(o) => o.account,
            Operation::CommitteeParamsUpdate(o) => o.account,
            Operation::ProposalCreate(o) => o.proposer,
            Operation::ProposalUpdate(o) => o.payer,
            Operation::ProposalDelete(o) => o.payer,
        }
    }

    /// Short name for logging and error context
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operation::Transfer(_) => "transfer",
            Operation::AccountCreate(_) => "account_create",
            Operation::AccountUpdate(_) => "account_update",
            Operation::AccountUpgrade(_) => "account_upgrade",
            Operation::ChequeCreate(_) => "cheque_create",
            Operation::ChequeUse(_) => "cheque_use",
            Operation::FundCreate(_) => "fund_create",
            Operation::FundDeposit(_) => "fund_deposit",
            Operation::WitnessCreate(_) => "witness_create",
            Operation::SettingsUpdate(_) => "settings_update",
            Operation::CommitteeParamsUpdate(_) => "committee_params_update",
            Operation::ProposalCreate(_) => "proposal_create",
            Operation::ProposalUpdate(_) => "proposal_update",
            Operation::ProposalDelete(_) => "proposal_delete",
        }
    }

    /// Accumulate the authorities this operation demands.
    ///
    /// `active` / `owner` collect account ids whose respective authority
    /// level must be satisfied; `other` collects literal authorities
    /// (key approvals) verified directly against the signing key set.
    /// Wallet-side signing tools consume the same sets to decide which
    /// keys must sign.
    pub fn required_authorities(
        &self,
        active: &mut BTreeSet<AccountId>,
        owner: &mut BTreeSet<AccountId>,
        other: &mut Vec<Authority>,
    ) {
        match self {
            Operation::AccountUpdate(o) => {
                // Replacing the owner authority demands owner privilege;
                // active-only updates demand active.
                if o.owner.is_some() {
                    owner.insert(o.account);
                } else {
                    active.insert(o.account);
                }
            }
            Operation::ProposalUpdate(o) => {
                active.insert(o.payer);
                for acc in o.active_approvals_to_add.iter().chain(&o.active_approvals_to_remove) {
                    active.insert(*acc);
                }
                for acc in o.owner_approvals_to_add.iter().chain(&o.owner_approvals_to_remove) {
                    owner.insert(*acc);
                }
                for key in o.key_approvals_to_add.iter().chain(&o.key_approvals_to_remove) {
                    other.push(Authority::single_key(*key));
                }
            }
            Operation::ProposalDelete(o) => {
                if o.using_owner_authority {
                    owner.insert(o.payer);
                } else {
                    active.insert(o.payer);
                }
            }
            _ => {
                active.insert(self.fee_payer());
            }
        }
    }
}
