//! Operation evaluators
//!
//! One evaluator type per operation variant, each split into two
//! phases:
//!
//! - `do_evaluate` - read-only precondition checks against current
//!   state; must not mutate anything.
//! - `do_apply` - the actual mutation, invoked only after a successful
//!   evaluate and fee charge.
//!
//! Dispatch is an exhaustive match over `Operation`; adding a variant
//! without wiring an evaluator is a compile error. Evaluators never
//! manage undo sessions - the database facade brackets every
//! transaction.

mod account;
mod cheque;
mod fund;
mod proposal;
mod settings;
mod transfer;
mod witness;

use crate::db::Database;
use crate::operations::Operation;
use crate::types::Timestamp;
use crate::validation::errors::OpResult;

use account::{AccountCreateEvaluator, AccountUpdateEvaluator, AccountUpgradeEvaluator};
use cheque::{ChequeCreateEvaluator, ChequeUseEvaluator};
use fund::{FundCreateEvaluator, FundDepositEvaluator};
use proposal::{ProposalCreateEvaluator, ProposalDeleteEvaluator, ProposalUpdateEvaluator};
use settings::{CommitteeParamsUpdateEvaluator, SettingsUpdateEvaluator};
use transfer::TransferEvaluator;
use witness::WitnessCreateEvaluator;

/// Evaluation-time context shared by every operation of a transaction
#[derive(Debug, Clone, Copy)]
pub(crate) struct EvalContext {
    /// Chain time the transaction executes at (block timestamp, or the
    /// head time for directly pushed transactions)
    pub now: Timestamp,
}

/// Two-phase contract implemented by each operation evaluator
pub(crate) trait OperationEvaluator {
    type Op;

    /// Read-only precondition checks; must not mutate state.
    fn do_evaluate(db: &Database, op: &Self::Op, ctx: &EvalContext) -> OpResult<()>;

    /// State mutation; runs only after `do_evaluate` succeeded and the
    /// fee was charged.
    fn do_apply(db: &mut Database, op: &Self::Op, ctx: &EvalContext) -> OpResult<()>;
}

pub(crate) fn evaluate(db: &Database, op: &Operation, ctx: &EvalContext) -> OpResult<()> {
    match op {
        Operation::Transfer(o) => TransferEvaluator::do_evaluate(db, o, ctx),
        Operation::AccountCreate(o) => AccountCreateEvaluator::do_evaluate(db, o, ctx),
        Operation::AccountUpdate(o) => AccountUpdateEvaluator::do_evaluate(db, o, ctx),
        Operation::AccountUpgrade(o) => AccountUpgradeEvaluator::do_evaluate(db, o, ctx),
        Operation::ChequeCreate(o) => ChequeCreateEvaluator::do_evaluate(db, o, ctx),
        Operation::ChequeUse(o) => ChequeUseEvaluator::do_evaluate(db, o, ctx),
        Operation::FundCreate(o) => FundCreateEvaluator::do_evaluate(db, o, ctx),
        Operation::FundDeposit(o) => FundDepositEvaluator::do_evaluate(db, o, ctx),
        Operation::WitnessCreate(o) => WitnessCreateEvaluator::do_evaluate(db, o, ctx),
        Operation::SettingsUpdate(o) => SettingsUpdateEvaluator::do_evaluate(db, o, ctx),
        Operation::CommitteeParamsUpdate(o) => {
            CommitteeParamsUpdateEvaluator::do_evaluate(db, o, ctx)
        }
        Operation::ProposalCreate(o) => ProposalCreateEvaluator::do_evaluate(db, o, ctx),
        Operation::ProposalUpdate(o) => ProposalUpdateEvaluator::do_evaluate(db, o, ctx),
        Operation::ProposalDelete(o) => ProposalDeleteEvaluator::do_evaluate(db, o, ctx),
    }
}

pub(crate) fn apply(db: &mut Database, op: &Operation, ctx: &EvalContext) -> OpResult<()> {
    match op {
        Operation::Transfer(o) => TransferEvaluator::do_apply(db, o, ctx),
        Operation::AccountCreate(o) => AccountCreateEvaluator::do_apply(db, o, ctx),
        Operation::AccountUpdate(o) => AccountUpdateEvaluator::do_apply(db, o, ctx),
        Operation::AccountUpgrade(o) => AccountUpgradeEvaluator::do_apply(db, o, ctx),
        Operation::ChequeCreate(o) => ChequeCreateEvaluator::do_apply(db, o, ctx),
        Operation::ChequeUse(o) => ChequeUseEvaluator::do_apply(db, o, ctx),
        Operation::FundCreate(o) => FundCreateEvaluator::do_apply(db, o, ctx),
        Operation::FundDeposit(o) => FundDepositEvaluator::do_apply(db, o, ctx),
        Operation::WitnessCreate(o) => WitnessCreateEvaluator::do_apply(db, o, ctx),
        Operation::SettingsUpdate(o) => SettingsUpdateEvaluator::do_apply(db, o, ctx),
        Operation::CommitteeParamsUpdate(o) => {
            CommitteeParamsUpdateEvaluator::do_apply(db, o, ctx)
        }
        Operation::ProposalCreate(o) => ProposalCreateEvaluator::do_apply(db, o, ctx),
        Operation::ProposalUpdate(o) => ProposalUpdateEvaluator::do_apply(db, o, ctx),
        Operation::ProposalDelete(o) => ProposalDeleteEvaluator::do_apply(db, o, ctx),
    }
}
