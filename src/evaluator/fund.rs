//! Fund evaluators: create and deposit

use crate::db::Database;
use crate::objects::fund::{Fund, FundDeposit};
use crate::operations::{FundCreateOperation, FundDepositOperation};
use crate::types::{FundId, CORE_ASSET};
use crate::validation::errors::{OpError, OpResult};

use super::{EvalContext, OperationEvaluator};

const MAX_FUND_NAME_LENGTH: usize = 63;

pub(crate) struct FundCreateEvaluator;

impl OperationEvaluator for FundCreateEvaluator {
    type Op = FundCreateOperation;

    fn do_evaluate(db: &Database, op: &FundCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        if op.name.is_empty() || op.name.len() > MAX_FUND_NAME_LENGTH {
            return Err(OpError::InvalidFundName {
                name: op.name.clone(),
            });
        }
        if db.funds.contains_key(op.name.as_bytes()) {
            return Err(OpError::FundNameInUse(op.name.clone()));
        }
        db.asset(op.asset_id)?;
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &FundCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        db.funds.create(|i| Fund {
            id: FundId(i),
            name: op.name.clone(),
            owner: op.owner,
            asset_id: op.asset_id,
            balance: 0,
            deposits: Vec::new(),
            enabled: true,
        });
        Ok(())
    }
}

pub(crate) struct FundDepositEvaluator;

impl OperationEvaluator for FundDepositEvaluator {
    type Op = FundDepositOperation;

    fn do_evaluate(db: &Database, op: &FundDepositOperation, _ctx: &EvalContext) -> OpResult<()> {
        if op.amount.amount <= 0 {
            return Err(OpError::InvalidAmount { amount: op.amount });
        }
        let fund = db.fund(op.fund)?;
        if !fund.enabled {
            return Err(OpError::FundDisabled(op.fund));
        }
        if fund.asset_id != op.amount.asset_id {
            return Err(OpError::FundAssetMismatch {
                fund: op.fund,
                expected: fund.asset_id,
                got: op.amount.asset_id,
            });
        }

        let is_core = op.amount.asset_id == CORE_ASSET;
        if is_core {
            let need = op.amount.amount + op.fee.amount;
            let have = db.balance_of(op.depositor, CORE_ASSET);
            if have < need {
                return Err(OpError::InsufficientBalance {
                    account: op.depositor,
                    asset: CORE_ASSET,
                    have,
                    need,
                });
            }
        } else {
            let have = db.balance_of(op.depositor, op.amount.asset_id);
            if have < op.amount.amount {
                return Err(OpError::InsufficientBalance {
                    account: op.depositor,
                    asset: op.amount.asset_id,
                    have,
                    need: op.amount.amount,
                });
            }
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &FundDepositOperation, ctx: &EvalContext) -> OpResult<()> {
        db.debit(op.depositor, op.amount.asset_id, op.amount.amount)?;

        let depositor = op.depositor;
        let amount = op.amount.amount;
        let matures_at = ctx.now + op.period_seconds;
        db.funds.modify(op.fund.0, |fund| {
            fund.balance += amount;
            fund.deposits.push(FundDeposit {
                depositor,
                amount,
                matures_at,
            });
        })?;
        Ok(())
    }
}
