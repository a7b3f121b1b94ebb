//! Transfer evaluator
//!
//! Moves an amount between two accounts. Core-asset transfers
//! additionally pay the percentage transfer fee from settings and count
//! against the sender's daily transfer limit.

use crate::db::Database;
use crate::operations::TransferOperation;
use crate::types::CORE_ASSET;
use crate::validation::errors::{OpError, OpResult};

use super::{EvalContext, OperationEvaluator};

const SECONDS_PER_DAY: u64 = 86_400;

pub(crate) struct TransferEvaluator;

impl OperationEvaluator for TransferEvaluator {
    type Op = TransferOperation;

    fn do_evaluate(db: &Database, op: &TransferOperation, ctx: &EvalContext) -> OpResult<()> {
        if op.amount.amount <= 0 {
            return Err(OpError::InvalidAmount { amount: op.amount });
        }
        if op.from == op.to {
            return Err(OpError::SameAccount { account: op.from });
        }
        let sender = db.account(op.from)?;
        let receiver = db.account(op.to)?;
        db.asset(op.amount.asset_id)?;

        if receiver.blacklisted_accounts.contains(&op.from) {
            return Err(OpError::Blacklisted {
                from: op.from,
                to: op.to,
            });
        }

        let is_core = op.amount.asset_id == CORE_ASSET;
        if is_core {
            let percent = db.settings().transfer_fees.fee_on(op.amount.amount);
            let need = op.amount.amount + op.fee.amount + percent;
            let have = db.balance_of(op.from, CORE_ASSET);
            if have < need {
                return Err(OpError::InsufficientBalance {
                    account: op.from,
                    asset: CORE_ASSET,
                    have,
                    need,
                });
            }

            let limit = db.settings().edc_transfers_daily_limit;
            if limit > 0 {
                let day = ctx.now / SECONDS_PER_DAY;
                let base = if sender.transfer_day == day {
                    sender.transferred_today
                } else {
                    0
                };
                let attempted = base + op.amount.amount;
                if attempted > limit {
                    return Err(OpError::DailyLimitExceeded {
                        account: op.from,
                        limit,
                        attempted,
                    });
                }
            }
        } else {
            let have = db.balance_of(op.from, op.amount.asset_id);
            if have < op.amount.amount {
                return Err(OpError::InsufficientBalance {
                    account: op.from,
                    asset: op.amount.asset_id,
                    have,
                    need: op.amount.amount,
                });
            }
            let core_have = db.balance_of(op.from, CORE_ASSET);
            if core_have < op.fee.amount {
                return Err(OpError::InsufficientBalance {
                    account: op.from,
                    asset: CORE_ASSET,
                    have: core_have,
                    need: op.fee.amount,
                });
            }
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &TransferOperation, ctx: &EvalContext) -> OpResult<()> {
        db.debit(op.from, op.amount.asset_id, op.amount.amount)?;
        db.credit(op.to, op.amount.asset_id, op.amount.amount)?;

        if op.amount.asset_id == CORE_ASSET {
            let percent = db.settings().transfer_fees.fee_on(op.amount.amount);
            if percent > 0 {
                db.charge_fee(op.from, percent)?;
            }

            let day = ctx.now / SECONDS_PER_DAY;
            let amount = op.amount.amount;
            db.accounts.modify(op.from.0, |account| {
                if account.transfer_day != day {
                    account.transfer_day = day;
                    account.transferred_today = 0;
                }
                account.transferred_today += amount;
            })?;
        }
        Ok(())
    }
}
