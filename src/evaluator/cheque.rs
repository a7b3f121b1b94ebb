//! Cheque evaluators: create and use
//!
//! Creation escrows `amount_payee * payee_count` from the drawer. Each
//! use credits one payee slot; the aggregate status flips to `Used`
//! exactly when the last slot is consumed. Expiry reversal is handled
//! by the maintenance pass, not here.

use crate::db::Database;
use crate::objects::cheque::{
    is_valid_cheque_code, Cheque, ChequePayee, ChequeStatus, PayeeStatus,
};
use crate::operations::{ChequeCreateOperation, ChequeUseOperation};
use crate::types::{ChequeId, CORE_ASSET};
use crate::validation::errors::{OpError, OpResult};

use super::{EvalContext, OperationEvaluator};

/// Total escrow for a cheque, overflow-checked.
fn escrow_total(amount_payee: i64, payee_count: u32) -> Option<i64> {
    let total = amount_payee as i128 * payee_count as i128;
    i64::try_from(total).ok()
}

pub(crate) struct ChequeCreateEvaluator;

impl OperationEvaluator for ChequeCreateEvaluator {
    type Op = ChequeCreateOperation;

    fn do_evaluate(db: &Database, op: &ChequeCreateOperation, ctx: &EvalContext) -> OpResult<()> {
        if !is_valid_cheque_code(&op.code) {
            return Err(OpError::InvalidChequeCode {
                code: op.code.clone(),
            });
        }
        if db.cheque_by_code(&op.code).is_some() {
            return Err(OpError::ChequeCodeInUse(op.code.clone()));
        }
        if op.amount_payee.amount <= 0 {
            return Err(OpError::InvalidAmount {
                amount: op.amount_payee,
            });
        }
        if op.payee_count == 0 {
            return Err(OpError::InvalidPayeeCount {
                count: op.payee_count,
            });
        }
        if op.valid_from >= op.expiration || op.expiration <= ctx.now {
            return Err(OpError::InvalidWindow {
                valid_from: op.valid_from,
                expiration: op.expiration,
            });
        }
        db.asset(op.amount_payee.asset_id)?;

        let total = escrow_total(op.amount_payee.amount, op.payee_count).ok_or(
            OpError::InvalidAmount {
                amount: op.amount_payee,
            },
        )?;

        let is_core = op.amount_payee.asset_id == CORE_ASSET;
        if is_core {
            let percent = db.settings().cheque_fees.fee_on(total);
            let need = total + op.fee.amount + percent;
            let have = db.balance_of(op.drawer, CORE_ASSET);
            if have < need {
                return Err(OpError::InsufficientBalance {
                    account: op.drawer,
                    asset: CORE_ASSET,
                    have,
                    need,
                });
            }
        } else {
            let have = db.balance_of(op.drawer, op.amount_payee.asset_id);
            if have < total {
                return Err(OpError::InsufficientBalance {
                    account: op.drawer,
                    asset: op.amount_payee.asset_id,
                    have,
                    need: total,
                });
            }
            let core_have = db.balance_of(op.drawer, CORE_ASSET);
            if core_have < op.fee.amount {
                return Err(OpError::InsufficientBalance {
                    account: op.drawer,
                    asset: CORE_ASSET,
                    have: core_have,
                    need: op.fee.amount,
                });
            }
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &ChequeCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        let total = escrow_total(op.amount_payee.amount, op.payee_count).ok_or(
            OpError::InvalidAmount {
                amount: op.amount_payee,
            },
        )?;

        db.debit(op.drawer, op.amount_payee.asset_id, total)?;
        if op.amount_payee.asset_id == CORE_ASSET {
            let percent = db.settings().cheque_fees.fee_on(total);
            if percent > 0 {
                db.charge_fee(op.drawer, percent)?;
            }
        }

        db.cheques.create(|i| Cheque {
            id: ChequeId(i),
            drawer: op.drawer,
            code: op.code.clone(),
            asset_id: op.amount_payee.asset_id,
            amount_payee: op.amount_payee.amount,
            amount_remaining: total,
            payees: vec![ChequePayee::unused(); op.payee_count as usize],
            valid_from: op.valid_from,
            expiration: op.expiration,
            status: ChequeStatus::New,
            datetime_used: None,
        });
        Ok(())
    }
}

pub(crate) struct ChequeUseEvaluator;

impl OperationEvaluator for ChequeUseEvaluator {
    type Op = ChequeUseOperation;

    fn do_evaluate(db: &Database, op: &ChequeUseOperation, ctx: &EvalContext) -> OpResult<()> {
        db.account(op.account)?;
        let cheque = db
            .cheque_by_code(&op.code)
            .ok_or_else(|| OpError::ChequeNotFound(op.code.clone()))?;

        match cheque.status {
            ChequeStatus::Used => {
                return Err(OpError::ChequeAlreadyUsed {
                    code: op.code.clone(),
                })
            }
            ChequeStatus::Undone => {
                return Err(OpError::ChequeNotActive {
                    code: op.code.clone(),
                    now: ctx.now,
                    valid_from: cheque.valid_from,
                    expiration: cheque.expiration,
                })
            }
            ChequeStatus::New => {}
        }
        if !cheque.is_active_at(ctx.now) {
            return Err(OpError::ChequeNotActive {
                code: op.code.clone(),
                now: ctx.now,
                valid_from: cheque.valid_from,
                expiration: cheque.expiration,
            });
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &ChequeUseOperation, ctx: &EvalContext) -> OpResult<()> {
        let (instance, asset_id, amount_payee, status) = {
            let cheque = db
                .cheque_by_code(&op.code)
                .ok_or_else(|| OpError::ChequeNotFound(op.code.clone()))?;
            (
                cheque.id.0,
                cheque.asset_id,
                cheque.amount_payee,
                cheque.status,
            )
        };
        // A fully used cheque is a no-op here; the terminal transition
        // happens exactly once.
        if status == ChequeStatus::Used {
            return Ok(());
        }

        db.credit(op.account, asset_id, amount_payee)?;

        let claimer = op.account;
        let now = ctx.now;
        let mut slot_found = true;
        db.cheques.modify(instance, |cheque| {
            match cheque.first_unused_slot() {
                Some(index) => {
                    let slot = &mut cheque.payees[index];
                    slot.payee = Some(claimer);
                    slot.status = PayeeStatus::Used;
                    slot.datetime_used = Some(now);
                    cheque.amount_remaining -= cheque.amount_payee;
                    if cheque.unused_slot_count() == 0 {
                        cheque.status = ChequeStatus::Used;
                        cheque.datetime_used = Some(now);
                    }
                }
                None => slot_found = false,
            }
        })?;

        if !slot_found {
            return Err(OpError::Invariant(format!(
                "cheque {} has status new but no unused slot",
                op.code
            )));
        }
        Ok(())
    }
}
