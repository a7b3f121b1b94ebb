//! Witness creation evaluator

use crate::db::Database;
use crate::objects::witness::Witness;
use crate::operations::WitnessCreateOperation;
use crate::types::WitnessId;
use crate::validation::errors::{OpError, OpResult};

use super::{EvalContext, OperationEvaluator};

pub(crate) struct WitnessCreateEvaluator;

impl OperationEvaluator for WitnessCreateEvaluator {
    type Op = WitnessCreateOperation;

    fn do_evaluate(db: &Database, op: &WitnessCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        let account = db.account(op.witness_account)?;
        if !account.is_lifetime_member() {
            return Err(OpError::NotLifetimeMember(op.witness_account));
        }
        if db.witness_by_account(op.witness_account).is_some() {
            return Err(OpError::WitnessAlreadyExists(op.witness_account));
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &WitnessCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        let vote_id = db.allocate_vote_id()?;
        db.witnesses.create(|i| Witness {
            id: WitnessId(i),
            witness_account: op.witness_account,
            signing_key: op.signing_key,
            url: op.url.clone(),
            vote_id,
            total_missed: 0,
        });
        Ok(())
    }
}
