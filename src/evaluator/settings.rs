//! Governance evaluators: settings and chain-parameter updates
//!
//! Both apply sparse patches: an absent optional field preserves the
//! stored value, a present field overwrites it. Only committee member
//! accounts may invoke either.

use crate::db::Database;
use crate::operations::{CommitteeParamsUpdateOperation, SettingsUpdateOperation};
use crate::validation::errors::{OpError, OpResult};

use super::{EvalContext, OperationEvaluator};

pub(crate) struct SettingsUpdateEvaluator;

impl OperationEvaluator for SettingsUpdateEvaluator {
    type Op = SettingsUpdateOperation;

    fn do_evaluate(db: &Database, op: &SettingsUpdateOperation, _ctx: &EvalContext) -> OpResult<()> {
        if !db.is_committee_member(op.account) {
            return Err(OpError::NotCommitteeMember(op.account));
        }
        if let Some(limit) = op.edc_transfers_daily_limit {
            if limit < 0 {
                return Err(OpError::InvalidParameter(format!(
                    "daily transfer limit must be non-negative, got {limit}"
                )));
            }
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &SettingsUpdateOperation, _ctx: &EvalContext) -> OpResult<()> {
        db.modify_settings(|settings| {
            if let Some(transfer_fees) = op.transfer_fees {
                settings.transfer_fees = transfer_fees;
            }
            if let Some(cheque_fees) = op.cheque_fees {
                settings.cheque_fees = cheque_fees;
            }
            if let Some(limit) = op.edc_transfers_daily_limit {
                settings.edc_transfers_daily_limit = limit;
            }
        })
    }
}

pub(crate) struct CommitteeParamsUpdateEvaluator;

impl OperationEvaluator for CommitteeParamsUpdateEvaluator {
    type Op = CommitteeParamsUpdateOperation;

    fn do_evaluate(
        db: &Database,
        op: &CommitteeParamsUpdateOperation,
        _ctx: &EvalContext,
    ) -> OpResult<()> {
        if !db.is_committee_member(op.account) {
            return Err(OpError::NotCommitteeMember(op.account));
        }
        if op.maintenance_interval == Some(0) {
            return Err(OpError::InvalidParameter(
                "maintenance interval must be positive".to_string(),
            ));
        }
        if op.max_authority_depth == Some(0) {
            return Err(OpError::InvalidParameter(
                "max authority depth must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn do_apply(
        db: &mut Database,
        op: &CommitteeParamsUpdateOperation,
        _ctx: &EvalContext,
    ) -> OpResult<()> {
        db.modify_global_properties(|props| {
            let params = &mut props.parameters;
            if let Some(interval) = op.maintenance_interval {
                params.maintenance_interval = interval;
            }
            if let Some(depth) = op.max_authority_depth {
                params.max_authority_depth = depth;
            }
            if let Some(lifetime) = op.maximum_proposal_lifetime {
                params.maximum_proposal_lifetime = lifetime;
            }
            if let Some(schedule) = &op.fee_schedule {
                params.fee_schedule = schedule.clone();
            }
        })
    }
}
