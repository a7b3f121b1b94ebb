//! Proposal evaluators: create, update, delete
//!
//! A proposal parks a set of operations until the accounts they demand
//! authority from have all approved. Approvals arrive through
//! `ProposalUpdate`; once available approvals cover the required sets
//! (and any review period has passed) the database executes the parked
//! operations with collected approvals standing in for signatures.

use std::collections::BTreeSet;

use crate::db::Database;
use crate::objects::proposal::Proposal;
use crate::operations::{
    Operation, ProposalCreateOperation, ProposalDeleteOperation, ProposalUpdateOperation,
};
use crate::types::{AccountId, ProposalId};
use crate::validation::errors::{OpError, OpResult};

use super::{EvalContext, OperationEvaluator};

/// Account-level approvals the given operations demand.
fn required_approval_sets(ops: &[Operation]) -> (BTreeSet<AccountId>, BTreeSet<AccountId>) {
    let mut active = BTreeSet::new();
    let mut owner = BTreeSet::new();
    let mut other = Vec::new();
    for op in ops {
        op.required_authorities(&mut active, &mut owner, &mut other);
    }
    (active, owner)
}

pub(crate) struct ProposalCreateEvaluator;

impl OperationEvaluator for ProposalCreateEvaluator {
    type Op = ProposalCreateOperation;

    fn do_evaluate(db: &Database, op: &ProposalCreateOperation, ctx: &EvalContext) -> OpResult<()> {
        if op.proposed_ops.is_empty() {
            return Err(OpError::InvalidParameter(
                "proposal has no operations".to_string(),
            ));
        }
        if op.expiration <= ctx.now {
            return Err(OpError::InvalidWindow {
                valid_from: ctx.now,
                expiration: op.expiration,
            });
        }
        let lifetime = op.expiration - ctx.now;
        let max = db.global_properties().parameters.maximum_proposal_lifetime;
        if lifetime > max {
            return Err(OpError::ProposalLifetimeTooLong { lifetime, max });
        }

        // Every account whose approval will be required must exist now.
        let (active, owner) = required_approval_sets(&op.proposed_ops);
        for account in active.iter().chain(owner.iter()) {
            db.account(*account)?;
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &ProposalCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        let (required_active, required_owner) = required_approval_sets(&op.proposed_ops);
        db.proposals.create(|i| Proposal {
            id: ProposalId(i),
            proposer: op.proposer,
            proposed_ops: op.proposed_ops.clone(),
            expiration: op.expiration,
            review_period_seconds: op.review_period_seconds,
            required_active_approvals: required_active,
            required_owner_approvals: required_owner,
            available_active_approvals: BTreeSet::new(),
            available_owner_approvals: BTreeSet::new(),
            available_key_approvals: BTreeSet::new(),
        });
        Ok(())
    }
}

pub(crate) struct ProposalUpdateEvaluator;

impl OperationEvaluator for ProposalUpdateEvaluator {
    type Op = ProposalUpdateOperation;

    fn do_evaluate(db: &Database, op: &ProposalUpdateOperation, ctx: &EvalContext) -> OpResult<()> {
        let proposal = db.proposal(op.proposal)?;
        if proposal.is_expired(ctx.now) {
            return Err(OpError::ProposalExpired {
                proposal: op.proposal,
                expiration: proposal.expiration,
                now: ctx.now,
            });
        }

        for account in &op.active_approvals_to_add {
            if !proposal.required_active_approvals.contains(account) {
                return Err(OpError::IrrelevantApproval {
                    proposal: op.proposal,
                    approval: *account,
                });
            }
        }
        for account in &op.owner_approvals_to_add {
            if !proposal.required_owner_approvals.contains(account) {
                return Err(OpError::IrrelevantApproval {
                    proposal: op.proposal,
                    approval: *account,
                });
            }
        }
        for account in &op.active_approvals_to_remove {
            if !proposal.available_active_approvals.contains(account) {
                return Err(OpError::IrrelevantApproval {
                    proposal: op.proposal,
                    approval: *account,
                });
            }
        }
        for account in &op.owner_approvals_to_remove {
            if !proposal.available_owner_approvals.contains(account) {
                return Err(OpError::IrrelevantApproval {
                    proposal: op.proposal,
                    approval: *account,
                });
            }
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &ProposalUpdateOperation, ctx: &EvalContext) -> OpResult<()> {
        db.proposals.modify(op.proposal.0, |proposal| {
            for account in &op.active_approvals_to_add {
                proposal.available_active_approvals.insert(*account);
            }
            for account in &op.active_approvals_to_remove {
                proposal.available_active_approvals.remove(account);
            }
            for account in &op.owner_approvals_to_add {
                proposal.available_owner_approvals.insert(*account);
            }
            for account in &op.owner_approvals_to_remove {
                proposal.available_owner_approvals.remove(account);
            }
            for key in &op.key_approvals_to_add {
                proposal.available_key_approvals.insert(*key);
            }
            for key in &op.key_approvals_to_remove {
                proposal.available_key_approvals.remove(key);
            }
        })?;

        db.try_execute_proposal(op.proposal.0, ctx.now)
    }
}

pub(crate) struct ProposalDeleteEvaluator;

impl OperationEvaluator for ProposalDeleteEvaluator {
    type Op = ProposalDeleteOperation;

    fn do_evaluate(db: &Database, op: &ProposalDeleteOperation, _ctx: &EvalContext) -> OpResult<()> {
        let proposal = db.proposal(op.proposal)?;

        // Veto power: the proposer, or any account whose approval the
        // proposal requires.
        let allowed = op.payer == proposal.proposer
            || proposal.required_active_approvals.contains(&op.payer)
            || proposal.required_owner_approvals.contains(&op.payer);
        if !allowed {
            return Err(OpError::IrrelevantApproval {
                proposal: op.proposal,
                approval: op.payer,
            });
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &ProposalDeleteOperation, _ctx: &EvalContext) -> OpResult<()> {
        db.proposals.remove(op.proposal.0)?;
        Ok(())
    }
}
