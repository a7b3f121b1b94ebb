//! Account evaluators: create, update, upgrade

use std::collections::BTreeSet;

use crate::db::Database;
use crate::objects::account::{Account, MembershipStatus};
use crate::operations::{
    AccountCreateOperation, AccountUpdateOperation, AccountUpgradeOperation,
};
use crate::types::AccountId;
use crate::validation::errors::{OpError, OpResult};

use super::{EvalContext, OperationEvaluator};

const MAX_ACCOUNT_NAME_LENGTH: usize = 63;

/// Account names: 1-63 characters, lowercase ASCII, starting with a
/// letter, then letters, digits or hyphens.
pub(crate) fn is_valid_account_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_ACCOUNT_NAME_LENGTH {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub(crate) struct AccountCreateEvaluator;

impl OperationEvaluator for AccountCreateEvaluator {
    type Op = AccountCreateOperation;

    fn do_evaluate(db: &Database, op: &AccountCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        if !is_valid_account_name(&op.name) {
            return Err(OpError::InvalidAccountName {
                name: op.name.clone(),
            });
        }
        if db.account_by_name(&op.name).is_some() {
            return Err(OpError::AccountNameInUse(op.name.clone()));
        }
        if op.owner.is_impossible() || op.active.is_impossible() {
            return Err(OpError::ImpossibleAuthority {
                account: op.registrar,
            });
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &AccountCreateOperation, _ctx: &EvalContext) -> OpResult<()> {
        db.accounts.create(|i| Account {
            id: AccountId(i),
            name: op.name.clone(),
            registrar: op.registrar,
            owner: op.owner.clone(),
            active: op.active.clone(),
            membership: MembershipStatus::Basic,
            whitelisted_accounts: BTreeSet::new(),
            blacklisted_accounts: BTreeSet::new(),
            transferred_today: 0,
            transfer_day: 0,
        });
        Ok(())
    }
}

pub(crate) struct AccountUpdateEvaluator;

impl OperationEvaluator for AccountUpdateEvaluator {
    type Op = AccountUpdateOperation;

    fn do_evaluate(db: &Database, op: &AccountUpdateOperation, _ctx: &EvalContext) -> OpResult<()> {
        db.account(op.account)?;
        for authority in op.owner.iter().chain(op.active.iter()) {
            if authority.is_impossible() {
                return Err(OpError::ImpossibleAuthority {
                    account: op.account,
                });
            }
        }
        Ok(())
    }

    fn do_apply(db: &mut Database, op: &AccountUpdateOperation, _ctx: &EvalContext) -> OpResult<()> {
        db.accounts.modify(op.account.0, |account| {
            if let Some(owner) = &op.owner {
                account.owner = owner.clone();
            }
            if let Some(active) = &op.active {
                account.active = active.clone();
            }
        })?;
        Ok(())
    }
}

pub(crate) struct AccountUpgradeEvaluator;

impl OperationEvaluator for AccountUpgradeEvaluator {
    type Op = AccountUpgradeOperation;

    fn do_evaluate(db: &Database, op: &AccountUpgradeOperation, _ctx: &EvalContext) -> OpResult<()> {
        db.account(op.account_to_upgrade)?;
        Ok(())
    }

    fn do_apply(
        db: &mut Database,
        op: &AccountUpgradeOperation,
        _ctx: &EvalContext,
    ) -> OpResult<()> {
        db.accounts.modify(op.account_to_upgrade.0, |account| {
            if op.upgrade_to_lifetime {
                account.membership = MembershipStatus::Lifetime;
            } else if account.membership == MembershipStatus::Basic {
                account.membership = MembershipStatus::Annual;
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_name_rules() {
        assert!(is_valid_account_name("alice"));
        assert!(is_valid_account_name("a"));
        assert!(is_valid_account_name("block-producer-01"));
        assert!(!is_valid_account_name(""));
        assert!(!is_valid_account_name("Alice")); // uppercase
        assert!(!is_valid_account_name("1alice")); // digit first
        assert!(!is_valid_account_name("-alice")); // hyphen first
        assert!(!is_valid_account_name("al ice")); // whitespace
        assert!(!is_valid_account_name(&"a".repeat(64)));
    }
}
