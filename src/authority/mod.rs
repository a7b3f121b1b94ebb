//! Authority verification
//!
//! Resolves whether a set of signing keys satisfies an account's
//! weighted-threshold authority at a given privilege level. Nested
//! account entries resolve through that account's **active** authority
//! only - an owner authority can never be reached through nesting, which
//! blocks owner-privilege escalation via account references.
//!
//! Recursion is bounded by the governance-tunable maximum authority
//! depth; exceeding the bound is a hard failure, never a silent
//! truncation. A referenced account that does not exist fails closed.

use std::collections::BTreeSet;

use crate::db::index::ObjectIndex;
use crate::objects::account::{Account, Authority, AuthorityLevel};
use crate::types::{AccountId, PublicKey};
use crate::validation::errors::{OpError, OpResult};

/// Verify that `signing_keys` satisfies `account`'s authority at
/// `level`.
///
/// Duplicate signatures cannot double-count: the input is a set.
pub fn verify_account_authority(
    accounts: &ObjectIndex<Account>,
    signing_keys: &BTreeSet<PublicKey>,
    account_id: AccountId,
    level: AuthorityLevel,
    max_depth: u8,
) -> OpResult<()> {
    let account = accounts
        .get(account_id.0)
        .ok_or(OpError::AccountNotFound(account_id))?;
    let authority = account.authority_for(level);

    if satisfied(accounts, signing_keys, authority, max_depth, max_depth)? {
        Ok(())
    } else {
        Err(OpError::AuthorityNotSatisfied {
            account: account_id,
            level,
        })
    }
}

/// Verify a literal authority (key approvals collected outside any
/// account, e.g. proposal key approvals).
pub fn verify_literal_authority(
    accounts: &ObjectIndex<Account>,
    signing_keys: &BTreeSet<PublicKey>,
    authority: &Authority,
    max_depth: u8,
) -> OpResult<()> {
    if satisfied(accounts, signing_keys, authority, max_depth, max_depth)? {
        Ok(())
    } else {
        Err(OpError::KeyAuthorityNotSatisfied)
    }
}

/// Weight-sum satisfaction check with bounded recursion.
///
/// `depth_remaining` counts nested account hops still allowed; a nested
/// entry encountered at zero is the fan-out hard failure.
fn satisfied(
    accounts: &ObjectIndex<Account>,
    signing_keys: &BTreeSet<PublicKey>,
    authority: &Authority,
    depth_remaining: u8,
    max_depth: u8,
) -> OpResult<bool> {
    if authority.is_trivially_satisfied() {
        return Ok(true);
    }

    let threshold = authority.weight_threshold as u64;
    let mut total: u64 = 0;

    for (key, weight) in &authority.key_auths {
        if signing_keys.contains(key) {
            total += *weight as u64;
            if total >= threshold {
                return Ok(true);
            }
        }
    }

    for (nested_id, weight) in &authority.account_auths {
        if depth_remaining == 0 {
            return Err(OpError::MaxAuthorityDepthExceeded {
                account: *nested_id,
                max_depth,
            });
        }
        let nested = accounts
            .get(nested_id.0)
            .ok_or(OpError::AccountNotFound(*nested_id))?;

        // Nested references always resolve the active authority.
        if satisfied(accounts, signing_keys, &nested.active, depth_remaining - 1, max_depth)? {
            total += *weight as u64;
            if total >= threshold {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::account::MembershipStatus;
    use std::collections::BTreeMap;

    fn key(byte: u8) -> PublicKey {
        PublicKey::new([byte; 32])
    }

    fn keys(bytes: &[u8]) -> BTreeSet<PublicKey> {
        bytes.iter().map(|b| key(*b)).collect()
    }

    fn account_with(id: u64, active: Authority) -> Account {
        Account {
            id: AccountId(id),
            name: format!("acct{id}"),
            registrar: AccountId(0),
            owner: active.clone(),
            active,
            membership: MembershipStatus::Basic,
            whitelisted_accounts: BTreeSet::new(),
            blacklisted_accounts: BTreeSet::new(),
            transferred_today: 0,
            transfer_day: 0,
        }
    }

    fn index_of(accounts: Vec<Account>) -> ObjectIndex<Account> {
        let mut index = ObjectIndex::new();
        for account in accounts {
            index.create(|i| {
                let mut a = account.clone();
                assert_eq!(a.id.0, i, "test accounts must be created in id order");
                a.id = AccountId(i);
                a
            });
        }
        index
    }

    fn weighted(threshold: u32, entries: &[(PublicKey, u16)]) -> Authority {
        Authority {
            weight_threshold: threshold,
            account_auths: BTreeMap::new(),
            key_auths: entries.iter().cloned().collect(),
        }
    }

    #[test]
    fn test_weighted_threshold() {
        // {k1: 1, k2: 2, threshold: 2}
        let auth = weighted(2, &[(key(1), 1), (key(2), 2)]);
        let accounts = index_of(vec![account_with(0, auth)]);

        // k2 alone reaches the threshold.
        assert!(verify_account_authority(
            &accounts, &keys(&[2]), AccountId(0), AuthorityLevel::Active, 2
        )
        .is_ok());

        // k1 alone does not.
        let err = verify_account_authority(
            &accounts, &keys(&[1]), AccountId(0), AuthorityLevel::Active, 2,
        )
        .unwrap_err();
        assert!(matches!(err, OpError::AuthorityNotSatisfied { .. }));

        // Together they do.
        assert!(verify_account_authority(
            &accounts, &keys(&[1, 2]), AccountId(0), AuthorityLevel::Active, 2
        )
        .is_ok());
    }

    #[test]
    fn test_zero_threshold_is_trivially_satisfied() {
        let auth = weighted(0, &[]);
        let accounts = index_of(vec![account_with(0, auth)]);
        assert!(verify_account_authority(
            &accounts, &BTreeSet::new(), AccountId(0), AuthorityLevel::Active, 2
        )
        .is_ok());
    }

    #[test]
    fn test_nested_account_resolves_active() {
        // Account 1's active is satisfied by key 9; account 0 delegates
        // to account 1.
        let inner = weighted(1, &[(key(9), 1)]);
        let outer = Authority {
            weight_threshold: 1,
            account_auths: BTreeMap::from([(AccountId(1), 1)]),
            key_auths: BTreeMap::new(),
        };
        let accounts = index_of(vec![account_with(0, outer), account_with(1, inner)]);

        assert!(verify_account_authority(
            &accounts, &keys(&[9]), AccountId(0), AuthorityLevel::Active, 2
        )
        .is_ok());
    }

    #[test]
    fn test_depth_bound_is_a_hard_failure() {
        // 0 -> 1 -> 2, each delegating; with max depth 1 the second hop
        // must fail loudly, not be skipped.
        let delegate_to = |id: u64| Authority {
            weight_threshold: 1,
            account_auths: BTreeMap::from([(AccountId(id), 1)]),
            key_auths: BTreeMap::new(),
        };
        let leaf = weighted(1, &[(key(9), 1)]);
        let accounts = index_of(vec![
            account_with(0, delegate_to(1)),
            account_with(1, delegate_to(2)),
            account_with(2, leaf),
        ]);

        let err = verify_account_authority(
            &accounts, &keys(&[9]), AccountId(0), AuthorityLevel::Active, 1,
        )
        .unwrap_err();
        assert!(matches!(err, OpError::MaxAuthorityDepthExceeded { .. }));

        // A deeper bound resolves the same graph.
        assert!(verify_account_authority(
            &accounts, &keys(&[9]), AccountId(0), AuthorityLevel::Active, 3
        )
        .is_ok());
    }

    #[test]
    fn test_missing_nested_account_fails_closed() {
        let outer = Authority {
            weight_threshold: 1,
            account_auths: BTreeMap::from([(AccountId(77), 1)]),
            key_auths: BTreeMap::new(),
        };
        let accounts = index_of(vec![account_with(0, outer)]);

        let err = verify_account_authority(
            &accounts, &keys(&[9]), AccountId(0), AuthorityLevel::Active, 2,
        )
        .unwrap_err();
        assert_eq!(err, OpError::AccountNotFound(AccountId(77)));
    }

    #[test]
    fn test_owner_not_reachable_through_nesting() {
        // Account 1: active needs key 5, owner needs key 6. Account 0
        // delegates to account 1; key 6 alone must NOT satisfy.
        let mut inner = account_with(1, weighted(1, &[(key(5), 1)]));
        inner.owner = weighted(1, &[(key(6), 1)]);
        let outer = Authority {
            weight_threshold: 1,
            account_auths: BTreeMap::from([(AccountId(1), 1)]),
            key_auths: BTreeMap::new(),
        };
        let accounts = index_of(vec![account_with(0, outer), inner]);

        let err = verify_account_authority(
            &accounts, &keys(&[6]), AccountId(0), AuthorityLevel::Active, 2,
        )
        .unwrap_err();
        assert!(matches!(err, OpError::AuthorityNotSatisfied { .. }));
        assert!(verify_account_authority(
            &accounts, &keys(&[5]), AccountId(0), AuthorityLevel::Active, 2
        )
        .is_ok());
    }
}
