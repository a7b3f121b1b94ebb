//! End-to-end ledger tests
//!
//! Exercises the public facade the way an embedding node would: genesis,
//! pushed transactions, full blocks and the maintenance pass.

use std::collections::BTreeMap;

use anyhow::Result;

use lib_ledger::{
    transaction_merkle_root, AccountCreateOperation, AccountId, AccountUpgradeOperation,
    AssetAmount, Authority, BlockApplyError, BlockHeader, ChequeCreateOperation, ChequeStatus,
    ChequeUseOperation, CommitteeParamsUpdateOperation, Database, FundCreateOperation,
    FundDepositOperation, FundId, GenesisAccount, GenesisConfig, OpError, Operation,
    PayeeStatus, ProposalCreateOperation, ProposalId, ProposalUpdateOperation, PublicKey,
    SettingsUpdateOperation, SignedBlock, SignedTransaction, Timestamp, TransferOperation,
    WitnessCreateOperation, WitnessId, CORE_ASSET,
};

const ALICE: AccountId = AccountId(0);
const BOB: AccountId = AccountId(1);
const CAROL: AccountId = AccountId(2);
const DAVE: AccountId = AccountId(3);

const FAR_FUTURE: Timestamp = 1_000_000;

fn key(byte: u8) -> PublicKey {
    PublicKey::new([byte; 32])
}

/// Alice is rich, a lifetime member, a committee member and the genesis
/// witness; the others are plain accounts.
fn setup() -> Database {
    let mut genesis = GenesisConfig::default();
    let mut alice = GenesisAccount::new("alice", key(1), 1_000_000);
    alice.is_lifetime_member = true;
    alice.is_committee_member = true;
    alice.is_witness = true;
    genesis.accounts = vec![
        alice,
        GenesisAccount::new("bob", key(2), 100_000),
        GenesisAccount::new("carol", key(3), 100_000),
        GenesisAccount::new("dave", key(4), 100_000),
    ];
    Database::new(genesis)
}

fn tx(operations: Vec<Operation>, signers: &[u8]) -> SignedTransaction {
    SignedTransaction::new(
        operations,
        FAR_FUTURE,
        signers.iter().map(|b| key(*b)).collect(),
    )
}

fn transfer(from: AccountId, to: AccountId, amount: i64) -> Operation {
    Operation::Transfer(TransferOperation {
        fee: AssetAmount::core(10),
        from,
        to,
        amount: AssetAmount::core(amount),
        extensions: vec![],
    })
}

fn cheque_create(drawer: AccountId, code: &str, amount_payee: i64, payee_count: u32) -> Operation {
    Operation::ChequeCreate(ChequeCreateOperation {
        fee: AssetAmount::core(20 + 5 * payee_count as i64),
        drawer,
        code: code.to_string(),
        amount_payee: AssetAmount::core(amount_payee),
        payee_count,
        valid_from: 0,
        expiration: 1_000,
        extensions: vec![],
    })
}

fn cheque_use(account: AccountId, code: &str) -> Operation {
    Operation::ChequeUse(ChequeUseOperation {
        fee: AssetAmount::core(0),
        account,
        code: code.to_string(),
        extensions: vec![],
    })
}

fn block_on(db: &Database, transactions: Vec<SignedTransaction>, timestamp: Timestamp) -> SignedBlock {
    SignedBlock {
        header: BlockHeader {
            previous: db.head_block_id(),
            timestamp,
            block_num: db.head_block_number() + 1,
            merkle_root: transaction_merkle_root(&transactions),
            witness: WitnessId(0),
        },
        transactions,
    }
}

// =========================================================================
// Cheque Lifecycle
// =========================================================================

#[test]
fn test_cheque_three_payee_lifecycle() -> Result<()> {
    let mut db = setup();
    let code = "ABCDEFGHIJKLMNOP";

    // Alice draws a cheque: 100 per payee, three payees, 300 escrowed.
    db.push_transaction(&tx(vec![cheque_create(ALICE, code, 100, 3)], &[1]))?;
    assert_eq!(db.balance_of(ALICE, CORE_ASSET), 1_000_000 - 300 - 35);

    let cheque = db.cheque_by_code(code).unwrap();
    assert_eq!(cheque.status, ChequeStatus::New);
    assert_eq!(cheque.amount_remaining, 300);
    assert_eq!(cheque.unused_slot_count(), 3);

    // Bob and Carol each claim a slot.
    db.push_transaction(&tx(vec![cheque_use(BOB, code)], &[2]))?;
    assert_eq!(db.balance_of(BOB, CORE_ASSET), 100_100);
    assert_eq!(db.cheque_by_code(code).unwrap().amount_remaining, 200);

    db.push_transaction(&tx(vec![cheque_use(CAROL, code)], &[3]))?;
    assert_eq!(db.cheque_by_code(code).unwrap().amount_remaining, 100);
    assert_eq!(db.cheque_by_code(code).unwrap().status, ChequeStatus::New);

    // Dave consumes the last slot: terminal transition, stamped once.
    db.push_transaction(&tx(vec![cheque_use(DAVE, code)], &[4]))?;
    let cheque = db.cheque_by_code(code).unwrap();
    assert_eq!(cheque.status, ChequeStatus::Used);
    assert_eq!(cheque.amount_remaining, 0);
    assert!(cheque.datetime_used.is_some());
    assert!(cheque.payees.iter().all(|p| p.status == PayeeStatus::Used));

    // A further claim is rejected.
    let err = db
        .push_transaction(&tx(vec![cheque_use(BOB, code)], &[2]))
        .unwrap_err();
    assert!(matches!(err, OpError::ChequeAlreadyUsed { .. }));
    Ok(())
}

#[test]
fn test_cheque_code_validation_and_uniqueness() -> Result<()> {
    let mut db = setup();

    let err = db
        .push_transaction(&tx(vec![cheque_create(ALICE, "tooshort", 100, 1)], &[1]))
        .unwrap_err();
    assert!(matches!(err, OpError::InvalidChequeCode { .. }));

    db.push_transaction(&tx(vec![cheque_create(ALICE, "AAAABBBBCCCCDDDD", 100, 1)], &[1]))?;
    let err = db
        .push_transaction(&tx(vec![cheque_create(BOB, "AAAABBBBCCCCDDDD", 50, 1)], &[2]))
        .unwrap_err();
    assert!(matches!(err, OpError::ChequeCodeInUse(_)));
    Ok(())
}

#[test]
fn test_cheque_expiry_reverses_and_refunds() -> Result<()> {
    let mut db = setup();
    let code = "ZZZZYYYYXXXXWWWW";

    // Block 1 at t=100: cheque with window [0, 1000); Bob claims one of
    // two slots inside the same block.
    let block = block_on(
        &db,
        vec![
            tx(vec![cheque_create(ALICE, code, 100, 2)], &[1]),
            tx(vec![cheque_use(BOB, code)], &[2]),
        ],
        100,
    );
    db.apply_block(&block).unwrap();
    assert_eq!(db.cheque_by_code(code).unwrap().amount_remaining, 100);

    // Block 2 past the expiration: maintenance reverses the unused slot
    // and refunds Alice.
    let alice_before = db.balance_of(ALICE, CORE_ASSET);
    let block = block_on(&db, vec![], 1_500);
    db.apply_block(&block).unwrap();

    let cheque = db.cheque_by_code(code).unwrap();
    assert_eq!(cheque.status, ChequeStatus::Undone);
    assert_eq!(cheque.amount_remaining, 0);
    assert_eq!(cheque.payees[0].status, PayeeStatus::Used);
    assert_eq!(cheque.payees[1].status, PayeeStatus::Reversed);
    assert_eq!(db.balance_of(ALICE, CORE_ASSET), alice_before + 100);
    Ok(())
}

// =========================================================================
// Atomicity
// =========================================================================

#[test]
fn test_failed_transaction_leaves_no_trace() {
    let mut db = setup();
    let before = db.state_digest();

    // First operation would succeed; the second fails, so nothing of
    // the transaction may remain.
    let err = db
        .push_transaction(&tx(
            vec![transfer(ALICE, BOB, 100), transfer(ALICE, ALICE, 50)],
            &[1],
        ))
        .unwrap_err();
    assert!(matches!(err, OpError::SameAccount { .. }));
    assert_eq!(db.state_digest(), before);
}

#[test]
fn test_failed_block_rolls_back_entirely() {
    let mut db = setup();
    let before = db.state_digest();

    let block = block_on(
        &db,
        vec![
            tx(vec![transfer(ALICE, BOB, 100)], &[1]),
            // Unsigned: authority failure.
            tx(vec![transfer(CAROL, DAVE, 10)], &[9]),
        ],
        100,
    );
    let err = db.apply_block(&block).unwrap_err();
    assert!(matches!(err, BlockApplyError::TxFailed { index: 1, .. }));
    assert_eq!(db.state_digest(), before);
    assert_eq!(db.head_block_number(), 0);
}

#[test]
fn test_block_structural_rejection() {
    let mut db = setup();

    let mut block = block_on(&db, vec![tx(vec![transfer(ALICE, BOB, 5)], &[1])], 100);
    block.header.merkle_root = lib_ledger::Hash::new([7u8; 32]);
    let err = db.apply_block(&block).unwrap_err();
    assert!(matches!(err, BlockApplyError::InvalidMerkleRoot { .. }));

    let block = block_on(&db, vec![], 100);
    let mut wrong_height = block.clone();
    wrong_height.header.block_num = 5;
    let err = db.apply_block(&wrong_height).unwrap_err();
    assert!(matches!(err, BlockApplyError::HeightMismatch { .. }));
}

#[test]
fn test_block_advances_head_bookkeeping() -> Result<()> {
    let mut db = setup();
    let block = block_on(&db, vec![tx(vec![transfer(ALICE, BOB, 100)], &[1])], 100);
    let block_id = block.id();
    db.apply_block(&block).unwrap();

    assert_eq!(db.head_block_number(), 1);
    assert_eq!(db.head_block_id(), block_id);
    assert_eq!(db.head_block_time(), 100);
    assert_eq!(db.balance_of(BOB, CORE_ASSET), 100_100);
    Ok(())
}

#[test]
fn test_evaluate_transaction_has_no_side_effects() -> Result<()> {
    let mut db = setup();
    let before = db.state_digest();
    db.evaluate_transaction(&tx(vec![transfer(ALICE, BOB, 100)], &[1]))?;
    assert_eq!(db.state_digest(), before);
    Ok(())
}

// =========================================================================
// Authority
// =========================================================================

#[test]
fn test_unauthorized_transfer_rejected() {
    let mut db = setup();
    let err = db
        .push_transaction(&tx(vec![transfer(BOB, CAROL, 100)], &[9]))
        .unwrap_err();
    assert!(matches!(err, OpError::AuthorityNotSatisfied { .. }));
}

#[test]
fn test_authority_depth_bound_is_governance_tunable() -> Result<()> {
    let mut db = setup();

    let delegate_to = |account: AccountId| Authority {
        weight_threshold: 1,
        account_auths: BTreeMap::from([(account, 1)]),
        key_auths: BTreeMap::new(),
    };
    let create = |name: &str, authority: Authority| {
        Operation::AccountCreate(AccountCreateOperation {
            fee: AssetAmount::core(100),
            registrar: ALICE,
            name: name.to_string(),
            owner: authority.clone(),
            active: authority,
            extensions: vec![],
        })
    };

    // dd(4) holds the key; cc(5) -> dd, bb(6) -> cc, aa(7) -> bb.
    db.push_transaction(&tx(
        vec![
            create("dd", Authority::single_key(key(40))),
            create("cc", delegate_to(AccountId(4))),
            create("bb", delegate_to(AccountId(5))),
            create("aa", delegate_to(AccountId(6))),
        ],
        &[1],
    ))?;
    db.push_transaction(&tx(vec![transfer(ALICE, AccountId(7), 10_000)], &[1]))?;

    // Three nested hops exceed the default depth bound of two, and the
    // failure is loud.
    let err = db
        .push_transaction(&tx(vec![transfer(AccountId(7), ALICE, 100)], &[40]))
        .unwrap_err();
    assert!(matches!(err, OpError::MaxAuthorityDepthExceeded { .. }));

    // The committee raises the bound; the same signature now resolves.
    db.push_transaction(&tx(
        vec![Operation::CommitteeParamsUpdate(CommitteeParamsUpdateOperation {
            fee: AssetAmount::core(0),
            account: ALICE,
            maintenance_interval: None,
            max_authority_depth: Some(3),
            maximum_proposal_lifetime: None,
            fee_schedule: None,
            extensions: vec![],
        })],
        &[1],
    ))?;
    db.push_transaction(&tx(vec![transfer(AccountId(7), ALICE, 100)], &[40]))?;
    Ok(())
}

// =========================================================================
// Fees
// =========================================================================

#[test]
fn test_insufficient_fee_rejected() {
    let mut db = setup();
    let op = Operation::Transfer(TransferOperation {
        fee: AssetAmount::core(5), // schedule demands 10
        from: ALICE,
        to: BOB,
        amount: AssetAmount::core(100),
        extensions: vec![],
    });
    let err = db.push_transaction(&tx(vec![op], &[1])).unwrap_err();
    assert!(matches!(
        err,
        OpError::InsufficientFee {
            required: 10,
            declared: 5
        }
    ));
}

#[test]
fn test_fees_accumulate_into_core_asset_pool() -> Result<()> {
    let mut db = setup();
    db.push_transaction(&tx(vec![transfer(ALICE, BOB, 100)], &[1]))?;
    assert_eq!(db.asset(CORE_ASSET)?.accumulated_fees, 10);
    // Supply is untouched by fees.
    assert_eq!(db.asset(CORE_ASSET)?.current_supply, 1_300_000);
    Ok(())
}

// =========================================================================
// Settings Governance
// =========================================================================

#[test]
fn test_settings_update_is_a_sparse_patch() -> Result<()> {
    let mut db = setup();
    let cheque_fees_before = db.settings().cheque_fees;
    let transfer_fees_before = db.settings().transfer_fees;

    db.push_transaction(&tx(
        vec![Operation::SettingsUpdate(SettingsUpdateOperation {
            fee: AssetAmount::core(0),
            account: ALICE,
            transfer_fees: None,
            cheque_fees: None,
            edc_transfers_daily_limit: Some(500),
            extensions: vec![],
        })],
        &[1],
    ))?;

    // Only the present field changed.
    assert_eq!(db.settings().edc_transfers_daily_limit, 500);
    assert_eq!(db.settings().cheque_fees, cheque_fees_before);
    assert_eq!(db.settings().transfer_fees, transfer_fees_before);
    Ok(())
}

#[test]
fn test_settings_update_requires_committee_membership() {
    let mut db = setup();
    let err = db
        .push_transaction(&tx(
            vec![Operation::SettingsUpdate(SettingsUpdateOperation {
                fee: AssetAmount::core(0),
                account: BOB,
                transfer_fees: None,
                cheque_fees: None,
                edc_transfers_daily_limit: Some(1),
                extensions: vec![],
            })],
            &[2],
        ))
        .unwrap_err();
    assert!(matches!(err, OpError::NotCommitteeMember(BOB)));
}

#[test]
fn test_daily_transfer_limit_enforced() -> Result<()> {
    let mut db = setup();
    db.push_transaction(&tx(
        vec![Operation::SettingsUpdate(SettingsUpdateOperation {
            fee: AssetAmount::core(0),
            account: ALICE,
            transfer_fees: None,
            cheque_fees: None,
            edc_transfers_daily_limit: Some(500),
            extensions: vec![],
        })],
        &[1],
    ))?;

    db.push_transaction(&tx(vec![transfer(BOB, CAROL, 300)], &[2]))?;
    let err = db
        .push_transaction(&tx(vec![transfer(BOB, CAROL, 300)], &[2]))
        .unwrap_err();
    assert!(matches!(
        err,
        OpError::DailyLimitExceeded {
            account: BOB,
            limit: 500,
            attempted: 600
        }
    ));
    Ok(())
}

// =========================================================================
// Accounts, Membership, Witnesses
// =========================================================================

#[test]
fn test_account_create_rejects_duplicate_name() -> Result<()> {
    let mut db = setup();
    let op = Operation::AccountCreate(AccountCreateOperation {
        fee: AssetAmount::core(100),
        registrar: ALICE,
        name: "bob".to_string(),
        owner: Authority::single_key(key(7)),
        active: Authority::single_key(key(7)),
        extensions: vec![],
    });
    let err = db.push_transaction(&tx(vec![op], &[1])).unwrap_err();
    assert!(matches!(err, OpError::AccountNameInUse(_)));
    Ok(())
}

#[test]
fn test_witness_create_requires_lifetime_membership() -> Result<()> {
    let mut db = setup();
    let witness_op = |account| {
        Operation::WitnessCreate(WitnessCreateOperation {
            fee: AssetAmount::core(5_000),
            witness_account: account,
            signing_key: key(2),
            url: "https://example.net".to_string(),
            extensions: vec![],
        })
    };

    let err = db
        .push_transaction(&tx(vec![witness_op(BOB)], &[2]))
        .unwrap_err();
    assert!(matches!(err, OpError::NotLifetimeMember(BOB)));

    db.push_transaction(&tx(
        vec![Operation::AccountUpgrade(AccountUpgradeOperation {
            fee: AssetAmount::core(10_000),
            account_to_upgrade: BOB,
            upgrade_to_lifetime: true,
            extensions: vec![],
        })],
        &[2],
    ))?;
    db.push_transaction(&tx(vec![witness_op(BOB)], &[2]))?;

    // Vote ids are sequential; the genesis witness took 0.
    let witness = db.witness_by_account(BOB).unwrap();
    assert_eq!(witness.vote_id, 1);
    Ok(())
}

// =========================================================================
// Funds
// =========================================================================

#[test]
fn test_fund_deposit_matures_through_maintenance() -> Result<()> {
    let mut db = setup();
    db.push_transaction(&tx(
        vec![Operation::FundCreate(FundCreateOperation {
            fee: AssetAmount::core(100),
            owner: ALICE,
            name: "growth".to_string(),
            asset_id: CORE_ASSET,
            extensions: vec![],
        })],
        &[1],
    ))?;

    let bob_before = db.balance_of(BOB, CORE_ASSET);
    db.push_transaction(&tx(
        vec![Operation::FundDeposit(FundDepositOperation {
            fee: AssetAmount::core(10),
            depositor: BOB,
            fund: FundId(0),
            amount: AssetAmount::core(5_000),
            period_seconds: 3_600,
            extensions: vec![],
        })],
        &[2],
    ))?;
    assert_eq!(db.balance_of(BOB, CORE_ASSET), bob_before - 5_010);
    assert_eq!(db.fund(FundId(0))?.balance, 5_000);

    // A block past maturity returns the principal.
    let block = block_on(&db, vec![], 3_601);
    db.apply_block(&block).unwrap();
    assert_eq!(db.balance_of(BOB, CORE_ASSET), bob_before - 10);
    assert_eq!(db.fund(FundId(0))?.balance, 0);
    assert!(db.fund(FundId(0))?.deposits.is_empty());
    Ok(())
}

// =========================================================================
// Proposals
// =========================================================================

#[test]
fn test_proposal_executes_on_final_approval() -> Result<()> {
    let mut db = setup();

    // Alice proposes a transfer out of Bob's account.
    db.push_transaction(&tx(
        vec![Operation::ProposalCreate(ProposalCreateOperation {
            fee: AssetAmount::core(50),
            proposer: ALICE,
            proposed_ops: vec![transfer(BOB, CAROL, 1_000)],
            expiration: 10_000,
            review_period_seconds: None,
            extensions: vec![],
        })],
        &[1],
    ))?;
    let proposal = db.proposal(ProposalId(0))?;
    assert!(proposal.required_active_approvals.contains(&BOB));
    assert!(!proposal.is_authorized());

    let carol_before = db.balance_of(CAROL, CORE_ASSET);

    // Bob approves; the proposal executes and is removed.
    db.push_transaction(&tx(
        vec![Operation::ProposalUpdate(ProposalUpdateOperation {
            fee: AssetAmount::core(10),
            payer: BOB,
            proposal: ProposalId(0),
            active_approvals_to_add: [BOB].into(),
            active_approvals_to_remove: Default::default(),
            owner_approvals_to_add: Default::default(),
            owner_approvals_to_remove: Default::default(),
            key_approvals_to_add: Default::default(),
            key_approvals_to_remove: Default::default(),
            extensions: vec![],
        })],
        &[2],
    ))?;

    assert_eq!(db.balance_of(CAROL, CORE_ASSET), carol_before + 1_000);
    assert!(matches!(
        db.proposal(ProposalId(0)),
        Err(OpError::ProposalNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_irrelevant_approval_rejected() -> Result<()> {
    let mut db = setup();
    db.push_transaction(&tx(
        vec![Operation::ProposalCreate(ProposalCreateOperation {
            fee: AssetAmount::core(50),
            proposer: ALICE,
            proposed_ops: vec![transfer(BOB, CAROL, 1_000)],
            expiration: 10_000,
            review_period_seconds: None,
            extensions: vec![],
        })],
        &[1],
    ))?;

    // Dave's approval was never required.
    let err = db
        .push_transaction(&tx(
            vec![Operation::ProposalUpdate(ProposalUpdateOperation {
                fee: AssetAmount::core(10),
                payer: DAVE,
                proposal: ProposalId(0),
                active_approvals_to_add: [DAVE].into(),
                active_approvals_to_remove: Default::default(),
                owner_approvals_to_add: Default::default(),
                owner_approvals_to_remove: Default::default(),
                key_approvals_to_add: Default::default(),
                key_approvals_to_remove: Default::default(),
                extensions: vec![],
            })],
            &[4],
        ))
        .unwrap_err();
    assert!(matches!(err, OpError::IrrelevantApproval { .. }));
    Ok(())
}

#[test]
fn test_unapproved_proposal_expires_through_maintenance() -> Result<()> {
    let mut db = setup();
    db.push_transaction(&tx(
        vec![Operation::ProposalCreate(ProposalCreateOperation {
            fee: AssetAmount::core(50),
            proposer: ALICE,
            proposed_ops: vec![transfer(BOB, CAROL, 1_000)],
            expiration: 500,
            review_period_seconds: None,
            extensions: vec![],
        })],
        &[1],
    ))?;

    let carol_before = db.balance_of(CAROL, CORE_ASSET);
    let block = block_on(&db, vec![], 600);
    db.apply_block(&block).unwrap();

    // Removed without executing.
    assert!(matches!(
        db.proposal(ProposalId(0)),
        Err(OpError::ProposalNotFound(_))
    ));
    assert_eq!(db.balance_of(CAROL, CORE_ASSET), carol_before);
    Ok(())
}

#[test]
fn test_proposal_lifetime_bound() {
    let mut db = setup();
    let max = db.global_properties().parameters.maximum_proposal_lifetime;
    let err = db
        .push_transaction(&tx(
            vec![Operation::ProposalCreate(ProposalCreateOperation {
                fee: AssetAmount::core(50),
                proposer: ALICE,
                proposed_ops: vec![transfer(BOB, CAROL, 1)],
                expiration: max + 1,
                review_period_seconds: None,
                extensions: vec![],
            })],
            &[1],
        ))
        .unwrap_err();
    assert!(matches!(err, OpError::ProposalLifetimeTooLong { .. }));
}
