//! Database facade
//!
//! Owns every object index and exposes the only mutating entry points:
//! `push_transaction`, `evaluate_transaction` and `apply_block`. All
//! state changes run inside undo sessions so a failed transaction or
//! block leaves no observable effects.
//!
//! # Processing Pipeline
//!
//! For each operation of a transaction:
//!
//! 1. Resolve the fee payer and check the declared fee against the
//!    active schedule (core asset only).
//! 2. `evaluate` - read-only precondition checks, no state touched.
//! 3. Charge the fee: debit the payer, accumulate into the core asset's
//!    fee pool.
//! 4. `apply` - mutate state through the indices.
//!
//! Authority over the whole transaction is verified once, against the
//! union of every operation's requirements.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::authority::{verify_account_authority, verify_literal_authority};
use crate::block::{SignedBlock, SignedTransaction};
use crate::evaluator::{self, EvalContext};
use crate::objects::account::{Account, Authority, AuthorityLevel, MembershipStatus};
use crate::objects::asset::{Asset, Balance};
use crate::objects::cheque::{Cheque, ChequeStatus, PayeeStatus};
use crate::objects::fund::{Fund, FundDeposit};
use crate::objects::proposal::Proposal;
use crate::objects::settings::{GlobalProperties, Settings};
use crate::objects::witness::{CommitteeMember, Witness};
use crate::objects::DbObject;
use crate::operations::Operation;
use crate::types::{
    AccountId, AssetId, BalanceId, CommitteeMemberId, FundId, Hash, ProposalId, PublicKey,
    SettingsId, Timestamp, WitnessId, CORE_ASSET,
};
use crate::validation::{
    self, BlockApplyError, BlockApplyResult, OpError, OpResult,
};

use super::genesis::GenesisConfig;
use super::index::ObjectIndex;

/// Instance number of each singleton object
const SINGLETON: u64 = 0;

/// In-memory chain state and its application loop
pub struct Database {
    pub(crate) accounts: ObjectIndex<Account>,
    pub(crate) assets: ObjectIndex<Asset>,
    pub(crate) balances: ObjectIndex<Balance>,
    pub(crate) cheques: ObjectIndex<Cheque>,
    pub(crate) funds: ObjectIndex<Fund>,
    pub(crate) proposals: ObjectIndex<Proposal>,
    pub(crate) witnesses: ObjectIndex<Witness>,
    pub(crate) committee_members: ObjectIndex<CommitteeMember>,
    global_properties: ObjectIndex<GlobalProperties>,
    settings: ObjectIndex<Settings>,
}

impl Database {
    /// Build the initial state from a genesis configuration.
    pub fn new(genesis: GenesisConfig) -> Self {
        let mut db = Self {
            accounts: ObjectIndex::new(),
            assets: ObjectIndex::new(),
            balances: ObjectIndex::new(),
            cheques: ObjectIndex::new(),
            funds: ObjectIndex::new(),
            proposals: ObjectIndex::new(),
            witnesses: ObjectIndex::new(),
            committee_members: ObjectIndex::new(),
            global_properties: ObjectIndex::new(),
            settings: ObjectIndex::new(),
        };

        db.settings.create(|i| {
            let mut settings = genesis.settings.clone();
            settings.id = SettingsId(i);
            settings
        });

        let total_supply: i64 = genesis.accounts.iter().map(|a| a.initial_balance).sum();
        db.assets.create(|i| Asset {
            id: AssetId(i),
            symbol: genesis.core_asset_symbol.clone(),
            precision: genesis.core_asset_precision,
            issuer: AccountId(0),
            current_supply: total_supply,
            max_supply: genesis.core_asset_max_supply,
            accumulated_fees: 0,
        });

        let mut vote_ids: u32 = 0;
        for seed in &genesis.accounts {
            let account_id = db
                .accounts
                .create(|i| Account {
                    id: AccountId(i),
                    name: seed.name.clone(),
                    registrar: AccountId(i),
                    owner: Authority::single_key(seed.key),
                    active: Authority::single_key(seed.key),
                    membership: if seed.is_lifetime_member {
                        MembershipStatus::Lifetime
                    } else {
                        MembershipStatus::Basic
                    },
                    whitelisted_accounts: BTreeSet::new(),
                    blacklisted_accounts: BTreeSet::new(),
                    transferred_today: 0,
                    transfer_day: 0,
                })
                .id;

            if seed.initial_balance > 0 {
                db.balances.create(|i| Balance {
                    id: BalanceId(i),
                    owner: account_id,
                    asset_id: CORE_ASSET,
                    balance: seed.initial_balance,
                });
            }
            if seed.is_committee_member {
                db.committee_members.create(|i| CommitteeMember {
                    id: CommitteeMemberId(i),
                    committee_member_account: account_id,
                    url: String::new(),
                });
            }
            if seed.is_witness {
                let vote_id = vote_ids;
                vote_ids += 1;
                db.witnesses.create(|i| Witness {
                    id: WitnessId(i),
                    witness_account: account_id,
                    signing_key: seed.key,
                    url: String::new(),
                    vote_id,
                    total_missed: 0,
                });
            }
        }

        db.global_properties.create(|_| {
            let mut props =
                GlobalProperties::at_genesis(genesis.parameters.clone(), genesis.genesis_time);
            props.next_vote_id = vote_ids;
            props
        });

        info!(
            accounts = genesis.accounts.len(),
            supply = total_supply,
            "database initialized from genesis"
        );
        db
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn global_properties(&self) -> &GlobalProperties {
        self.global_properties
            .get(SINGLETON)
            .expect("global properties singleton created at genesis")
    }

    pub fn settings(&self) -> &Settings {
        self.settings
            .get(SINGLETON)
            .expect("settings singleton created at genesis")
    }

    pub fn head_block_number(&self) -> u64 {
        self.global_properties().head_block_number
    }

    pub fn head_block_id(&self) -> Hash {
        self.global_properties().head_block_id
    }

    pub fn head_block_time(&self) -> Timestamp {
        self.global_properties().head_block_time
    }

    pub fn account(&self, id: AccountId) -> OpResult<&Account> {
        self.accounts.get(id.0).ok_or(OpError::AccountNotFound(id))
    }

    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        self.accounts.find_by_key(name.as_bytes())
    }

    pub fn asset(&self, id: AssetId) -> OpResult<&Asset> {
        self.assets.get(id.0).ok_or(OpError::AssetNotFound(id))
    }

    /// Balance of `account` in `asset`; accounts with no balance object
    /// hold zero.
    pub fn balance_of(&self, account: AccountId, asset: AssetId) -> i64 {
        self.balances
            .find_by_key(&Balance::key_for(account, asset))
            .map(|b| b.balance)
            .unwrap_or(0)
    }

    pub fn cheque_by_code(&self, code: &str) -> Option<&Cheque> {
        self.cheques.find_by_key(code.as_bytes())
    }

    pub fn fund(&self, id: FundId) -> OpResult<&Fund> {
        self.funds.get(id.0).ok_or(OpError::FundNotFound(id))
    }

    pub fn proposal(&self, id: ProposalId) -> OpResult<&Proposal> {
        self.proposals
            .get(id.0)
            .ok_or(OpError::ProposalNotFound(id))
    }

    pub fn witness_by_account(&self, account: AccountId) -> Option<&Witness> {
        self.witnesses.iter().find(|w| w.witness_account == account)
    }

    pub fn is_committee_member(&self, account: AccountId) -> bool {
        self.committee_members
            .iter()
            .any(|m| m.committee_member_account == account)
    }

    /// Digest over the complete object state, for equality checks in
    /// replay and rollback verification.
    pub fn state_digest(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        digest_index(&mut hasher, &self.accounts);
        digest_index(&mut hasher, &self.assets);
        digest_index(&mut hasher, &self.balances);
        digest_index(&mut hasher, &self.cheques);
        digest_index(&mut hasher, &self.funds);
        digest_index(&mut hasher, &self.proposals);
        digest_index(&mut hasher, &self.witnesses);
        digest_index(&mut hasher, &self.committee_members);
        digest_index(&mut hasher, &self.global_properties);
        digest_index(&mut hasher, &self.settings);
        Hash::new(*hasher.finalize().as_bytes())
    }

    // =========================================================================
    // Mutation Primitives (evaluator support)
    // =========================================================================

    /// Increase `account`'s balance in `asset`, creating the balance
    /// object on first touch.
    pub(crate) fn credit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: i64,
    ) -> OpResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let key = Balance::key_for(account, asset);
        match self.balances.find_by_key(&key).map(|b| b.id.0) {
            Some(instance) => self.balances.modify(instance, |b| b.balance += amount)?,
            None => {
                self.balances.create(|i| Balance {
                    id: BalanceId(i),
                    owner: account,
                    asset_id: asset,
                    balance: amount,
                });
            }
        }
        Ok(())
    }

    /// Decrease `account`'s balance in `asset`; fails without mutating
    /// when funds are insufficient.
    pub(crate) fn debit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: i64,
    ) -> OpResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let have = self.balance_of(account, asset);
        if have < amount {
            return Err(OpError::InsufficientBalance {
                account,
                asset,
                have,
                need: amount,
            });
        }
        let key = Balance::key_for(account, asset);
        let instance = self
            .balances
            .find_by_key(&key)
            .map(|b| b.id.0)
            .ok_or_else(|| OpError::Invariant(format!("balance object missing for {account}")))?;
        self.balances.modify(instance, |b| b.balance -= amount)?;
        Ok(())
    }

    /// Debit the fee from `payer` and accumulate it into the core
    /// asset's fee pool. Supply is unchanged.
    pub(crate) fn charge_fee(&mut self, payer: AccountId, amount: i64) -> OpResult<()> {
        self.debit(payer, CORE_ASSET, amount)?;
        self.assets
            .modify(CORE_ASSET.0, |a| a.accumulated_fees += amount)?;
        Ok(())
    }

    pub(crate) fn modify_global_properties(
        &mut self,
        mutator: impl FnOnce(&mut GlobalProperties),
    ) -> OpResult<()> {
        Ok(self.global_properties.modify(SINGLETON, mutator)?)
    }

    pub(crate) fn modify_settings(
        &mut self,
        mutator: impl FnOnce(&mut Settings),
    ) -> OpResult<()> {
        Ok(self.settings.modify(SINGLETON, mutator)?)
    }

    /// Hand out the next sequential vote id.
    pub(crate) fn allocate_vote_id(&mut self) -> OpResult<u32> {
        let vote_id = self.global_properties().next_vote_id;
        self.modify_global_properties(|props| props.next_vote_id += 1)?;
        Ok(vote_id)
    }

    // =========================================================================
    // Undo Sessions
    // =========================================================================

    pub(crate) fn begin_undo_session(&mut self) {
        self.accounts.begin_undo_session();
        self.assets.begin_undo_session();
        self.balances.begin_undo_session();
        self.cheques.begin_undo_session();
        self.funds.begin_undo_session();
        self.proposals.begin_undo_session();
        self.witnesses.begin_undo_session();
        self.committee_members.begin_undo_session();
        self.global_properties.begin_undo_session();
        self.settings.begin_undo_session();
    }

    pub(crate) fn commit_undo_session(&mut self) {
        self.accounts.commit_undo_session();
        self.assets.commit_undo_session();
        self.balances.commit_undo_session();
        self.cheques.commit_undo_session();
        self.funds.commit_undo_session();
        self.proposals.commit_undo_session();
        self.witnesses.commit_undo_session();
        self.committee_members.commit_undo_session();
        self.global_properties.commit_undo_session();
        self.settings.commit_undo_session();
    }

    pub(crate) fn undo_session(&mut self) {
        self.accounts.undo_session();
        self.assets.undo_session();
        self.balances.undo_session();
        self.cheques.undo_session();
        self.funds.undo_session();
        self.proposals.undo_session();
        self.witnesses.undo_session();
        self.committee_members.undo_session();
        self.global_properties.undo_session();
        self.settings.undo_session();
    }

    // =========================================================================
    // Transaction Application
    // =========================================================================

    /// Apply a transaction against the head state. All-or-nothing: on
    /// any failure the state is exactly as before the call.
    pub fn push_transaction(&mut self, tx: &SignedTransaction) -> OpResult<()> {
        let now = self.head_block_time();
        self.begin_undo_session();
        match self.apply_transaction(tx, now, true) {
            Ok(()) => {
                self.commit_undo_session();
                debug!(tx = %tx.id(), "transaction applied");
                Ok(())
            }
            Err(err) => {
                self.undo_session();
                debug!(tx = %tx.id(), %err, "transaction rejected");
                Err(err)
            }
        }
    }

    /// Dry-run a transaction: full evaluation and application inside a
    /// session that is always rolled back.
    pub fn evaluate_transaction(&mut self, tx: &SignedTransaction) -> OpResult<()> {
        let now = self.head_block_time();
        self.begin_undo_session();
        let result = self.apply_transaction(tx, now, true);
        self.undo_session();
        result
    }

    /// Authorities a transaction demands, unioned over its operations:
    /// account ids needing active authority, account ids needing owner
    /// authority, and literal key authorities.
    pub fn required_authorities(
        &self,
        tx: &SignedTransaction,
    ) -> (BTreeSet<AccountId>, BTreeSet<AccountId>, Vec<Authority>) {
        let mut active = BTreeSet::new();
        let mut owner = BTreeSet::new();
        let mut other = Vec::new();
        for op in &tx.operations {
            op.required_authorities(&mut active, &mut owner, &mut other);
        }
        (active, owner, other)
    }

    fn apply_transaction(
        &mut self,
        tx: &SignedTransaction,
        now: Timestamp,
        check_authority: bool,
    ) -> OpResult<()> {
        validation::validate_transaction_structure(tx, now)?;
        if check_authority {
            self.check_transaction_authority(tx)?;
        }

        let ctx = EvalContext { now };
        for op in &tx.operations {
            self.apply_operation(op, &ctx)?;
        }
        Ok(())
    }

    fn check_transaction_authority(&self, tx: &SignedTransaction) -> OpResult<()> {
        let signing_keys: BTreeSet<PublicKey> = tx.signed_by.iter().copied().collect();
        let (active, owner, other) = self.required_authorities(tx);
        let max_depth = self.global_properties().parameters.max_authority_depth;

        for account in &owner {
            verify_account_authority(
                &self.accounts,
                &signing_keys,
                *account,
                AuthorityLevel::Owner,
                max_depth,
            )?;
        }
        for account in &active {
            // Owner keys may stand in for an active requirement, never
            // the other way around.
            match verify_account_authority(
                &self.accounts,
                &signing_keys,
                *account,
                AuthorityLevel::Active,
                max_depth,
            ) {
                Ok(()) => {}
                Err(err @ OpError::AuthorityNotSatisfied { .. }) => {
                    verify_account_authority(
                        &self.accounts,
                        &signing_keys,
                        *account,
                        AuthorityLevel::Owner,
                        max_depth,
                    )
                    .map_err(|_| err)?;
                }
                Err(err) => return Err(err),
            }
        }
        for authority in &other {
            verify_literal_authority(&self.accounts, &signing_keys, authority, max_depth)?;
        }
        Ok(())
    }

    /// Run one operation through the fee and evaluator pipeline.
    pub(crate) fn apply_operation(&mut self, op: &Operation, ctx: &EvalContext) -> OpResult<()> {
        let fee = op.fee();
        if fee.asset_id != CORE_ASSET {
            return Err(OpError::FeeNotInCoreAsset {
                asset: fee.asset_id,
            });
        }
        let required = self
            .global_properties()
            .parameters
            .fee_schedule
            .required_fee(op);
        if fee.amount < 0 || (fee.amount as u64) < required {
            return Err(OpError::InsufficientFee {
                required,
                declared: fee.amount,
            });
        }

        let payer = op.fee_payer();
        self.account(payer)?;

        evaluator::evaluate(self, op, ctx)?;
        self.charge_fee(payer, fee.amount)?;
        evaluator::apply(self, op, ctx)?;

        debug!(kind = op.kind_name(), payer = %payer, fee = fee.amount, "operation applied");
        Ok(())
    }

    // =========================================================================
    // Block Application
    // =========================================================================

    /// Apply a block on top of the current head. Atomic at block
    /// granularity: one failing transaction rejects the whole block.
    pub fn apply_block(&mut self, block: &SignedBlock) -> BlockApplyResult<()> {
        let (head_number, head_id, head_time) = {
            let props = self.global_properties();
            (
                props.head_block_number,
                props.head_block_id,
                props.head_block_time,
            )
        };
        validation::validate_block_structure(block, head_number, head_id, head_time)?;
        if self.witnesses.get(block.header.witness.0).is_none() {
            return Err(BlockApplyError::UnknownWitness(block.header.witness));
        }

        self.begin_undo_session();
        for (index, tx) in block.transactions.iter().enumerate() {
            self.begin_undo_session();
            match self.apply_transaction(tx, block.header.timestamp, true) {
                Ok(()) => self.commit_undo_session(),
                Err(source) => {
                    self.undo_session();
                    self.undo_session();
                    warn!(
                        block = block.header.block_num,
                        index,
                        %source,
                        "block rejected: transaction failed"
                    );
                    return Err(BlockApplyError::TxFailed { index, source });
                }
            }
        }

        match self.finish_block(block) {
            Ok(()) => {
                self.commit_undo_session();
                info!(
                    block = block.header.block_num,
                    transactions = block.transactions.len(),
                    "block applied"
                );
                Ok(())
            }
            Err(source) => {
                self.undo_session();
                Err(BlockApplyError::Bookkeeping { source })
            }
        }
    }

    /// Head bookkeeping and the periodic maintenance pass, inside the
    /// block's undo session.
    fn finish_block(&mut self, block: &SignedBlock) -> OpResult<()> {
        let block_id = block.id();
        let header = &block.header;
        self.modify_global_properties(|props| {
            props.head_block_number = header.block_num;
            props.head_block_id = block_id;
            props.head_block_time = header.timestamp;
        })?;

        let interval = self
            .global_properties()
            .parameters
            .maintenance_interval
            .max(1);
        if header.block_num % interval == 0 {
            self.run_maintenance(header.timestamp)?;
        }
        Ok(())
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Deterministic periodic cleanup: expired cheques are reversed and
    /// refunded, matured fund deposits returned, expired proposals
    /// settled. Iteration follows index order, so every node derives the
    /// same result.
    fn run_maintenance(&mut self, now: Timestamp) -> OpResult<()> {
        self.expire_cheques(now)?;
        self.mature_fund_deposits(now)?;
        self.settle_proposals(now)?;
        Ok(())
    }

    fn expire_cheques(&mut self, now: Timestamp) -> OpResult<()> {
        let expired: Vec<u64> = self
            .cheques
            .iter()
            .filter(|c| c.status == ChequeStatus::New && now >= c.expiration)
            .map(|c| c.id.0)
            .collect();

        for instance in expired {
            let (drawer, asset_id, refund) = {
                let cheque = self
                    .cheques
                    .get(instance)
                    .ok_or_else(|| OpError::Invariant(format!("cheque {instance} vanished")))?;
                (cheque.drawer, cheque.asset_id, cheque.amount_remaining)
            };
            self.credit(drawer, asset_id, refund)?;
            self.cheques.modify(instance, |cheque| {
                for slot in &mut cheque.payees {
                    if slot.status == PayeeStatus::Unused {
                        slot.status = PayeeStatus::Reversed;
                    }
                }
                cheque.amount_remaining = 0;
                cheque.status = ChequeStatus::Undone;
            })?;
            debug!(cheque = instance, refund, "expired cheque reversed");
        }
        Ok(())
    }

    fn mature_fund_deposits(&mut self, now: Timestamp) -> OpResult<()> {
        let touched: Vec<u64> = self
            .funds
            .iter()
            .filter(|f| f.deposits.iter().any(|d| now >= d.matures_at))
            .map(|f| f.id.0)
            .collect();

        for instance in touched {
            let (asset_id, matured) = {
                let fund = self
                    .funds
                    .get(instance)
                    .ok_or_else(|| OpError::Invariant(format!("fund {instance} vanished")))?;
                let matured: Vec<FundDeposit> = fund
                    .deposits
                    .iter()
                    .filter(|d| now >= d.matures_at)
                    .cloned()
                    .collect();
                (fund.asset_id, matured)
            };

            let total: i64 = matured.iter().map(|d| d.amount).sum();
            for deposit in &matured {
                self.credit(deposit.depositor, asset_id, deposit.amount)?;
            }
            self.funds.modify(instance, |fund| {
                fund.deposits.retain(|d| now < d.matures_at);
                fund.balance -= total;
            })?;
            debug!(fund = instance, returned = total, "matured deposits returned");
        }
        Ok(())
    }

    fn settle_proposals(&mut self, now: Timestamp) -> OpResult<()> {
        let expired: Vec<u64> = self
            .proposals
            .iter()
            .filter(|p| p.is_expired(now))
            .map(|p| p.id.0)
            .collect();

        for instance in expired {
            let proposal = self.proposals.remove(instance)?;
            if proposal.is_authorized() {
                if let Err(err) = self.execute_ops_in_session(&proposal.proposed_ops, now) {
                    warn!(proposal = instance, %err, "approved proposal failed at expiration");
                }
            } else {
                debug!(proposal = instance, "unapproved proposal expired");
            }
        }
        Ok(())
    }

    // =========================================================================
    // Proposal Execution
    // =========================================================================

    /// Execute a proposal's operations if it is fully approved and past
    /// any review period. The proposal is removed whether execution
    /// succeeds or fails; a failed execution rolls back its own nested
    /// session without failing the enclosing transaction.
    pub(crate) fn try_execute_proposal(
        &mut self,
        instance: u64,
        now: Timestamp,
    ) -> OpResult<()> {
        let Some(proposal) = self.proposals.get(instance) else {
            return Ok(());
        };
        if !proposal.is_authorized() || proposal.in_review_period(now) {
            return Ok(());
        }

        let proposal = self.proposals.remove(instance)?;
        match self.execute_ops_in_session(&proposal.proposed_ops, now) {
            Ok(()) => {
                debug!(proposal = instance, "proposal executed");
            }
            Err(err) => {
                warn!(proposal = instance, %err, "fully approved proposal failed to execute");
            }
        }
        Ok(())
    }

    /// Run operations in a nested session: commit all or roll back all.
    /// Authority is not re-checked; collected approvals stand in for
    /// signatures.
    fn execute_ops_in_session(&mut self, ops: &[Operation], now: Timestamp) -> OpResult<()> {
        self.begin_undo_session();
        let ctx = EvalContext { now };
        for op in ops {
            if let Err(err) = self.apply_operation(op, &ctx) {
                self.undo_session();
                return Err(err);
            }
        }
        self.commit_undo_session();
        Ok(())
    }
}

fn digest_index<T: DbObject>(hasher: &mut blake3::Hasher, index: &ObjectIndex<T>) {
    let objects: Vec<&T> = index.iter().collect();
    let bytes = bincode::serialize(&objects).expect("canonical encoding cannot fail");
    hasher.update(&(objects.len() as u64).to_le_bytes());
    hasher.update(&bytes);
}
