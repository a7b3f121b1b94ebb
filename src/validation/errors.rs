//! Error taxonomy
//!
//! Two levels, mirroring the two rollback granularities:
//!
//! - `OpError` - raised inside operation evaluation/application; aborts
//!   the enclosing transaction and rolls back its undo session. Covers
//!   validation failures (malformed fields, rejected before any state
//!   touch), precondition failures (missing objects, insufficient
//!   balance, unsatisfied authority, expired windows), resource-limit
//!   failures (authority recursion bound) and internal invariant
//!   violations.
//! - `BlockApplyError` - structural block failures (bad linkage, bad
//!   merkle root) plus a wrapped `OpError` with the failing transaction
//!   index; aborts the whole block.
//!
//! Every variant carries the human-readable context (which account,
//! which amount) the submitter needs for debugging. No partial effects
//! are observable for a rejected transaction.

use thiserror::Error;

use crate::objects::account::AuthorityLevel;
use crate::types::{
    AccountId, AssetAmount, AssetId, FundId, Hash, ProposalId, Timestamp, WitnessId,
};

/// Failure inside operation evaluation or application
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpError {
    // =========================================================================
    // Validation Errors (rejected before any state touch)
    // =========================================================================

    #[error("Invalid cheque code {code:?}: must be 16 alphanumeric characters")]
    InvalidChequeCode { code: String },

    #[error("Invalid amount {amount}: must be positive")]
    InvalidAmount { amount: AssetAmount },

    #[error("Invalid payee count {count}: must be at least 1")]
    InvalidPayeeCount { count: u32 },

    #[error("Sender and receiver are the same account: {account}")]
    SameAccount { account: AccountId },

    #[error("Invalid time window: valid_from {valid_from} not before expiration {expiration}")]
    InvalidWindow {
        valid_from: Timestamp,
        expiration: Timestamp,
    },

    #[error("Authority for {account} can never be satisfied (total weight below threshold)")]
    ImpossibleAuthority { account: AccountId },

    #[error("Invalid account name {name:?}")]
    InvalidAccountName { name: String },

    #[error("Proposal lifetime {lifetime}s exceeds maximum {max}s")]
    ProposalLifetimeTooLong { lifetime: u64, max: u64 },

    #[error("Invalid fund name {name:?}")]
    InvalidFundName { name: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Transaction has no operations")]
    EmptyTransaction,

    // =========================================================================
    // Fee Errors
    // =========================================================================

    #[error("Fee must be paid in the core asset, got {asset}")]
    FeeNotInCoreAsset { asset: AssetId },

    #[error("Insufficient fee: required {required}, declared {declared}")]
    InsufficientFee { required: u64, declared: i64 },

    // =========================================================================
    // Precondition Errors (referenced state missing or unacceptable)
    // =========================================================================

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account name already in use: {0:?}")]
    AccountNameInUse(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("Insufficient balance: account {account} has {have} of {asset}, needs {need}")]
    InsufficientBalance {
        account: AccountId,
        asset: AssetId,
        have: i64,
        need: i64,
    },

    #[error("Cheque code already in use: {0:?}")]
    ChequeCodeInUse(String),

    #[error("Cheque not found for code {0:?}")]
    ChequeNotFound(String),

    #[error("Cheque {code:?} is already fully used")]
    ChequeAlreadyUsed { code: String },

    #[error("Cheque {code:?} is not claimable at {now}: window is [{valid_from}, {expiration})")]
    ChequeNotActive {
        code: String,
        now: Timestamp,
        valid_from: Timestamp,
        expiration: Timestamp,
    },

    #[error("Fund not found: {0}")]
    FundNotFound(FundId),

    #[error("Fund name already in use: {0:?}")]
    FundNameInUse(String),

    #[error("Fund {0} is disabled")]
    FundDisabled(FundId),

    #[error("Fund {fund} holds {expected}, deposit offered {got}")]
    FundAssetMismatch {
        fund: FundId,
        expected: AssetId,
        got: AssetId,
    },

    #[error("Account {0} already has a witness")]
    WitnessAlreadyExists(AccountId),

    #[error("Account {0} is not a lifetime member")]
    NotLifetimeMember(AccountId),

    #[error("Account {0} is not a committee member")]
    NotCommitteeMember(AccountId),

    #[error("Account {to} does not accept transfers from {from}")]
    Blacklisted { from: AccountId, to: AccountId },

    #[error("Daily transfer limit exceeded for {account}: limit {limit}, attempted total {attempted}")]
    DailyLimitExceeded {
        account: AccountId,
        limit: i64,
        attempted: i64,
    },

    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Proposal {proposal} expired at {expiration}, now {now}")]
    ProposalExpired {
        proposal: ProposalId,
        expiration: Timestamp,
        now: Timestamp,
    },

    #[error("Approval {approval} was never required by proposal {proposal}")]
    IrrelevantApproval {
        proposal: ProposalId,
        approval: AccountId,
    },

    // =========================================================================
    // Authority Errors
    // =========================================================================

    #[error("{level:?} authority of account {account} not satisfied by provided signatures")]
    AuthorityNotSatisfied {
        account: AccountId,
        level: AuthorityLevel,
    },

    #[error("Key authority not satisfied by provided signatures")]
    KeyAuthorityNotSatisfied,

    #[error("Authority resolution for {account} exceeded maximum recursion depth {max_depth}")]
    MaxAuthorityDepthExceeded { account: AccountId, max_depth: u8 },

    // =========================================================================
    // Transaction-Level Errors
    // =========================================================================

    #[error("Transaction expired at {expiration}, head time is {now}")]
    TransactionExpired { expiration: Timestamp, now: Timestamp },

    // =========================================================================
    // Invariant Violations (internal bugs, fatal for the transaction)
    // =========================================================================

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

/// Failure applying a whole block
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockApplyError {
    #[error("Block height mismatch: expected {expected}, got {actual}")]
    HeightMismatch { expected: u64, actual: u64 },

    #[error("Unlinkable block: previous id {actual} does not match head {expected}")]
    PreviousIdMismatch { expected: Hash, actual: Hash },

    #[error("Merkle root mismatch: header declares {declared}, computed {computed}")]
    InvalidMerkleRoot { declared: Hash, computed: Hash },

    #[error("Block timestamp {timestamp} is not after head time {head}")]
    TimestampBeforeHead { timestamp: Timestamp, head: Timestamp },

    #[error("Block names unknown witness {0}")]
    UnknownWitness(WitnessId),

    #[error("Transaction {index} failed: {source}")]
    TxFailed { index: usize, source: OpError },

    #[error("Post-transaction block bookkeeping failed: {source}")]
    Bookkeeping { source: OpError },
}

/// Result type for operation/transaction processing
pub type OpResult<T> = Result<T, OpError>;

/// Result type for block application
pub type BlockApplyResult<T> = Result<T, BlockApplyError>;
