//! Ledger State-Transition Core
//!
//! Account-based chain state as an in-memory object database with
//! copy-on-write undo support, typed operation evaluators that validate
//! and apply signed operations, and weighted multi-signature authority
//! verification. Networking, RPC surfaces, wallet key management and
//! consensus voting live in other packages; this crate is handed
//! verified signing-key sets and fully formed blocks and answers with
//! deterministic state transitions.

pub mod authority;
pub mod block;
pub mod db;
pub mod evaluator;
pub mod fees;
pub mod objects;
pub mod operations;
pub mod types;
pub mod validation;

// Core types
pub use types::{
    blake3_hash, AccountId, AssetAmount, AssetId, BalanceId, ChequeId, CommitteeMemberId, FundId,
    GlobalPropertiesId, Hash, Hashable, ObjectId, ProposalId, PublicKey, SettingsId, Timestamp,
    WitnessId, CORE_ASSET,
};

// Object model
pub use objects::{
    Account, Asset, Authority, Balance, ChainParameters, Cheque, ChequePayee, ChequeStatus,
    CommitteeMember, DbObject, Fund, FundDeposit, GlobalProperties, MembershipStatus, PayeeStatus,
    PercentFee, Proposal, Settings, Witness,
};
pub use objects::account::AuthorityLevel;
pub use objects::cheque::{is_valid_cheque_code, CHEQUE_CODE_LENGTH};

// Operations and fees
pub use fees::FeeSchedule;
pub use operations::{
    AccountCreateOperation, AccountUpdateOperation, AccountUpgradeOperation,
    ChequeCreateOperation, ChequeUseOperation, CommitteeParamsUpdateOperation, ExtensionEntry,
    Extensions, FundCreateOperation, FundDepositOperation, Operation, ProposalCreateOperation,
    ProposalDeleteOperation, ProposalUpdateOperation, SettingsUpdateOperation, TransferOperation,
    WitnessCreateOperation,
};

// Blocks and transactions
pub use block::{transaction_merkle_root, BlockHeader, SignedBlock, SignedTransaction};

// Database facade
pub use db::{Database, GenesisAccount, GenesisConfig, ObjectIndex};

// Authority verification
pub use authority::{verify_account_authority, verify_literal_authority};

// Errors
pub use validation::{
    validate_block_structure, validate_transaction_structure, BlockApplyError, BlockApplyResult,
    OpError, OpResult,
};
