//! Ledger object model
//!
//! Typed, identity-addressed records held in indexed containers. Every
//! object type carries a fixed `(space, type)` pair (see
//! `types::object_id`) and a monotonically assigned instance number.
//!
//! # Data Model Invariants
//!
//! 1. **Object identity never changes after creation** - the instance
//!    number is assigned once; removal erases the object but the id is
//!    never recycled.
//! 2. **Objects are plain values** - all mutation goes through the index
//!    layer so pre-images can be recorded for undo.
//! 3. **No String identifiers in secondary keys beyond declared ones** -
//!    names and activation codes are the only string-keyed lookups, and
//!    each is declared by `DbObject::secondary_key`.

pub mod account;
pub mod asset;
pub mod cheque;
pub mod fund;
pub mod proposal;
pub mod settings;
pub mod witness;

use serde::Serialize;

pub use account::{Account, Authority, MembershipStatus};
pub use asset::{Asset, Balance};
pub use cheque::{Cheque, ChequePayee, ChequeStatus, PayeeStatus};
pub use fund::{Fund, FundDeposit};
pub use proposal::Proposal;
pub use settings::{ChainParameters, GlobalProperties, PercentFee, Settings};
pub use witness::{CommitteeMember, Witness};

/// Contract every indexed object type implements.
///
/// `secondary_key` declares an optional unique secondary key (account
/// name, cheque activation code, (owner, asset) balance pair). Indices
/// keep a derived map over these keys; uniqueness is enforced at
/// evaluation time, not by the index.
pub trait DbObject: Clone + Serialize {
    const SPACE_ID: u8;
    const TYPE_ID: u8;

    fn instance(&self) -> u64;

    fn secondary_key(&self) -> Option<Vec<u8>> {
        None
    }
}
