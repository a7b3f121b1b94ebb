//! Object identifiers
//!
//! Every persisted object is addressed by a `(space, type, instance)`
//! triplet. The `(space, type)` pairing is fixed per object type and is
//! part of the serialization contract - it must never change once chain
//! state exists. Instance numbers are assigned monotonically per type and
//! are never reused, even after removal.
//!
//! # CONSENSUS CORE RULE
//!
//! Typed ids are thin newtypes over the instance number; the space/type
//! half is carried by the type itself, not by runtime data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Space for protocol objects (accounts, assets, cheques, ...)
pub const SPACE_PROTOCOL: u8 = 1;

/// Space for implementation objects (balances, singletons)
pub const SPACE_IMPLEMENTATION: u8 = 2;

/// Fully-qualified object id
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    pub space: u8,
    pub type_id: u8,
    pub instance: u64,
}

impl ObjectId {
    pub fn new(space: u8, type_id: u8, instance: u64) -> Self {
        Self { space, type_id, instance }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.type_id, self.instance)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.space, self.type_id, self.instance)
    }
}

/// Declares a typed id newtype bound to a fixed `(space, type)` pair.
macro_rules! define_object_id {
    ($(#[$doc:meta])* $name:ident, $space:expr, $type_id:expr) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            pub const SPACE_ID: u8 = $space;
            pub const TYPE_ID: u8 = $type_id;

            pub fn object_id(&self) -> ObjectId {
                ObjectId::new(Self::SPACE_ID, Self::TYPE_ID, self.0)
            }

            pub fn instance(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(instance: u64) -> Self {
                Self(instance)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.object_id())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.object_id())
            }
        }
    };
}

define_object_id!(
    /// Account id (1.2.x)
    AccountId, SPACE_PROTOCOL, 2
);
define_object_id!(
    /// Asset id (1.3.x); the core asset is always 1.3.0
    AssetId, SPACE_PROTOCOL, 3
);
define_object_id!(
    /// Committee member id (1.5.x)
    CommitteeMemberId, SPACE_PROTOCOL, 5
);
define_object_id!(
    /// Witness id (1.6.x)
    WitnessId, SPACE_PROTOCOL, 6
);
define_object_id!(
    /// Proposal id (1.10.x)
    ProposalId, SPACE_PROTOCOL, 10
);
define_object_id!(
    /// Fund id (1.20.x)
    FundId, SPACE_PROTOCOL, 20
);
define_object_id!(
    /// Cheque id (1.21.x)
    ChequeId, SPACE_PROTOCOL, 21
);
define_object_id!(
    /// Global properties singleton id (2.0.0)
    GlobalPropertiesId, SPACE_IMPLEMENTATION, 0
);
define_object_id!(
    /// Settings singleton id (2.1.0)
    SettingsId, SPACE_IMPLEMENTATION, 1
);
define_object_id!(
    /// Account balance id (2.5.x)
    BalanceId, SPACE_IMPLEMENTATION, 5
);

/// The core asset of the chain (1.3.0)
pub const CORE_ASSET: AssetId = AssetId(0);
