//! Object database
//!
//! The facade owning every index, the undo machinery and the
//! block/transaction application loop. All persistence of chain state
//! lives here, in memory; durable storage and replay are the concern of
//! external collaborators feeding blocks back through `apply_block`.
//!
//! # Invariants
//!
//! 1. **All mutation flows through the facade** - evaluators receive
//!    borrowed access for the duration of one evaluate/apply call.
//! 2. **Rollback restores exact pre-session state** - objects, secondary
//!    keys and instance watermarks.
//! 3. **Single writer** - mutating entry points take `&mut self`; the
//!    borrow checker is the write section.

pub mod database;
pub mod genesis;
pub mod index;
pub(crate) mod undo;

pub use database::Database;
pub use genesis::{GenesisAccount, GenesisConfig};
pub use index::{IndexError, IndexResult, ObjectIndex};
