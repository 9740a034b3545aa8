//! Trait derivation for Strata.
//!
//! An item's traits are never stored. They are recomputed on every read from
//! the item's identifier, the collection's reveal seed and the catalog, so the
//! derivation must be a pure function of those inputs (plus any operator
//! override for the identifier).

pub mod error;
pub mod overrides;
pub mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use overrides::OverrideTable;
pub use resolver::{scramble, select_trait, TraitResolver};
