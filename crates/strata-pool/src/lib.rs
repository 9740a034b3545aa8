//! Identifier allocation for Strata.
//!
//! Every item receives an identifier drawn without replacement from
//! `0..capacity`. The pool models the full permutation array virtually: a
//! slot that was never touched holds its own index, and only displaced slots
//! are recorded. Work and storage per batch are O(batch size), independent of
//! capacity.

pub mod error;
pub mod pool;

pub use error::{PoolError, PoolResult};
pub use pool::AllocationPool;
