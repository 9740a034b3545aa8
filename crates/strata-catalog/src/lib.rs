//! Layer and trait catalog for Strata.
//!
//! A collection is a stack of layers; each layer offers weighted traits, and
//! each trait points at artwork in the blob store. Link rules force a trait in
//! one layer whenever a given trait is picked in another.
//!
//! The catalog may be changed freely until the collection is sealed (every
//! identifier allocated). After that, all mutation is refused. Reads are
//! never restricted.

pub mod catalog;
pub mod error;
pub mod model;

pub use catalog::{Catalog, WeightShortfall};
pub use error::{CatalogError, CatalogResult};
pub use model::{Layer, LinkRule, Trait, TraitMeta, TraitRef, TraitSpec};
