//! Foundation types for Strata.
//!
//! This crate provides the identity, handle, and state types shared by every
//! other Strata crate.
//!
//! # Key Types
//!
//! - [`ItemId`]: externally visible index of a collection item
//! - [`Identifier`]: permutation-drawn value assigned to an item at creation
//! - [`BlobHandle`]: opaque content-addressed reference into the blob store
//! - [`AccountId`]: caller identity (operator, minter, owner)
//! - [`TraitVector`]: one trait slot per layer, in layer order
//! - [`CollectionState`]: collection-wide capacity, drain counter and reveal seed

pub mod account;
pub mod error;
pub mod handle;
pub mod item;
pub mod state;
pub mod vector;

pub use account::AccountId;
pub use error::TypeError;
pub use handle::BlobHandle;
pub use item::{Identifier, ItemId};
pub use state::{CollectionState, RevealMode};
pub use vector::TraitVector;
