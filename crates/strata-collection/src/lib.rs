//! The Strata collection service.
//!
//! [`Collection`] owns the collection-wide state and threads it through the
//! allocation pool, catalog, resolver and composer. It is the single entry
//! point for the creation workflow (`on_create`), the operator (catalog
//! edits, reveal, overrides, display settings), item owners (the off-chain
//! rendering flag) and readers (identifiers, traits, images, metadata).
//!
//! Mutations take `&mut self`, so one state-changing request runs to
//! completion before the next. Reads take `&self` and never change state.

pub mod collection;
pub mod config;
pub mod error;
pub mod manifest;

pub use collection::{Collection, ItemRecord};
pub use config::CollectionConfig;
pub use error::{CollectionError, CollectionResult, ErrorKind};
pub use manifest::{parse_trait_ref, CollectionManifest, LayerManifest, LinkManifest, TraitManifest};

// Re-export key types
pub use strata_catalog::{Catalog, LinkRule, TraitMeta, TraitRef, TraitSpec};
pub use strata_composer::{Attribute, MetadataDocument, RenderConfig};
pub use strata_entropy::{Environment, FixedEnvironment, HostEnvironment};
pub use strata_store::{BlobStore, InMemoryBlobStore};
pub use strata_types::{AccountId, Identifier, ItemId, RevealMode, TraitVector};
