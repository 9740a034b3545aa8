//! Content-addressed blob storage for Strata.
//!
//! Trait artwork is stored once and referenced by a [`BlobHandle`]. The
//! catalog never holds image bytes itself; it holds handles, and the composer
//! reads the bytes back at render time.
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content-addressing guarantees this).
//! 2. `read` returns exactly the bytes previously written, of any size.
//! 3. Concurrent reads are always safe.
//! 4. The store never interprets blob contents.
//!
//! [`BlobHandle`]: strata_types::BlobHandle

pub mod error;
pub mod hasher;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use hasher::ContentHasher;
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
