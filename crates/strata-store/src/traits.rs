use strata_types::BlobHandle;

use crate::error::{StoreError, StoreResult};

/// Write-once blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written.
/// - `read` returns exactly the bytes previously written under the handle.
/// - Concurrent reads are always safe.
/// - Handles are opaque to callers; two writes of equal bytes may or may not
///   share a handle.
pub trait BlobStore: Send + Sync {
    /// Read a blob by handle.
    ///
    /// Returns `Ok(None)` if the blob does not exist.
    fn read(&self, handle: &BlobHandle) -> StoreResult<Option<Vec<u8>>>;

    /// Store bytes and return their handle.
    fn write(&self, data: &[u8]) -> StoreResult<BlobHandle>;

    /// Check whether a blob exists.
    fn exists(&self, handle: &BlobHandle) -> StoreResult<bool>;

    /// Read a blob that must exist.
    fn fetch(&self, handle: &BlobHandle) -> StoreResult<Vec<u8>> {
        self.read(handle)?.ok_or(StoreError::NotFound(*handle))
    }
}
