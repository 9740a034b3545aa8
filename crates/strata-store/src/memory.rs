use std::collections::HashMap;
use std::sync::RwLock;

use strata_types::BlobHandle;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests, simulation and embedding. Handles are content hashes,
/// so writing the same bytes twice stores them once.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobHandle, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn read(&self, handle: &BlobHandle) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blobs.read().expect("lock poisoned");
        let Some(data) = map.get(handle) else {
            return Ok(None);
        };
        let computed = ContentHasher::BLOB.hash(data);
        if computed != *handle {
            return Err(StoreError::HashMismatch {
                handle: *handle,
                computed,
            });
        }
        Ok(Some(data.clone()))
    }

    fn write(&self, data: &[u8]) -> StoreResult<BlobHandle> {
        let handle = ContentHasher::BLOB.hash(data);
        let mut map = self.blobs.write().expect("lock poisoned");
        map.entry(handle).or_insert_with(|| data.to_vec());
        debug!(handle = %handle.short_hex(), len = data.len(), "blob written");
        Ok(handle)
    }

    fn exists(&self, handle: &BlobHandle) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(handle))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Read / write
    // -----------------------------------------------------------------------

    #[test]
    fn write_and_read_exact_bytes() {
        let store = InMemoryBlobStore::new();
        let handle = store.write(b"\x89PNG\r\n\x1a\n").unwrap();
        let bytes = store.read(&handle).unwrap().expect("should exist");
        assert_eq!(bytes, b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn large_blob_roundtrips() {
        let store = InMemoryBlobStore::new();
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let handle = store.write(&data).unwrap();
        assert_eq!(store.fetch(&handle).unwrap(), data);
    }

    #[test]
    fn empty_blob_is_storable() {
        let store = InMemoryBlobStore::new();
        let handle = store.write(b"").unwrap();
        assert_eq!(store.fetch(&handle).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn read_missing_returns_none() {
        let store = InMemoryBlobStore::new();
        let handle = ContentHasher::BLOB.hash(b"never written");
        assert!(store.read(&handle).unwrap().is_none());
        assert!(!store.exists(&handle).unwrap());
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let store = InMemoryBlobStore::new();
        let handle = ContentHasher::BLOB.hash(b"missing");
        assert!(matches!(
            store.fetch(&handle),
            Err(StoreError::NotFound(h)) if h == handle
        ));
    }

    // -----------------------------------------------------------------------
    // Content addressing
    // -----------------------------------------------------------------------

    #[test]
    fn same_bytes_share_a_handle() {
        let store = InMemoryBlobStore::new();
        let a = store.write(b"identical").unwrap();
        let b = store.write(b"identical").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn different_bytes_get_different_handles() {
        let store = InMemoryBlobStore::new();
        let a = store.write(b"aaa").unwrap();
        let b = store.write(b"bbb").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Concurrent read safety
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryBlobStore::new());
        let handle = store.write(b"shared artwork").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let bytes = store.fetch(&handle).unwrap();
                    assert_eq!(bytes, b"shared artwork");
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryBlobStore::default();
        store.write(b"x").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryBlobStore"));
        assert!(debug.contains("blob_count"));
    }
}
