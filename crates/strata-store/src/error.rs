use strata_types::BlobHandle;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(BlobHandle),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {handle}: computed {computed}")]
    HashMismatch {
        handle: BlobHandle,
        computed: BlobHandle,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
