use strata_store::StoreError;

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Every identifier has been allocated; the catalog is frozen.
    #[error("catalog is sealed")]
    Sealed,

    #[error("layer {index} out of range (layer count {count})")]
    LayerOutOfRange { index: usize, count: usize },

    #[error("slot {slot} out of range for layer {layer} (trait count {count})")]
    SlotOutOfRange {
        layer: usize,
        slot: usize,
        count: usize,
    },

    /// Selection primes must be odd.
    #[error("layer {layer}: selection prime {prime} must be odd")]
    InvalidPrime { layer: usize, prime: u64 },

    #[error("layer {layer}: selection prime {prime} already used by layer {other}")]
    DuplicatePrime {
        layer: usize,
        prime: u64,
        other: usize,
    },

    #[error("layer {layer}: a trait cannot link to its own layer")]
    SelfLink { layer: usize },

    /// Trait weights do not cover the identifier space.
    #[error("layer {layer}: trait weights sum to {total}, need at least {required}")]
    WeightShortfall {
        layer: usize,
        total: u128,
        required: u64,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
