use strata_store::StoreError;

/// Errors from rendering.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("trait vector covers {actual} layers, catalog has {expected}")]
    VectorLength { expected: usize, actual: usize },

    #[error("layer {layer} has no trait in slot {slot}")]
    UnknownTrait { layer: usize, slot: usize },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result alias for composer operations.
pub type ComposeResult<T> = Result<T, ComposeError>;
