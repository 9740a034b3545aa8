use strata_catalog::TraitRef;

/// Errors from trait derivation and override validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The reveal seed has not been set yet.
    #[error("collection not revealed")]
    NotRevealed,

    /// No trait interval contains the scrambled value; the layer's weights
    /// undersum the identifier space.
    #[error("layer {layer}: no trait covers selection value {value}")]
    InvalidSelection { layer: usize, value: u64 },

    /// A link rule points at a trait that no longer exists.
    #[error("link from {from} points at missing trait {target}")]
    BrokenLink { from: TraitRef, target: TraitRef },

    #[error("override must cover {expected} layers, got {actual}")]
    OverrideLength { expected: usize, actual: usize },

    #[error("override slot {slot} out of range for layer {layer} (trait count {count})")]
    OverrideSlot {
        layer: usize,
        slot: usize,
        count: usize,
    },
}

/// Result alias for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
