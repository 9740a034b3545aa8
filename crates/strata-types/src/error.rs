use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("collection capacity must be non-zero")]
    ZeroCapacity,

    #[error("cannot drain {requested} identifiers: only {remaining} remaining")]
    InsufficientRemaining { requested: u64, remaining: u64 },

    #[error("reveal seed must be non-zero")]
    ZeroSeed,

    #[error("collection already revealed")]
    AlreadyRevealed,
}
