/// Errors from identifier allocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The batch asked for more identifiers than remain undrawn.
    #[error("requested {requested} identifiers but only {remaining} remain")]
    Exhausted { requested: u64, remaining: u64 },
}

/// Result alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
