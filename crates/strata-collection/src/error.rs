use std::fmt;

use strata_catalog::CatalogError;
use strata_composer::ComposeError;
use strata_pool::PoolError;
use strata_resolver::ResolveError;
use strata_store::StoreError;
use strata_types::{AccountId, Identifier, ItemId, TypeError};
use thiserror::Error;

/// Coarse classification of a failure, for callers that only need to know
/// what kind of precondition was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The item is not minted yet, or the collection is not revealed.
    NotYetAvailable,
    /// Malformed request: bad override, nonexistent item, over-capacity batch.
    InvalidInput,
    /// Policy violation: sealed catalog, second reveal, wrong caller.
    NotAuthorized,
    /// The catalog cannot place a derived value.
    InvalidTraitSelection,
    /// The blob store or the filesystem failed.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotYetAvailable => "not yet available",
            Self::InvalidInput => "invalid input",
            Self::NotAuthorized => "not authorized",
            Self::InvalidTraitSelection => "invalid trait selection",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("item {0} has not been created yet")]
    NotMinted(ItemId),

    #[error("item {item} does not exist (capacity {capacity})")]
    NoSuchItem { item: ItemId, capacity: u64 },

    #[error("identifier {identifier} is outside 0..{capacity}")]
    NoSuchIdentifier { identifier: Identifier, capacity: u64 },

    #[error("{0} is not the operator")]
    NotOperator(String),

    #[error("{caller} does not own item {item}")]
    NotOwner { item: ItemId, caller: String },

    #[error("placeholder image is fixed once the collection is revealed")]
    PlaceholderLocked,

    #[error("layer {layer} ({name}): weights sum to {total}, need at least {required}")]
    WeightsIncomplete {
        layer: usize,
        name: String,
        total: u128,
        required: u64,
    },

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state error: {0}")]
    State(#[from] TypeError),

    #[error("allocation error: {0}")]
    Pool(#[from] PoolError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("derivation error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("render error: {0}")]
    Compose(#[from] ComposeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CollectionError {
    pub(crate) fn not_operator(caller: &AccountId) -> Self {
        Self::NotOperator(caller.short_id())
    }

    pub(crate) fn not_owner(item: ItemId, caller: &AccountId) -> Self {
        Self::NotOwner {
            item,
            caller: caller.short_id(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotMinted(_) => ErrorKind::NotYetAvailable,
            Self::NoSuchItem { .. }
            | Self::NoSuchIdentifier { .. }
            | Self::Manifest(_)
            | Self::Config(_) => ErrorKind::InvalidInput,
            Self::NotOperator(_) | Self::NotOwner { .. } | Self::PlaceholderLocked => {
                ErrorKind::NotAuthorized
            }
            Self::WeightsIncomplete { .. } => ErrorKind::InvalidTraitSelection,
            Self::Io(_) | Self::Store(_) => ErrorKind::Storage,
            Self::State(TypeError::AlreadyRevealed) => ErrorKind::NotAuthorized,
            Self::State(_) | Self::Pool(_) => ErrorKind::InvalidInput,
            Self::Catalog(e) => match e {
                CatalogError::Sealed => ErrorKind::NotAuthorized,
                CatalogError::WeightShortfall { .. } => ErrorKind::InvalidTraitSelection,
                CatalogError::Store(_) => ErrorKind::Storage,
                _ => ErrorKind::InvalidInput,
            },
            Self::Resolve(e) => match e {
                ResolveError::NotRevealed => ErrorKind::NotYetAvailable,
                ResolveError::InvalidSelection { .. } | ResolveError::BrokenLink { .. } => {
                    ErrorKind::InvalidTraitSelection
                }
                ResolveError::OverrideLength { .. } | ResolveError::OverrideSlot { .. } => {
                    ErrorKind::InvalidInput
                }
            },
            Self::Compose(e) => match e {
                ComposeError::Store(_) => ErrorKind::Storage,
                ComposeError::VectorLength { .. } | ComposeError::UnknownTrait { .. } => {
                    ErrorKind::InvalidTraitSelection
                }
                ComposeError::Serialization(_) | ComposeError::Format(_) => ErrorKind::InvalidInput,
            },
        }
    }
}

pub type CollectionResult<T> = Result<T, CollectionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use strata_catalog::TraitRef;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            CollectionError::NotMinted(ItemId(3)).kind(),
            ErrorKind::NotYetAvailable
        );
        assert_eq!(
            CollectionError::from(ResolveError::NotRevealed).kind(),
            ErrorKind::NotYetAvailable
        );
        assert_eq!(
            CollectionError::from(ResolveError::OverrideLength {
                expected: 2,
                actual: 1
            })
            .kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            CollectionError::NoSuchItem {
                item: ItemId(9),
                capacity: 5
            }
            .kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            CollectionError::from(CatalogError::Sealed).kind(),
            ErrorKind::NotAuthorized
        );
        assert_eq!(
            CollectionError::from(TypeError::AlreadyRevealed).kind(),
            ErrorKind::NotAuthorized
        );
        assert_eq!(
            CollectionError::from(ResolveError::InvalidSelection { layer: 1, value: 7 }).kind(),
            ErrorKind::InvalidTraitSelection
        );
        assert_eq!(
            CollectionError::from(ResolveError::BrokenLink {
                from: TraitRef::new(0, 0),
                target: TraitRef::new(1, 4),
            })
            .kind(),
            ErrorKind::InvalidTraitSelection
        );
    }

    #[test]
    fn invalid_selection_names_layer_and_value() {
        let err = CollectionError::from(ResolveError::InvalidSelection { layer: 2, value: 41 });
        let msg = err.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains("41"));
    }
}
