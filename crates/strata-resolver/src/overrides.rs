use std::collections::HashMap;

use strata_catalog::Catalog;
use strata_types::{Identifier, TraitVector};
use tracing::{debug, warn};

use crate::error::{ResolveError, ResolveResult};

/// Operator-supplied trait vectors that replace derived output.
///
/// Keys are the identifiers handed to derivation. Vectors are checked
/// against the catalog when written; after a catalog edit the owner of the
/// table calls [`OverrideTable::prune`] to drop those that no longer fit.
#[derive(Clone, Debug, Default)]
pub struct OverrideTable {
    entries: HashMap<Identifier, TraitVector>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: Identifier) -> Option<&TraitVector> {
        self.entries.get(&identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `vector` for `identifier`; an empty vector clears the override.
    ///
    /// Returns the previous override, if any.
    pub fn set(
        &mut self,
        catalog: &Catalog,
        identifier: Identifier,
        vector: TraitVector,
    ) -> ResolveResult<Option<TraitVector>> {
        if vector.is_empty() {
            debug!(%identifier, "override cleared");
            return Ok(self.entries.remove(&identifier));
        }
        validate(catalog, &vector)?;
        debug!(%identifier, code = %vector.code(), "override set");
        Ok(self.entries.insert(identifier, vector))
    }

    /// Drop overrides that no longer address a trait in every layer of
    /// `catalog`. Returns how many were dropped.
    pub fn prune(&mut self, catalog: &Catalog) -> usize {
        let before = self.entries.len();
        self.entries.retain(|identifier, vector| {
            let keep = validate(catalog, vector).is_ok();
            if !keep {
                warn!(%identifier, code = %vector.code(), "dropping override that no longer resolves");
            }
            keep
        });
        before - self.entries.len()
    }
}

fn validate(catalog: &Catalog, vector: &TraitVector) -> ResolveResult<()> {
    if vector.len() != catalog.layer_count() {
        return Err(ResolveError::OverrideLength {
            expected: catalog.layer_count(),
            actual: vector.len(),
        });
    }
    for (layer, layer_def) in catalog.layers().iter().enumerate() {
        let slot = vector.as_slice()[layer];
        if slot >= layer_def.trait_count() {
            return Err(ResolveError::OverrideSlot {
                layer,
                slot,
                count: layer_def.trait_count(),
            });
        }
    }
    Ok(())
}
