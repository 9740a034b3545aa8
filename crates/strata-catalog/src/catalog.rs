use std::collections::HashMap;

use strata_store::BlobStore;
use strata_types::{BlobHandle, CollectionState};
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Layer, LinkRule, Trait, TraitMeta, TraitRef, TraitSpec};

/// A layer whose weights do not cover the identifier space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightShortfall {
    pub layer: usize,
    pub name: String,
    pub total: u128,
    pub required: u64,
}

/// Layers, traits and link rules of one collection.
///
/// Every mutation takes the collection state and is refused once the state
/// is sealed. Each successful mutation bumps [`Catalog::version`].
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    layers: Vec<Layer>,
    links: HashMap<TraitRef, LinkRule>,
    version: u64,
    weight_floor: Option<u64>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog that rejects layers whose weights undersum `capacity`.
    ///
    /// Writes are checked only once allocation has started, so layers can
    /// still be assembled trait by trait beforehand. Callers gate the first
    /// allocation on [`Catalog::weight_shortfalls`].
    pub fn with_weight_floor(capacity: u64) -> Self {
        Self {
            weight_floor: Some(capacity),
            ..Self::default()
        }
    }

    // ---- Reads ----

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn trait_at(&self, at: TraitRef) -> Option<&Trait> {
        self.layers.get(at.layer)?.get(at.slot)
    }

    pub fn link(&self, source: TraitRef) -> Option<&LinkRule> {
        self.links.get(&source)
    }

    /// All link rules, sorted by source.
    pub fn links(&self) -> Vec<(TraitRef, LinkRule)> {
        let mut all: Vec<_> = self.links.iter().map(|(k, v)| (*k, *v)).collect();
        all.sort_by_key(|(k, _)| *k);
        all
    }

    /// Monotonic counter of successful mutations.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Layers whose total weight is below `capacity`.
    pub fn weight_shortfalls(&self, capacity: u64) -> Vec<WeightShortfall> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.total_weight() < u128::from(capacity))
            .map(|(index, layer)| WeightShortfall {
                layer: index,
                name: layer.name.clone(),
                total: layer.total_weight(),
                required: capacity,
            })
            .collect()
    }

    // ---- Mutations ----

    /// Append (`index == layer_count`) or replace a whole layer.
    ///
    /// Weights are checked before any artwork is written to `store`. Link
    /// rules that no longer resolve against the new trait list are dropped.
    pub fn set_layer(
        &mut self,
        state: &CollectionState,
        store: &dyn BlobStore,
        index: usize,
        name: impl Into<String>,
        selection_prime: u64,
        traits: Vec<TraitSpec>,
    ) -> CatalogResult<()> {
        ensure_unsealed(state)?;
        if index > self.layers.len() {
            return Err(CatalogError::LayerOutOfRange {
                index,
                count: self.layers.len(),
            });
        }
        self.check_prime(index, selection_prime)?;
        if let Some(required) = self.active_floor(state) {
            let total = traits.iter().map(|t| u128::from(t.meta.weight)).sum();
            check_total(index, total, required)?;
        }

        let mut stored = Vec::with_capacity(traits.len());
        for spec in traits {
            let blob = store.write(&spec.data)?;
            stored.push(Trait::from_meta(spec.meta, blob));
        }
        let layer = Layer {
            name: name.into(),
            selection_prime,
            traits: stored,
        };

        debug!(
            layer = index,
            name = %layer.name,
            traits = layer.trait_count(),
            "layer set"
        );
        if index == self.layers.len() {
            self.layers.push(layer);
        } else {
            self.layers[index] = layer;
            self.prune_links();
        }
        self.version += 1;
        Ok(())
    }

    /// Append (`slot == trait_count`) or replace one trait, uploading its
    /// artwork.
    pub fn set_trait(
        &mut self,
        state: &CollectionState,
        store: &dyn BlobStore,
        layer: usize,
        slot: usize,
        spec: TraitSpec,
    ) -> CatalogResult<()> {
        ensure_unsealed(state)?;
        self.check_slot_writable(layer, slot)?;
        self.check_replacement(state, layer, slot, spec.meta.weight)?;
        let blob = store.write(&spec.data)?;
        self.put_trait(layer, slot, Trait::from_meta(spec.meta, blob));
        Ok(())
    }

    /// Append or replace one trait reusing the artwork of `source`.
    ///
    /// Only the blob handle is copied; no bytes are written.
    pub fn reuse_trait_data(
        &mut self,
        state: &CollectionState,
        layer: usize,
        slot: usize,
        meta: TraitMeta,
        source: TraitRef,
    ) -> CatalogResult<()> {
        ensure_unsealed(state)?;
        self.check_slot_writable(layer, slot)?;
        self.check_replacement(state, layer, slot, meta.weight)?;
        let blob = self.existing_blob(source)?;
        self.put_trait(layer, slot, Trait::from_meta(meta, blob));
        Ok(())
    }

    /// Declare or replace the link rule leaving `source`.
    pub fn set_link(
        &mut self,
        state: &CollectionState,
        source: TraitRef,
        rule: LinkRule,
    ) -> CatalogResult<()> {
        ensure_unsealed(state)?;
        self.check_exists(source)?;
        self.check_exists(rule.target())?;
        if rule.target_layer == source.layer {
            return Err(CatalogError::SelfLink {
                layer: source.layer,
            });
        }
        debug!(%source, target = %rule.target(), "link set");
        self.links.insert(source, rule);
        self.version += 1;
        Ok(())
    }

    /// Remove the link rule leaving `source`. Returns `true` if one existed.
    pub fn remove_link(&mut self, state: &CollectionState, source: TraitRef) -> CatalogResult<bool> {
        ensure_unsealed(state)?;
        let removed = self.links.remove(&source).is_some();
        if removed {
            self.version += 1;
        }
        Ok(removed)
    }

    // ---- Internals ----

    fn put_trait(&mut self, layer: usize, slot: usize, new_trait: Trait) {
        debug!(layer, slot, name = %new_trait.name, "trait set");
        let traits = &mut self.layers[layer].traits;
        if slot == traits.len() {
            traits.push(new_trait);
        } else {
            traits[slot] = new_trait;
        }
        self.version += 1;
    }

    /// The weight floor, once allocation has started.
    fn active_floor(&self, state: &CollectionState) -> Option<u64> {
        self.weight_floor.filter(|_| state.allocated() > 0)
    }

    /// Check the layer total as it would be with `weight` placed at `slot`.
    fn check_replacement(
        &self,
        state: &CollectionState,
        layer: usize,
        slot: usize,
        weight: u64,
    ) -> CatalogResult<()> {
        let Some(required) = self.active_floor(state) else {
            return Ok(());
        };
        let others: u128 = self.layers[layer]
            .traits
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .map(|(_, t)| u128::from(t.weight))
            .sum();
        check_total(layer, others + u128::from(weight), required)
    }

    fn existing_blob(&self, source: TraitRef) -> CatalogResult<BlobHandle> {
        self.check_exists(source)?;
        Ok(self.layers[source.layer].traits[source.slot].blob)
    }

    fn check_prime(&self, index: usize, prime: u64) -> CatalogResult<()> {
        if prime % 2 == 0 {
            return Err(CatalogError::InvalidPrime {
                layer: index,
                prime,
            });
        }
        let clash = self
            .layers
            .iter()
            .enumerate()
            .find(|(other, layer)| *other != index && layer.selection_prime == prime);
        if let Some((other, _)) = clash {
            return Err(CatalogError::DuplicatePrime {
                layer: index,
                prime,
                other,
            });
        }
        Ok(())
    }

    fn check_layer(&self, layer: usize) -> CatalogResult<&Layer> {
        self.layers
            .get(layer)
            .ok_or(CatalogError::LayerOutOfRange {
                index: layer,
                count: self.layers.len(),
            })
    }

    fn check_exists(&self, at: TraitRef) -> CatalogResult<()> {
        let layer = self.check_layer(at.layer)?;
        if at.slot >= layer.trait_count() {
            return Err(CatalogError::SlotOutOfRange {
                layer: at.layer,
                slot: at.slot,
                count: layer.trait_count(),
            });
        }
        Ok(())
    }

    fn check_slot_writable(&self, layer: usize, slot: usize) -> CatalogResult<()> {
        let count = self.check_layer(layer)?.trait_count();
        if slot > count {
            return Err(CatalogError::SlotOutOfRange { layer, slot, count });
        }
        Ok(())
    }

    fn prune_links(&mut self) {
        let layers = &self.layers;
        let resolves = |at: TraitRef| {
            layers
                .get(at.layer)
                .is_some_and(|layer| at.slot < layer.trait_count())
        };
        self.links.retain(|source, rule| {
            let keep = resolves(*source) && resolves(rule.target());
            if !keep {
                warn!(%source, target = %rule.target(), "dropping link that no longer resolves");
            }
            keep
        });
    }
}

fn ensure_unsealed(state: &CollectionState) -> CatalogResult<()> {
    if state.is_sealed() {
        return Err(CatalogError::Sealed);
    }
    Ok(())
}

fn check_total(index: usize, total: u128, required: u64) -> CatalogResult<()> {
    if total < u128::from(required) {
        return Err(CatalogError::WeightShortfall {
            layer: index,
            total,
            required,
        });
    }
    Ok(())
}
