use std::fmt;

use serde::{Deserialize, Serialize};
use strata_types::BlobHandle;

/// Address of one trait: layer index and slot within the layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraitRef {
    pub layer: usize,
    pub slot: usize,
}

impl TraitRef {
    pub const fn new(layer: usize, slot: usize) -> Self {
        Self { layer, slot }
    }
}

impl fmt::Display for TraitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer, self.slot)
    }
}

/// Trait metadata, everything except the artwork bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitMeta {
    pub name: String,
    pub mime_type: String,
    /// Lottery weight; zero means the trait is never rolled.
    pub weight: u64,
    /// Hidden traits are rendered but left out of the attribute list.
    #[serde(default)]
    pub hidden: bool,
}

impl TraitMeta {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, weight: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            weight,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A trait to be stored: metadata plus artwork bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitSpec {
    pub meta: TraitMeta,
    pub data: Vec<u8>,
}

impl TraitSpec {
    pub fn new(meta: TraitMeta, data: impl Into<Vec<u8>>) -> Self {
        Self {
            meta,
            data: data.into(),
        }
    }
}

/// A stored trait.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    pub name: String,
    pub mime_type: String,
    pub weight: u64,
    pub blob: BlobHandle,
    pub hidden: bool,
}

impl Trait {
    pub fn from_meta(meta: TraitMeta, blob: BlobHandle) -> Self {
        Self {
            name: meta.name,
            mime_type: meta.mime_type,
            weight: meta.weight,
            blob,
            hidden: meta.hidden,
        }
    }
}

/// One axis of the composition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// Odd scrambling constant, distinct across layers.
    pub selection_prime: u64,
    pub traits: Vec<Trait>,
}

impl Layer {
    pub fn trait_count(&self) -> usize {
        self.traits.len()
    }

    pub fn get(&self, slot: usize) -> Option<&Trait> {
        self.traits.get(slot)
    }

    /// Sum of all trait weights.
    pub fn total_weight(&self) -> u128 {
        self.traits.iter().map(|t| u128::from(t.weight)).sum()
    }
}

/// Forced co-occurrence: picking the source trait forces `forced_slot` in
/// `target_layer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRule {
    pub target_layer: usize,
    pub forced_slot: usize,
}

impl LinkRule {
    pub const fn new(target_layer: usize, forced_slot: usize) -> Self {
        Self {
            target_layer,
            forced_slot,
        }
    }

    pub fn target(&self) -> TraitRef {
        TraitRef::new(self.target_layer, self.forced_slot)
    }
}
