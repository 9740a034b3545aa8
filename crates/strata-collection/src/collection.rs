use std::collections::BTreeMap;
use std::sync::Arc;

use strata_catalog::{Catalog, LinkRule, TraitMeta, TraitRef, TraitSpec};
use strata_composer::{Attribute, Composer, MetadataDocument};
use strata_entropy::{EntropyMixer, Environment};
use strata_pool::AllocationPool;
use strata_resolver::{OverrideTable, TraitResolver};
use strata_store::BlobStore;
use strata_types::{AccountId, CollectionState, Identifier, ItemId, TraitVector, TypeError};
use tracing::{debug, info};

use crate::config::CollectionConfig;
use crate::error::{CollectionError, CollectionResult};

/// What the collection records for a created item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRecord {
    /// Drawn from the pool at creation; never changes.
    pub identifier: Identifier,
    /// Recipient of the creation batch.
    pub owner: AccountId,
    /// Owner's choice to publish metadata under the base URI.
    pub render_off_chain: bool,
}

/// A generative collection.
pub struct Collection {
    config: CollectionConfig,
    operator: AccountId,
    state: CollectionState,
    pool: AllocationPool,
    catalog: Catalog,
    overrides: OverrideTable,
    items: BTreeMap<ItemId, ItemRecord>,
    next_item: ItemId,
    store: Arc<dyn BlobStore>,
    environment: Arc<dyn Environment>,
}

impl Collection {
    /// Create an empty collection administered by `operator`.
    ///
    /// Without a placeholder image the reveal seed is drawn right away and
    /// identifiers are interpreted directly.
    pub fn new(
        config: CollectionConfig,
        operator: AccountId,
        store: Arc<dyn BlobStore>,
        environment: Arc<dyn Environment>,
    ) -> CollectionResult<Self> {
        let mut state = CollectionState::new(config.capacity, config.reveal_mode())?;
        let catalog = if config.strict_weights {
            Catalog::with_weight_floor(config.capacity)
        } else {
            Catalog::new()
        };

        if config.placeholder_image.is_none() {
            let snapshot = environment.snapshot(&operator);
            state.set_reveal_seed(EntropyMixer::REVEAL.mix_u64(&snapshot, 0))?;
        }

        info!(
            name = %config.name,
            capacity = config.capacity,
            mode = ?state.reveal_mode(),
            operator = %operator.short_id(),
            "collection created"
        );

        Ok(Self {
            config,
            operator,
            state,
            pool: AllocationPool::new(),
            catalog,
            overrides: OverrideTable::new(),
            items: BTreeMap::new(),
            next_item: ItemId(0),
            store,
            environment,
        })
    }

    // ---- Creation ----

    /// Create `count` items for `recipient`.
    ///
    /// Identifiers are drawn before any item record is written; if the draw
    /// fails nothing is created.
    pub fn on_create(
        &mut self,
        caller: &AccountId,
        recipient: &AccountId,
        count: u64,
    ) -> CollectionResult<Vec<ItemId>> {
        if self.config.strict_weights && self.state.allocated() == 0 {
            if let Some(short) = self.catalog.weight_shortfalls(self.state.capacity()).first() {
                return Err(CollectionError::WeightsIncomplete {
                    layer: short.layer,
                    name: short.name.clone(),
                    total: short.total,
                    required: short.required,
                });
            }
        }

        let identifiers = self.pool.allocate_from(
            &mut self.state,
            count,
            self.environment.as_ref(),
            caller,
            self.next_item,
        )?;

        let mut created = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            let item = self.next_item;
            self.items.insert(
                item,
                ItemRecord {
                    identifier,
                    owner: recipient.clone(),
                    render_off_chain: false,
                },
            );
            created.push(item);
            self.next_item = item.next();
        }

        info!(
            count,
            recipient = %recipient.short_id(),
            remaining = self.state.remaining(),
            "items created"
        );
        Ok(created)
    }

    // ---- Reads ----

    pub fn identifier_of(&self, item: ItemId) -> CollectionResult<Identifier> {
        Ok(self.record(item)?.identifier)
    }

    pub fn owner_of(&self, item: ItemId) -> CollectionResult<&AccountId> {
        Ok(&self.record(item)?.owner)
    }

    /// The identifier trait derivation consumes for `item`; overrides are
    /// keyed by it.
    pub fn derivation_identifier(&self, item: ItemId) -> CollectionResult<Identifier> {
        let allocated = self.identifier_of(item)?;
        Ok(self.state.derivation_identifier(allocated))
    }

    /// Trait vector for a derivation identifier.
    pub fn derive_trait_vector(&self, identifier: Identifier) -> CollectionResult<TraitVector> {
        self.check_identifier(identifier)?;
        let resolver = TraitResolver::new(&self.catalog, &self.overrides, &self.state);
        Ok(resolver.derive(identifier)?)
    }

    /// Trait vector of a created item.
    pub fn traits_of(&self, item: ItemId) -> CollectionResult<TraitVector> {
        let identifier = self.derivation_identifier(item)?;
        self.derive_trait_vector(identifier)
    }

    /// Image document for `item`: the placeholder until reveal.
    pub fn render_image(&self, item: ItemId) -> CollectionResult<String> {
        self.record(item)?;
        if !self.state.is_revealed() {
            return Ok(self.config.placeholder_image.clone().unwrap_or_default());
        }
        let vector = self.traits_of(item)?;
        Ok(self.composer().render_image(&vector)?)
    }

    pub fn attributes(&self, item: ItemId) -> CollectionResult<Vec<Attribute>> {
        let vector = self.traits_of(item)?;
        Ok(self.composer().attributes(&vector)?)
    }

    /// JSON attribute list for `item`. Refused before reveal.
    pub fn render_attributes(&self, item: ItemId) -> CollectionResult<String> {
        let vector = self.traits_of(item)?;
        Ok(self.composer().render_attributes(&vector)?)
    }

    /// Combined metadata document for `item`.
    pub fn metadata(&self, item: ItemId) -> CollectionResult<MetadataDocument> {
        self.record(item)?;
        let name = format!("{} #{}", self.config.name, item);
        let description = self.config.description.clone();
        if !self.state.is_revealed() {
            let image = self.config.placeholder_image.clone().unwrap_or_default();
            return Ok(MetadataDocument::placeholder(name, description, image));
        }
        let vector = self.traits_of(item)?;
        let composer = self.composer();
        Ok(MetadataDocument {
            name,
            description,
            image: composer.render_image(&vector)?,
            attributes: composer.attributes(&vector)?,
        })
    }

    /// Where the metadata for `item` lives: under the base URI when the owner
    /// opted for off-chain rendering, otherwise an inline JSON data URI.
    pub fn token_uri(&self, item: ItemId) -> CollectionResult<String> {
        let record = self.record(item)?;
        if let (true, Some(base)) = (record.render_off_chain, &self.config.base_uri) {
            return Ok(format!("{base}{item}"));
        }
        Ok(self.metadata(item)?.to_data_uri()?)
    }

    pub fn is_revealed(&self) -> bool {
        self.state.is_revealed()
    }

    /// True once every identifier has been allocated; the catalog is sealed.
    pub fn capacity_reached(&self) -> bool {
        self.state.is_sealed()
    }

    pub fn minted(&self) -> u64 {
        self.state.allocated()
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &ItemRecord)> + '_ {
        self.items.iter().map(|(id, record)| (*id, record))
    }

    // ---- Operator: catalog ----

    pub fn set_layer(
        &mut self,
        caller: &AccountId,
        index: usize,
        name: impl Into<String>,
        selection_prime: u64,
        traits: Vec<TraitSpec>,
    ) -> CollectionResult<()> {
        self.ensure_operator(caller)?;
        self.catalog.set_layer(
            &self.state,
            self.store.as_ref(),
            index,
            name,
            selection_prime,
            traits,
        )?;
        let dropped = self.overrides.prune(&self.catalog);
        if dropped > 0 {
            debug!(dropped, "overrides pruned after layer change");
        }
        Ok(())
    }

    pub fn set_trait(
        &mut self,
        caller: &AccountId,
        layer: usize,
        slot: usize,
        spec: TraitSpec,
    ) -> CollectionResult<()> {
        self.ensure_operator(caller)?;
        self.catalog
            .set_trait(&self.state, self.store.as_ref(), layer, slot, spec)?;
        Ok(())
    }

    pub fn reuse_trait_data(
        &mut self,
        caller: &AccountId,
        layer: usize,
        slot: usize,
        meta: TraitMeta,
        source: TraitRef,
    ) -> CollectionResult<()> {
        self.ensure_operator(caller)?;
        self.catalog
            .reuse_trait_data(&self.state, layer, slot, meta, source)?;
        Ok(())
    }

    pub fn set_link(
        &mut self,
        caller: &AccountId,
        source: TraitRef,
        rule: LinkRule,
    ) -> CollectionResult<()> {
        self.ensure_operator(caller)?;
        self.catalog.set_link(&self.state, source, rule)?;
        Ok(())
    }

    pub fn remove_link(&mut self, caller: &AccountId, source: TraitRef) -> CollectionResult<bool> {
        self.ensure_operator(caller)?;
        Ok(self.catalog.remove_link(&self.state, source)?)
    }

    // ---- Operator: reveal, overrides, display ----

    /// Draw the reveal seed. Allowed once.
    pub fn reveal(&mut self, caller: &AccountId) -> CollectionResult<u64> {
        self.ensure_operator(caller)?;
        if self.state.is_revealed() {
            return Err(TypeError::AlreadyRevealed.into());
        }
        let snapshot = self.environment.snapshot(caller);
        let seed = EntropyMixer::REVEAL.mix_u64(&snapshot, self.state.allocated());
        self.state.set_reveal_seed(seed)?;
        info!(minted = self.state.allocated(), "collection revealed");
        Ok(seed)
    }

    /// Pin the trait vector of a derivation identifier; an empty vector
    /// clears the pin. Returns the previous override.
    pub fn set_override(
        &mut self,
        caller: &AccountId,
        identifier: Identifier,
        vector: TraitVector,
    ) -> CollectionResult<Option<TraitVector>> {
        self.ensure_operator(caller)?;
        self.check_identifier(identifier)?;
        Ok(self.overrides.set(&self.catalog, identifier, vector)?)
    }

    pub fn set_placeholder(
        &mut self,
        caller: &AccountId,
        image: impl Into<String>,
    ) -> CollectionResult<()> {
        self.ensure_operator(caller)?;
        if self.state.is_revealed() {
            return Err(CollectionError::PlaceholderLocked);
        }
        self.config.placeholder_image = Some(image.into());
        debug!("placeholder updated");
        Ok(())
    }

    pub fn set_description(
        &mut self,
        caller: &AccountId,
        description: impl Into<String>,
    ) -> CollectionResult<()> {
        self.ensure_operator(caller)?;
        self.config.description = description.into();
        Ok(())
    }

    pub fn set_base_uri(&mut self, caller: &AccountId, base_uri: Option<String>) -> CollectionResult<()> {
        self.ensure_operator(caller)?;
        self.config.base_uri = base_uri;
        Ok(())
    }

    // ---- Owner ----

    pub fn set_render_off_chain(
        &mut self,
        caller: &AccountId,
        item: ItemId,
        off_chain: bool,
    ) -> CollectionResult<()> {
        let capacity = self.state.capacity();
        let record = lookup_mut(&mut self.items, item, capacity)?;
        if &record.owner != caller {
            return Err(CollectionError::not_owner(item, caller));
        }
        record.render_off_chain = off_chain;
        debug!(%item, off_chain, "render flag set");
        Ok(())
    }

    // ---- Accessors ----

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn operator(&self) -> &AccountId {
        &self.operator
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }

    // ---- Internals ----

    fn composer(&self) -> Composer<'_> {
        Composer::new(&self.catalog, self.store.as_ref(), &self.config.render)
    }

    fn ensure_operator(&self, caller: &AccountId) -> CollectionResult<()> {
        if caller != &self.operator {
            return Err(CollectionError::not_operator(caller));
        }
        Ok(())
    }

    fn check_identifier(&self, identifier: Identifier) -> CollectionResult<()> {
        if identifier.value() >= self.state.capacity() {
            return Err(CollectionError::NoSuchIdentifier {
                identifier,
                capacity: self.state.capacity(),
            });
        }
        Ok(())
    }

    fn record(&self, item: ItemId) -> CollectionResult<&ItemRecord> {
        if item.value() >= self.state.capacity() {
            return Err(CollectionError::NoSuchItem {
                item,
                capacity: self.state.capacity(),
            });
        }
        self.items.get(&item).ok_or(CollectionError::NotMinted(item))
    }
}

fn lookup_mut(
    items: &mut BTreeMap<ItemId, ItemRecord>,
    item: ItemId,
    capacity: u64,
) -> CollectionResult<&mut ItemRecord> {
    if item.value() >= capacity {
        return Err(CollectionError::NoSuchItem { item, capacity });
    }
    items.get_mut(&item).ok_or(CollectionError::NotMinted(item))
}
