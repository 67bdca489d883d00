//! Wiring of the gateway, cache, and coordinators.
//!
//! The store is the single construction point: the cache is created once
//! here and every component receives an explicit reference, no ambient
//! singleton anywhere. It also carries the payload-constructing handlers
//! (toggle, rename, increment, decrement, direct quantity edit), so every
//! update patch is guaranteed to set at least one field.

use std::sync::Arc;

use crate::api::{GatewayError, HttpItemGateway, ItemGateway};
use crate::cache::ListCache;
use crate::config::Config;
use crate::coordinator::{ListState, MutationCoordinator, ReadCoordinator};
use crate::models::{quantity, GroceryItem, ItemPatch, NewItem};

/// The client-side grocery store: one cache, one read path, one mutation
/// path.
pub struct GroceryStore<G = HttpItemGateway> {
    cache: Arc<ListCache>,
    reads: ReadCoordinator<G>,
    mutations: MutationCoordinator<G>,
}

impl GroceryStore<HttpItemGateway> {
    /// Build a store talking to the real REST API.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        Ok(Self::with_gateway(HttpItemGateway::new(config)?))
    }
}

impl<G: ItemGateway> GroceryStore<G> {
    /// Wire an arbitrary gateway behind the coordinators.
    pub fn with_gateway(gateway: G) -> Self {
        let gateway = Arc::new(gateway);
        let cache = Arc::new(ListCache::new());
        Self {
            reads: ReadCoordinator::new(Arc::clone(&gateway), Arc::clone(&cache)),
            mutations: MutationCoordinator::new(gateway, Arc::clone(&cache)),
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<ListCache> {
        &self.cache
    }

    /// Current collection, re-fetched first if stale.
    pub async fn items(&self) -> ListState {
        self.reads.items().await
    }

    /// Non-blocking view for polling renderers.
    pub fn state(&self) -> ListState {
        self.reads.state()
    }

    pub async fn add_item(&self, draft: NewItem) -> Result<GroceryItem, GatewayError> {
        self.mutations.create(draft).await
    }

    /// The plain "add" action: an unnamed, unbought item with quantity 1.
    pub async fn add_default_item(&self) -> Result<GroceryItem, GatewayError> {
        self.mutations.create(NewItem::default()).await
    }

    pub async fn update_item(
        &self,
        id: &str,
        patch: ItemPatch,
    ) -> Result<GroceryItem, GatewayError> {
        self.mutations.update(id, patch).await
    }

    pub async fn delete_item(&self, id: &str) -> Result<GroceryItem, GatewayError> {
        self.mutations.delete(id).await
    }

    /// Flip an item's bought flag.
    pub async fn toggle_bought(
        &self,
        id: &str,
        currently_bought: bool,
    ) -> Result<GroceryItem, GatewayError> {
        self.update_item(id, ItemPatch::bought(!currently_bought)).await
    }

    pub async fn rename(
        &self,
        id: &str,
        name: impl Into<String>,
    ) -> Result<GroceryItem, GatewayError> {
        self.update_item(id, ItemPatch::name(name)).await
    }

    pub async fn increment_quantity(
        &self,
        id: &str,
        current: u8,
    ) -> Result<GroceryItem, GatewayError> {
        self.update_item(id, ItemPatch::quantity(quantity::increment(current)))
            .await
    }

    pub async fn decrement_quantity(
        &self,
        id: &str,
        current: u8,
    ) -> Result<GroceryItem, GatewayError> {
        self.update_item(id, ItemPatch::quantity(quantity::decrement(current)))
            .await
    }

    /// Direct quantity edit from free text; non-numeric input resolves to
    /// the minimum.
    pub async fn set_quantity(&self, id: &str, input: &str) -> Result<GroceryItem, GatewayError> {
        self.update_item(id, ItemPatch::quantity(quantity::parse(input)))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
