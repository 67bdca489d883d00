//! The optimistic mutation protocol.
//!
//! Every mutation follows the same four phases: cancel pending reads,
//! snapshot + speculative apply (one step under the cache lock), remote
//! call, settle. Success keeps the speculative state and merges the
//! server's confirmation where needed; failure restores the snapshot
//! verbatim. Either way the cache ends up stale, so the next read
//! reconciles against the server.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{GatewayError, ItemGateway};
use crate::cache::{CacheEntry, ListCache};
use crate::models::{quantity, GroceryItem, ItemPatch, NewItem};

/// A mutation request against the collection, tagged by operation.
///
/// Each variant carries its own payload and supplies the speculative edit
/// and the on-success merge; one runner drives the shared protocol.
#[derive(Debug, Clone)]
pub enum Mutation {
    Create(NewItem),
    Update { id: String, patch: ItemPatch },
    Delete { id: String },
}

impl Mutation {
    /// Speculative edit: rewrite the cached sequence as if the remote call
    /// had already succeeded.
    fn apply(&self, entries: &mut Vec<CacheEntry>) {
        match self {
            Mutation::Create(draft) => {
                entries.push(CacheEntry::Pending(draft.clone()));
            }
            Mutation::Update { id, patch } => {
                // No matching id: leave the cache alone, the remote call
                // still decides truth.
                for entry in entries.iter_mut() {
                    if let CacheEntry::Confirmed(item) = entry {
                        if item.id == *id {
                            patch.apply_to(item);
                            break;
                        }
                    }
                }
            }
            Mutation::Delete { id } => {
                entries.retain(|entry| entry.id() != Some(id.as_str()));
            }
        }
    }

    /// On-success edit: reconcile the server's confirmation into the
    /// sequence.
    fn merge(&self, entries: &mut Vec<CacheEntry>, confirmed: &GroceryItem) {
        match self {
            Mutation::Create(_) => {
                // Pending entries are appended and confirmed in arrival
                // order, so the first one is this mutation's.
                if let Some(slot) = entries.iter_mut().find(|entry| entry.is_pending()) {
                    *slot = CacheEntry::Confirmed(confirmed.clone());
                }
            }
            // The speculative state already stands; server-side derived
            // changes arrive with the staleness re-fetch.
            Mutation::Update { .. } | Mutation::Delete { .. } => {}
        }
    }
}

/// Runs create, update, and delete through the optimistic protocol.
pub struct MutationCoordinator<G> {
    gateway: Arc<G>,
    cache: Arc<ListCache>,
}

impl<G> Clone for MutationCoordinator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<G: ItemGateway> MutationCoordinator<G> {
    pub fn new(gateway: Arc<G>, cache: Arc<ListCache>) -> Self {
        Self { gateway, cache }
    }

    /// Create an item. The quantity is clamped into range before the
    /// speculative entry is written or the request is sent.
    pub async fn create(&self, mut draft: NewItem) -> Result<GroceryItem, GatewayError> {
        draft.quantity = quantity::clamp(draft.quantity);
        self.run(Mutation::Create(draft)).await
    }

    /// Update one or more fields of an existing item.
    ///
    /// An empty patch is a caller contract violation; the patch
    /// constructors and the store handlers always set at least one field.
    pub async fn update(
        &self,
        id: impl Into<String>,
        patch: ItemPatch,
    ) -> Result<GroceryItem, GatewayError> {
        debug_assert!(!patch.is_empty(), "update patch must set at least one field");
        self.run(Mutation::Update {
            id: id.into(),
            patch,
        })
        .await
    }

    /// Delete an item, returning its last known remote state.
    pub async fn delete(&self, id: impl Into<String>) -> Result<GroceryItem, GatewayError> {
        self.run(Mutation::Delete { id: id.into() }).await
    }

    async fn run(&self, mutation: Mutation) -> Result<GroceryItem, GatewayError> {
        // Snapshot-then-apply is one step under the cache lock; the
        // generation bump inside cancels any in-flight list fetch.
        let snapshot = self.cache.begin_mutation(|entries| mutation.apply(entries));

        let result = match &mutation {
            Mutation::Create(draft) => self.gateway.create(draft).await,
            Mutation::Update { id, patch } => self.gateway.update(id, patch).await,
            Mutation::Delete { id } => self.gateway.delete(id).await,
        };

        match result {
            Ok(confirmed) => {
                self.cache
                    .settle_commit(snapshot, |entries| mutation.merge(entries, &confirmed));
                debug!(id = %confirmed.id, "mutation confirmed");
                Ok(confirmed)
            }
            Err(err) => {
                self.cache.settle_rollback(snapshot);
                warn!(error = %err, "mutation failed, cache rolled back");
                Err(err)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GatewayError;
    use crate::coordinator::testing::{item, transport_error, wait_until, MockGateway};

    fn coordinator(
        gateway: Arc<MockGateway>,
    ) -> (MutationCoordinator<MockGateway>, Arc<ListCache>) {
        let cache = Arc::new(ListCache::new());
        (
            MutationCoordinator::new(gateway, Arc::clone(&cache)),
            cache,
        )
    }

    fn seed(cache: &ListCache, items: Vec<GroceryItem>) {
        let token = cache.generation();
        assert!(cache.apply_fetch(token, items));
    }

    #[tokio::test]
    async fn test_update_rolls_back_on_transport_failure() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_update(Err(transport_error()));
        let release = gateway.hold_next_call();
        let (mutations, cache) = coordinator(Arc::clone(&gateway));
        seed(&cache, vec![item("1", "Milk", false, 1)]);
        let before = cache.read();

        let task = tokio::spawn({
            let mutations = mutations.clone();
            async move { mutations.update("1", ItemPatch::quantity(2)).await }
        });

        // Optimistic visibility: the edit lands before the remote call
        // resolves.
        wait_until(|| cache.read()[0].quantity() == 2).await;
        assert!(cache.has_pending_mutation());

        release.send(()).unwrap();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(GatewayError::Transport(_))));

        // Rollback exactness: value-for-value identical to the
        // pre-mutation sequence.
        assert_eq!(cache.read(), before);
        assert_eq!(cache.read()[0].quantity(), 1);
        assert!(cache.is_stale());
        assert!(!cache.has_pending_mutation());
    }

    #[tokio::test]
    async fn test_create_confirms_pending_entry() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_create(Ok(item("9", "Eggs", false, 1)));
        let release = gateway.hold_next_call();
        let (mutations, cache) = coordinator(Arc::clone(&gateway));
        seed(&cache, vec![item("1", "Milk", false, 1)]);

        let task = tokio::spawn({
            let mutations = mutations.clone();
            async move { mutations.create(NewItem::new("Eggs", false, 1)).await }
        });

        // A temporary second entry appears immediately.
        wait_until(|| cache.read().len() == 2).await;
        let speculative = cache.read();
        assert!(speculative[1].is_pending());
        assert_eq!(speculative[1].name(), "Eggs");

        release.send(()).unwrap();
        let confirmed = task.await.unwrap().expect("create should succeed");
        assert_eq!(confirmed.id, "9");

        // Exactly one entry transitioned from temporary to confirmed.
        let entries = cache.read();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id(), Some("9"));
        assert!(entries.iter().all(|e| !e.is_pending()));
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_create_rollback_discards_pending_entry() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_create(Err(GatewayError::Validation("quantity out of range".into())));
        let (mutations, cache) = coordinator(gateway);
        seed(&cache, vec![item("1", "Milk", false, 1)]);

        let result = mutations.create(NewItem::new("Eggs", false, 1)).await;
        assert!(matches!(result, Err(GatewayError::Validation(_))));

        let entries = cache.read();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), Some("1"));
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_delete_restores_item_on_not_found() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_delete(Err(GatewayError::NotFound("no such item".into())));
        let release = gateway.hold_next_call();
        let (mutations, cache) = coordinator(Arc::clone(&gateway));
        seed(&cache, vec![item("1", "Milk", false, 1)]);

        let task = tokio::spawn({
            let mutations = mutations.clone();
            async move { mutations.delete("1").await }
        });

        // The item disappears immediately.
        wait_until(|| cache.read().is_empty()).await;

        release.send(()).unwrap();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(GatewayError::NotFound(_))));

        // The deleted item reappears.
        let entries = cache.read();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), Some("1"));
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_delete_success_keeps_item_removed() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_delete(Ok(item("1", "Milk", false, 1)));
        let (mutations, cache) = coordinator(gateway);
        seed(
            &cache,
            vec![item("1", "Milk", false, 1), item("2", "Eggs", false, 6)],
        );

        let deleted = mutations.delete("1").await.expect("delete should succeed");
        assert_eq!(deleted.id, "1");

        let entries = cache.read();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), Some("2"));
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_update_on_unknown_id_is_cache_noop() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_update(Err(GatewayError::NotFound("no such item".into())));
        let (mutations, cache) = coordinator(gateway);
        seed(&cache, vec![item("1", "Milk", false, 1)]);
        let before = cache.read();

        let result = mutations.update("42", ItemPatch::bought(true)).await;
        assert!(matches!(result, Err(GatewayError::NotFound(_))));
        assert_eq!(cache.read(), before);
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_update_success_leaves_speculative_state_standing() {
        let gateway = Arc::new(MockGateway::new());
        // The server echoes back a derived name change the client did not
        // ask for; reconciliation happens via the staleness re-fetch, not
        // at settle.
        gateway.push_update(Ok(item("1", "Milk (2%)", true, 1)));
        let (mutations, cache) = coordinator(gateway);
        seed(&cache, vec![item("1", "Milk", false, 1)]);

        mutations
            .update("1", ItemPatch::bought(true))
            .await
            .expect("update should succeed");

        let entries = cache.read();
        assert_eq!(entries[0].name(), "Milk");
        assert!(entries[0].bought());
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_create_clamps_quantity_before_send() {
        let gateway = Arc::new(MockGateway::new());
        let (mutations, cache) = coordinator(gateway);

        // No scripted response: the mock echoes the payload it received.
        let confirmed = mutations
            .create(NewItem {
                name: "Flour".to_string(),
                bought: false,
                quantity: 0,
            })
            .await
            .expect("create should succeed");

        assert_eq!(confirmed.quantity, 1);
        assert!(cache.is_stale());
    }

    #[tokio::test]
    async fn test_overlapping_mutations_compose_in_arrival_order() {
        let gateway = Arc::new(MockGateway::new());
        gateway.push_create(Ok(item("9", "Eggs", false, 1)));
        gateway.push_delete(Ok(item("1", "Milk", false, 1)));
        let release = gateway.hold_next_call();
        let (mutations, cache) = coordinator(Arc::clone(&gateway));
        seed(&cache, vec![item("1", "Milk", false, 1)]);

        // First mutation: a create held in flight at the gateway.
        let create_task = tokio::spawn({
            let mutations = mutations.clone();
            async move { mutations.create(NewItem::new("Eggs", false, 1)).await }
        });
        wait_until(|| cache.read().len() == 2).await;

        // Second mutation begins before the first settles and operates on
        // the composed state.
        mutations.delete("1").await.expect("delete should succeed");
        let entries = cache.read();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_pending());

        release.send(()).unwrap();
        create_task
            .await
            .unwrap()
            .expect("create should succeed");

        let entries = cache.read();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), Some("9"));
        assert!(cache.is_stale());
    }
}
