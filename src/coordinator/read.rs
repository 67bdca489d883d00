//! Authoritative reads of the collection.
//!
//! The read coordinator owns the only path that writes server truth into
//! the cache. Fetches are coalesced (one in-flight `list` per collection),
//! and a fetch that a mutation has since cancelled is discarded rather
//! than applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::api::{GatewayError, ItemGateway};
use crate::cache::{CacheEntry, ListCache};

/// The collection as the rendering layer sees it: data, loading flag, and
/// the last fetch error alongside last-known-good data.
#[derive(Debug, Clone)]
pub struct ListState {
    pub items: Vec<CacheEntry>,
    pub is_loading: bool,
    pub error: Option<Arc<GatewayError>>,
}

/// Fetches the collection whenever the cache is stale.
pub struct ReadCoordinator<G> {
    gateway: Arc<G>,
    cache: Arc<ListCache>,
    /// Serializes fetches; waiters observe the in-flight result instead of
    /// issuing their own.
    fetch_gate: AsyncMutex<()>,
    loading: AtomicBool,
    last_error: Mutex<Option<Arc<GatewayError>>>,
}

impl<G: ItemGateway> ReadCoordinator<G> {
    pub fn new(gateway: Arc<G>, cache: Arc<ListCache>) -> Self {
        Self {
            gateway,
            cache,
            fetch_gate: AsyncMutex::new(()),
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Current collection state, refreshed first if the cache is stale.
    ///
    /// Refresh is skipped while a mutation's speculative write is
    /// uncommitted; the staleness flag survives, so a later read picks the
    /// re-fetch up.
    pub async fn items(&self) -> ListState {
        if self.cache.is_stale() && !self.cache.has_pending_mutation() {
            self.refresh().await;
        }
        self.state()
    }

    /// Non-blocking view of the current state, for callers that poll.
    pub fn state(&self) -> ListState {
        ListState {
            items: self.cache.read(),
            is_loading: self.loading.load(Ordering::SeqCst),
            error: self.error_slot().clone(),
        }
    }

    async fn refresh(&self) {
        let _gate = self.fetch_gate.lock().await;
        if !self.cache.is_stale() {
            // A fetch that completed while we waited on the gate already
            // reconciled the cache.
            return;
        }

        self.loading.store(true, Ordering::SeqCst);
        let token = self.cache.generation();
        let result = self.gateway.list().await;
        self.loading.store(false, Ordering::SeqCst);

        match result {
            Ok(items) => {
                if self.cache.apply_fetch(token, items) {
                    *self.error_slot() = None;
                    debug!("grocery list reconciled");
                }
                // A rejected result leaves the cache stale; the next read
                // fetches again.
            }
            Err(err) => {
                // Last-known-good data stays visible alongside the error.
                warn!(error = %err, "list fetch failed");
                *self.error_slot() = Some(Arc::new(err));
            }
        }
    }

    fn error_slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<GatewayError>>> {
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// Tests
// ============================================================================
