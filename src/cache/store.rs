//! The collection cache and the mutation snapshot machinery.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{GroceryItem, NewItem};

/// One entry in the cached collection.
///
/// A `Pending` entry is a locally created item the server has not confirmed
/// yet: it has no id, so update and delete can never address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Confirmed(GroceryItem),
    Pending(NewItem),
}

impl CacheEntry {
    /// Server-assigned id, if confirmed.
    pub fn id(&self) -> Option<&str> {
        match self {
            CacheEntry::Confirmed(item) => Some(&item.id),
            CacheEntry::Pending(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CacheEntry::Confirmed(item) => &item.name,
            CacheEntry::Pending(draft) => &draft.name,
        }
    }

    pub fn bought(&self) -> bool {
        match self {
            CacheEntry::Confirmed(item) => item.bought,
            CacheEntry::Pending(draft) => draft.bought,
        }
    }

    pub fn quantity(&self) -> u8 {
        match self {
            CacheEntry::Confirmed(item) => item.quantity,
            CacheEntry::Pending(draft) => draft.quantity,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CacheEntry::Pending(_))
    }
}

/// Pre-mutation copy of the collection.
///
/// Returned by the begin-mutation step and consumed exactly once at settle:
/// commit discards it, rollback restores it verbatim. Owned by the one
/// in-flight mutation that created it.
#[derive(Debug)]
pub struct CacheSnapshot {
    entries: Vec<CacheEntry>,
}

struct CacheState {
    entries: Vec<CacheEntry>,
    /// True whenever the entries may not reflect remote truth. Starts true:
    /// the cache is born empty and the first read must populate it.
    stale: bool,
    /// Bumped at every mutation's snapshot point. A fetch result carries the
    /// generation it started under and is discarded on mismatch.
    generation: u64,
    /// Number of mutations between begin and settle. While nonzero, fetch
    /// results are never applied.
    pending: usize,
    refreshed_at: Option<DateTime<Utc>>,
}

/// The one in-memory store for the collection.
///
/// Created once at startup; every coordinator receives an explicit
/// reference. All operations take the internal lock for their whole
/// read-then-write step and never suspend while holding it, so no caller
/// observes a torn state.
pub struct ListCache {
    state: Mutex<CacheState>,
}

impl ListCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: Vec::new(),
                stale: true,
                generation: 0,
                pending: 0,
                refreshed_at: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current entry sequence, in insertion order.
    pub fn read(&self) -> Vec<CacheEntry> {
        self.state().entries.clone()
    }

    /// Full replace of the entry sequence. Does not touch staleness; the
    /// cache validates nothing, callers own the invariants.
    pub fn write(&self, entries: Vec<CacheEntry>) {
        self.state().entries = entries;
    }

    pub fn mark_stale(&self) {
        self.state().stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.state().stale
    }

    /// Current read-cancellation generation. A fetch captures this before
    /// the wire call and passes it back to `apply_fetch`.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Whether any mutation is between its snapshot point and its settle.
    pub fn has_pending_mutation(&self) -> bool {
        self.state().pending > 0
    }

    /// When the cache last reconciled against the server, if ever.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.state().refreshed_at
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.refreshed_at().map(|at| (Utc::now() - at).num_minutes())
    }

    /// Begin a mutation: bump the generation (cancelling in-flight reads),
    /// snapshot the sequence, and run the speculative edit, all as one
    /// uninterruptible step under the lock.
    ///
    /// A second mutation that begins before the first settles operates on
    /// the sequence as speculatively modified by the first.
    pub(crate) fn begin_mutation<F>(&self, apply: F) -> CacheSnapshot
    where
        F: FnOnce(&mut Vec<CacheEntry>),
    {
        let mut state = self.state();
        state.generation += 1;
        state.pending += 1;
        let snapshot = CacheSnapshot {
            entries: state.entries.clone(),
        };
        apply(&mut state.entries);
        snapshot
    }

    /// Settle a successful mutation: discard the snapshot, run the
    /// on-success merge, and mark the collection stale for re-fetch.
    pub(crate) fn settle_commit<F>(&self, snapshot: CacheSnapshot, merge: F)
    where
        F: FnOnce(&mut Vec<CacheEntry>),
    {
        drop(snapshot);
        let mut state = self.state();
        merge(&mut state.entries);
        state.pending = state.pending.saturating_sub(1);
        state.stale = true;
    }

    /// Settle a failed mutation: restore the pre-mutation sequence verbatim
    /// and mark the collection stale for re-fetch.
    pub(crate) fn settle_rollback(&self, snapshot: CacheSnapshot) {
        let mut state = self.state();
        state.entries = snapshot.entries;
        state.pending = state.pending.saturating_sub(1);
        state.stale = true;
    }

    /// Apply an authoritative fetch result.
    ///
    /// Rejected when the generation moved past `token` (a mutation began
    /// after the fetch started) or while any speculative write is
    /// uncommitted. Rejection is advisory cancellation: the result is
    /// simply discarded and the cache stays stale.
    pub(crate) fn apply_fetch(&self, token: u64, items: Vec<GroceryItem>) -> bool {
        let mut state = self.state();
        if state.pending > 0 || token != state.generation {
            debug!(
                token,
                generation = state.generation,
                pending = state.pending,
                "discarding cancelled fetch result"
            );
            return false;
        }
        state.entries = items.into_iter().map(CacheEntry::Confirmed).collect();
        state.stale = false;
        state.refreshed_at = Some(Utc::now());
        true
    }
}

impl Default for ListCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
