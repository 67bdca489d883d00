//! Process-local cache for the grocery collection.
//!
//! This module provides the `ListCache`: one in-memory slot holding the
//! last known collection snapshot, a staleness flag forcing re-fetch after
//! every settled mutation, a generation counter that cancels in-flight
//! reads, and the snapshot handles the mutation protocol rolls back with.
//!
//! Nothing here touches disk; the cache lives and dies with the process.

pub mod store;

pub use store::{CacheEntry, CacheSnapshot, ListCache};
