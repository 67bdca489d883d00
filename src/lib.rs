//! Client-side core for a grocery list application.
//!
//! The crate keeps a local, in-memory copy of the remote grocery collection
//! and gives every create, update, and delete the illusion of completing
//! instantly: the cache is rewritten speculatively before the request is
//! sent, rolled back if the request fails, and marked stale either way so
//! the next read reconciles against the server.
//!
//! Module map:
//!
//! - [`api`]: the REST gateway (`ItemGateway` trait plus the reqwest-backed
//!   `HttpItemGateway`) and the gateway error taxonomy
//! - [`cache`]: the process-local collection cache with its staleness flag,
//!   read-cancellation generation, and mutation snapshots
//! - [`coordinator`]: the optimistic mutation protocol and the coalescing
//!   read path
//! - [`models`]: grocery item types and the quantity domain constraint
//! - [`store`]: the construction point wiring everything together
//!
//! The library installs no tracing subscriber; the embedding application
//! owns that.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod models;
pub mod store;

pub use api::{GatewayError, HttpItemGateway, ItemGateway};
pub use cache::{CacheEntry, ListCache};
pub use config::Config;
pub use coordinator::{ListState, Mutation, MutationCoordinator, ReadCoordinator};
pub use models::{GroceryItem, ItemPatch, NewItem};
pub use store::GroceryStore;
