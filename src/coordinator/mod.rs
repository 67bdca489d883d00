//! Coordinators between the cache and the gateway.
//!
//! - `mutation`: the optimistic protocol (cancel pending reads, snapshot,
//!   speculative apply, remote call, settle, mark stale)
//! - `read`: authoritative fetches with coalescing and stale-result
//!   cancellation

pub mod mutation;
pub mod read;

pub use mutation::{Mutation, MutationCoordinator};
pub use read::{ListState, ReadCoordinator};
