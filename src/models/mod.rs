//! Data models for the grocery collection.
//!
//! This module contains the types shared by the gateway, cache, and
//! coordinators:
//!
//! - `GroceryItem`: a server-confirmed item with its assigned id
//! - `NewItem`: the create payload, before the server assigns an id
//! - `ItemPatch`: a partial update with at least one changed field
//! - `quantity`: the [1, 99] domain constraint in one place

pub mod item;
pub mod quantity;

pub use item::{GroceryItem, ItemPatch, NewItem};
