//! Grocery item types.
//!
//! The wire shape and the domain shape coincide here: the remote store
//! speaks plain `{ id, name, bought, quantity }` JSON.

use serde::{Deserialize, Serialize};

use super::quantity;

/// A grocery item as the remote store knows it.
///
/// Every confirmed item carries a non-empty, server-assigned `id`. Items
/// that exist only as speculative local creates are held in the cache as
/// pending entries and never as a `GroceryItem` (see `cache::CacheEntry`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub id: String,
    pub name: String,
    pub bought: bool,
    pub quantity: u8,
}

/// The create payload: an item without identity. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub bought: bool,
    pub quantity: u8,
}

impl NewItem {
    /// Build a create payload with the quantity clamped into range.
    pub fn new(name: impl Into<String>, bought: bool, quantity: u8) -> Self {
        Self {
            name: name.into(),
            bought,
            quantity: quantity::clamp(quantity),
        }
    }
}

impl Default for NewItem {
    /// The payload behind the plain "add item" action: unnamed, not yet
    /// bought, quantity 1.
    fn default() -> Self {
        Self {
            name: String::new(),
            bought: false,
            quantity: quantity::MIN,
        }
    }
}

/// A partial update for an existing item. `None` fields are left untouched
/// and omitted from the PATCH body.
///
/// Callers must set at least one field. That contract is guaranteed by the
/// constructors here and by the store-level handlers, not checked at
/// runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bought: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u8>,
}

impl ItemPatch {
    /// Patch that renames the item.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch that sets the bought flag.
    pub fn bought(bought: bool) -> Self {
        Self {
            bought: Some(bought),
            ..Self::default()
        }
    }

    /// Patch that sets the quantity, clamped into range.
    pub fn quantity(quantity: u8) -> Self {
        Self {
            quantity: Some(quantity::clamp(quantity)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bought.is_none() && self.quantity.is_none()
    }

    /// Merge the set fields into `item`, leaving the rest untouched.
    pub fn apply_to(&self, item: &mut GroceryItem) {
        if let Some(ref name) = self.name {
            item.name = name.clone();
        }
        if let Some(bought) = self.bought {
            item.bought = bought;
        }
        if let Some(q) = self.quantity {
            item.quantity = q;
        }
    }
}
