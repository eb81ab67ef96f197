//! In-memory cart storage.
//!
//! Carts live in a `DashMap` keyed by an opaque cart id. Every mutation and
//! read refreshes `touched_at`; a background task sweeps idle carts past the
//! configured TTL.

use dashmap::DashMap;
use shared::models::{entry_key, CartEntry, CartItemInput};
use shared::util::now_millis;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[derive(Debug)]
struct Cart {
    /// entry_key -> entry
    entries: std::collections::HashMap<String, CartEntry>,
    touched_at: i64,
}

impl Cart {
    fn new() -> Self {
        Self {
            entries: std::collections::HashMap::new(),
            touched_at: now_millis(),
        }
    }
}

/// Hard cap on a single entry's quantity. Merges clamp to it, so line
/// totals can never overflow `i64` even at the highest catalog price.
pub const MAX_QUANTITY: i64 = 9_999;

/// Process-wide cart holder
#[derive(Debug, Default)]
pub struct CartStore {
    carts: DashMap<String, Cart>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cart and return its id
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.carts.insert(id.clone(), Cart::new());
        id
    }

    pub fn exists(&self, cart_id: &str) -> bool {
        self.carts.contains_key(cart_id)
    }

    /// Add an item, merging quantity into an existing entry with the same
    /// `(product_id, attributes)` key. Creates the cart if the id is unknown.
    pub fn add_item(&self, cart_id: &str, input: &CartItemInput) {
        let key = entry_key(input.product_id, &input.attributes);
        let mut cart = self
            .carts
            .entry(cart_id.to_string())
            .or_insert_with(Cart::new);
        cart.touched_at = now_millis();
        cart.entries
            .entry(key)
            .and_modify(|e| {
                e.quantity = e.quantity.saturating_add(input.quantity).min(MAX_QUANTITY)
            })
            .or_insert_with(|| CartEntry {
                product_id: input.product_id,
                quantity: input.quantity.min(MAX_QUANTITY),
                attributes: input.attributes.clone(),
            });
    }

    /// Set an entry's quantity outright; zero or negative removes it.
    /// Returns false if the entry does not exist.
    pub fn set_quantity(&self, cart_id: &str, input: &CartItemInput) -> bool {
        let key = entry_key(input.product_id, &input.attributes);
        let Some(mut cart) = self.carts.get_mut(cart_id) else {
            return false;
        };
        cart.touched_at = now_millis();
        if !cart.entries.contains_key(&key) {
            return false;
        }
        if input.quantity <= 0 {
            cart.entries.remove(&key);
        } else if let Some(entry) = cart.entries.get_mut(&key) {
            entry.quantity = input.quantity.min(MAX_QUANTITY);
        }
        true
    }

    /// Remove one entry by its key. Returns false if nothing was removed.
    pub fn remove(&self, cart_id: &str, key: &str) -> bool {
        let Some(mut cart) = self.carts.get_mut(cart_id) else {
            return false;
        };
        cart.touched_at = now_millis();
        cart.entries.remove(key).is_some()
    }

    /// Empty the cart but keep it alive
    pub fn clear(&self, cart_id: &str) {
        if let Some(mut cart) = self.carts.get_mut(cart_id) {
            cart.entries.clear();
            cart.touched_at = now_millis();
        }
    }

    /// Delete the cart entirely
    pub fn delete(&self, cart_id: &str) -> bool {
        self.carts.remove(cart_id).is_some()
    }

    /// Snapshot of the cart's entries (refreshes the idle timer)
    pub fn entries(&self, cart_id: &str) -> Vec<CartEntry> {
        match self.carts.get_mut(cart_id) {
            Some(mut cart) => {
                cart.touched_at = now_millis();
                cart.entries.values().cloned().collect()
            }
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    /// Drop carts idle longer than `ttl`. Returns the number evicted.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        let cutoff = now_millis() - ttl.as_millis() as i64;
        let before = self.carts.len();
        self.carts.retain(|_, cart| cart.touched_at >= cutoff);
        let evicted = before - self.carts.len();
        if evicted > 0 {
            info!(evicted, "Evicted idle carts");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn input(product_id: i64, quantity: i64) -> CartItemInput {
        CartItemInput {
            product_id,
            quantity,
            attributes: BTreeMap::new(),
        }
    }

    fn input_with_attr(product_id: i64, quantity: i64, k: &str, v: &str) -> CartItemInput {
        let mut attributes = BTreeMap::new();
        attributes.insert(k.to_string(), v.to_string());
        CartItemInput {
            product_id,
            quantity,
            attributes,
        }
    }

    #[test]
    fn add_merges_same_selection() {
        let store = CartStore::new();
        let id = store.create();
        store.add_item(&id, &input(1, 2));
        store.add_item(&id, &input(1, 3));
        let entries = store.entries(&id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 5);
    }

    #[test]
    fn quantities_clamp_at_the_cap() {
        let store = CartStore::new();
        let id = store.create();
        store.add_item(&id, &input(1, i64::MAX / 2));
        store.add_item(&id, &input(1, i64::MAX / 2));
        assert_eq!(store.entries(&id)[0].quantity, MAX_QUANTITY);
        store.set_quantity(&id, &input(1, MAX_QUANTITY + 1));
        assert_eq!(store.entries(&id)[0].quantity, MAX_QUANTITY);
    }

    #[test]
    fn different_attributes_are_distinct_entries() {
        let store = CartStore::new();
        let id = store.create();
        store.add_item(&id, &input_with_attr(1, 1, "size", "M"));
        store.add_item(&id, &input_with_attr(1, 1, "size", "L"));
        assert_eq!(store.entries(&id).len(), 2);
    }

    #[test]
    fn add_to_unknown_cart_creates_it() {
        let store = CartStore::new();
        store.add_item("ghost", &input(1, 1));
        assert!(store.exists("ghost"));
        assert_eq!(store.entries("ghost").len(), 1);
    }

    #[test]
    fn set_quantity_zero_removes_entry() {
        let store = CartStore::new();
        let id = store.create();
        store.add_item(&id, &input(1, 2));
        assert!(store.set_quantity(&id, &input(1, 0)));
        assert!(store.entries(&id).is_empty());
    }

    #[test]
    fn set_quantity_on_missing_entry_fails() {
        let store = CartStore::new();
        let id = store.create();
        assert!(!store.set_quantity(&id, &input(42, 1)));
    }

    #[test]
    fn evict_drops_only_idle_carts() {
        let store = CartStore::new();
        let stale = store.create();
        let fresh = store.create();
        // backdate the stale cart past any reasonable TTL
        store.carts.get_mut(&stale).unwrap().touched_at = now_millis() - 10_000;
        let evicted = store.evict_idle(Duration::from_secs(5));
        assert_eq!(evicted, 1);
        assert!(!store.exists(&stale));
        assert!(store.exists(&fresh));
    }

    #[test]
    fn clear_keeps_cart_alive() {
        let store = CartStore::new();
        let id = store.create();
        store.add_item(&id, &input(1, 2));
        store.clear(&id);
        assert!(store.exists(&id));
        assert!(store.entries(&id).is_empty());
    }
}
