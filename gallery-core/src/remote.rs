//! Remote store boundary.
//!
//! The remote store is the authority for published state and for id
//! assignment. Calls are blocking and are issued one at a time by the
//! deploy driver.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::RemoteError;
use crate::types::{Item, ItemFields, ItemId};

/// Change carried by [`RemoteStore::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoteUpdate {
    /// Replace every editable field.
    pub fields: Option<ItemFields>,
    pub display_order: Option<u32>,
}

impl RemoteUpdate {
    pub fn full(fields: ItemFields, display_order: u32) -> Self {
        Self {
            fields: Some(fields),
            display_order: Some(display_order),
        }
    }

    pub fn order_only(display_order: u32) -> Self {
        Self {
            fields: None,
            display_order: Some(display_order),
        }
    }

    /// Apply this change to a stored item.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(fields) = &self.fields {
            item.fields = fields.clone();
        }
        if let Some(order) = self.display_order {
            item.display_order = order;
        }
    }
}

pub trait RemoteStore {
    /// Every published item, ascending by `display_order` then id.
    fn fetch_all(&self) -> Result<Vec<Item>, RemoteError>;

    /// Create an item and return the identity the store assigned. Never
    /// returns an id the store has handed out before.
    fn insert(&self, fields: &ItemFields) -> Result<ItemId, RemoteError>;

    fn update(&self, id: ItemId, change: &RemoteUpdate) -> Result<(), RemoteError>;

    fn delete(&self, id: ItemId) -> Result<(), RemoteError>;
}

/// Sort published items the way `fetch_all` promises.
pub fn sort_published(items: &mut [Item]) {
    items.sort_by_key(|item| (item.display_order, item.id));
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct MemoryState {
    next_id: i64,
    items: BTreeMap<ItemId, Item>,
}

/// Process-local remote store.
#[derive(Debug)]
pub struct MemoryRemote {
    state: Mutex<MemoryState>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                items: BTreeMap::new(),
            }),
        }
    }

    /// Store pre-populated with `items`; the id sequence starts above the largest id.
    pub fn with_items(items: Vec<Item>) -> Self {
        let next_id = items.iter().map(|i| i.id.0).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(MemoryState {
                next_id,
                items: items.into_iter().map(|i| (i.id, i)).collect(),
            }),
        }
    }

    /// Move the id sequence forward, as if ids below `next_id` had been used.
    pub fn advance_sequence(&self, next_id: i64) {
        let mut state = self.lock();
        state.next_id = state.next_id.max(next_id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock still holds consistent data: every mutation is a
        // single map operation.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteStore for MemoryRemote {
    fn fetch_all(&self) -> Result<Vec<Item>, RemoteError> {
        let mut items: Vec<Item> = self.lock().items.values().cloned().collect();
        sort_published(&mut items);
        Ok(items)
    }

    fn insert(&self, fields: &ItemFields) -> Result<ItemId, RemoteError> {
        let mut state = self.lock();
        let id = ItemId(state.next_id);
        state.next_id += 1;
        state.items.insert(id, Item::new(id, fields.clone()));
        Ok(id)
    }

    fn update(&self, id: ItemId, change: &RemoteUpdate) -> Result<(), RemoteError> {
        let mut state = self.lock();
        let item = state
            .items
            .get_mut(&id)
            .ok_or(RemoteError::NotFound { id })?;
        change.apply_to(item);
        Ok(())
    }

    fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        self.lock()
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(RemoteError::NotFound { id })
    }
}
