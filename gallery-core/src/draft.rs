//! Local draft store.
//!
//! The draft is the editor's working copy of the item list. Mutations are
//! synchronous and never touch the remote store; each one re-persists the
//! whole list through a [`DraftSlot`] in a single write. The in-memory list
//! is replaced only after that write succeeds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{draft_io_err, DraftError};
use crate::remote::RemoteStore;
use crate::seed;
use crate::types::{Item, ItemFields, ItemId, ItemPatch};

// ---------------------------------------------------------------------------
// Persistence slots
// ---------------------------------------------------------------------------

/// A single keyed text slot holding the serialized draft.
pub trait DraftSlot {
    /// `Ok(None)` when nothing has been persisted yet.
    fn read(&self) -> Result<Option<String>, DraftError>;
    fn write(&mut self, text: &str) -> Result<(), DraftError>;
}

/// Slot kept in memory. Used by tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Option<String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(text: impl Into<String>) -> Self {
        Self {
            value: Some(text.into()),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl DraftSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, DraftError> {
        Ok(self.value.clone())
    }

    fn write(&mut self, text: &str) -> Result<(), DraftError> {
        self.value = Some(text.to_owned());
        Ok(())
    }
}

/// Slot backed by a JSON file. Writes go to a `.tmp` sibling and are renamed
/// into place, so readers never observe a partial list.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl DraftSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, DraftError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(draft_io_err(&self.path, e)),
        }
    }

    fn write(&mut self, text: &str) -> Result<(), DraftError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| draft_io_err(dir, e))?;
        }
        let tmp = self.tmp_path();
        std::fs::write(&tmp, text).map_err(|e| draft_io_err(&tmp, e))?;
        set_file_permissions(&tmp)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(draft_io_err(&self.path, e));
        }
        Ok(())
    }
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), DraftError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| draft_io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), DraftError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Draft store
// ---------------------------------------------------------------------------

/// Ordered working copy of the item list. Array order is the desired
/// `display_order`.
#[derive(Debug)]
pub struct DraftStore<S> {
    slot: S,
    items: Vec<Item>,
}

impl<S: DraftSlot> DraftStore<S> {
    /// An empty, not yet loaded draft.
    pub fn new(slot: S) -> Self {
        Self {
            slot,
            items: Vec::new(),
        }
    }

    /// Load the persisted draft, or seed it from `remote`.
    ///
    /// Never fails: an unreadable or corrupt slot falls back to the remote
    /// list, and an unreachable remote yields an empty draft. The seeded list
    /// is not persisted until the first mutation.
    pub fn load(&mut self, remote: &dyn RemoteStore) -> &[Item] {
        self.items = match self.slot.read() {
            Ok(Some(text)) => match serde_json::from_str::<Vec<Item>>(&text) {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!("stored draft is corrupt, seeding from remote: {err}");
                    fetch_or_empty(remote)
                }
            },
            Ok(None) => {
                tracing::debug!("no stored draft, seeding from remote");
                fetch_or_empty(remote)
            }
            Err(err) => {
                tracing::warn!("stored draft unreadable, seeding from remote: {err}");
                fetch_or_empty(remote)
            }
        };
        &self.items
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Append a new item with placeholder id `max(ids) + 1`, or `1` when empty.
    pub fn add(&mut self, fields: ItemFields) -> Result<ItemId, DraftError> {
        let id = ItemId(self.max_id().map_or(1, |max| max + 1));
        let mut items = self.items.clone();
        items.push(Item::new(id, fields));
        self.persist(items)?;
        Ok(id)
    }

    /// Merge `patch` into the item with `id`. Returns `false` if absent.
    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> Result<bool, DraftError> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let mut items = self.items.clone();
        patch.apply(&mut items[index].fields);
        self.persist(items)?;
        Ok(true)
    }

    /// Remove the item with `id`. Returns `false` if absent.
    pub fn delete(&mut self, id: ItemId) -> Result<bool, DraftError> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let mut items = self.items.clone();
        items.remove(index);
        self.persist(items)?;
        Ok(true)
    }

    /// Replace the list with a permutation of the current items.
    pub fn reorder(&mut self, items: Vec<Item>) -> Result<(), DraftError> {
        if !same_ids(&self.items, &items) {
            return Err(DraftError::NotAPermutation {
                expected: self.items.len(),
                actual: items.len(),
            });
        }
        self.persist(items)
    }

    /// Move the item with `id` to 0-based `position` (clamped to the end).
    /// Returns `false` if absent.
    pub fn move_item(&mut self, id: ItemId, position: usize) -> Result<bool, DraftError> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let mut items = self.items.clone();
        let item = items.remove(index);
        let position = position.min(items.len());
        items.insert(position, item);
        self.reorder(items)?;
        Ok(true)
    }

    /// Discard the draft and replace it with the built-in seed set.
    pub fn reset_to_default(&mut self) -> Result<(), DraftError> {
        self.persist(seed::default_items())
    }

    /// Give the item at `position` the id the remote store assigned it.
    ///
    /// If another draft item already holds `new_id` (a placeholder that has
    /// not been inserted yet), that item moves to a fresh placeholder above
    /// every id in the draft.
    pub fn reassign_id(&mut self, position: usize, new_id: ItemId) -> Result<(), DraftError> {
        let len = self.items.len();
        let Some(current) = self.items.get(position) else {
            return Err(DraftError::PositionOutOfRange { position, len });
        };
        if current.id == new_id {
            return Ok(());
        }

        let mut items = self.items.clone();
        if let Some(other) = items
            .iter()
            .enumerate()
            .position(|(i, item)| i != position && item.id == new_id)
        {
            let fresh = ItemId(self.max_id().unwrap_or(0).max(new_id.0) + 1);
            tracing::debug!(
                "placeholder {} collides with assigned id, moving it to {}",
                new_id,
                fresh
            );
            items[other].id = fresh;
        }
        items[position].id = new_id;
        self.persist(items)
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn max_id(&self) -> Option<i64> {
        self.items.iter().map(|item| item.id.0).max()
    }

    fn persist(&mut self, items: Vec<Item>) -> Result<(), DraftError> {
        let json = serde_json::to_string_pretty(&items)?;
        self.slot.write(&json)?;
        self.items = items;
        Ok(())
    }
}

fn fetch_or_empty(remote: &dyn RemoteStore) -> Vec<Item> {
    remote.fetch_all().unwrap_or_else(|err| {
        tracing::warn!("remote fetch failed, starting with an empty draft: {err}");
        Vec::new()
    })
}

fn same_ids(current: &[Item], proposed: &[Item]) -> bool {
    if current.len() != proposed.len() {
        return false;
    }
    let mut a: Vec<ItemId> = current.iter().map(|i| i.id).collect();
    let mut b: Vec<ItemId> = proposed.iter().map(|i| i.id).collect();
    a.sort();
    b.sort();
    a == b && a.iter().collect::<HashSet<_>>().len() == a.len()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
