//! File-backed remote store.
//!
//! Persists a [`PublishedFile`] JSON document, by default at
//! `<home>/.gallery/published.json`. Every mutation loads the file, applies
//! the change, and writes it back through a `.tmp` sibling + rename.
//! `next_id` only ever grows, so deleted ids are never handed out again.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use gallery_core::{
    error::remote_io_err,
    remote::sort_published,
    Item, ItemFields, ItemId, RemoteError, RemoteStore, RemoteUpdate,
};

/// On-disk published store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishedFile {
    pub next_id: i64,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Default for PublishedFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileRemote {
    path: PathBuf,
}

impl FileRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store. A missing file is an empty store starting at id 1.
    pub fn load(&self) -> Result<PublishedFile, RemoteError> {
        if !self.path.exists() {
            return Ok(PublishedFile::default());
        }
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| remote_io_err(&self.path, e))?;
        let mut file: PublishedFile = serde_json::from_str(&contents)?;
        // Guard against hand-edited files whose sequence lags the ids in use.
        let floor = file.items.iter().map(|i| i.id.0).max().unwrap_or(0) + 1;
        file.next_id = file.next_id.max(floor);
        Ok(file)
    }

    /// Save the store atomically: `<path>.tmp` then rename.
    pub fn save(&self, file: &PublishedFile) -> Result<(), RemoteError> {
        let Some(dir) = self.path.parent() else {
            return Err(remote_io_err(
                &self.path,
                std::io::Error::other("invalid published store path"),
            ));
        };
        std::fs::create_dir_all(dir).map_err(|e| remote_io_err(dir, e))?;

        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| remote_io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| remote_io_err(&self.path, e))?;
        Ok(())
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut PublishedFile) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut file = self.load()?;
        let out = f(&mut file)?;
        self.save(&file)?;
        Ok(out)
    }
}

impl RemoteStore for FileRemote {
    fn fetch_all(&self) -> Result<Vec<Item>, RemoteError> {
        let mut items = self.load()?.items;
        sort_published(&mut items);
        Ok(items)
    }

    fn insert(&self, fields: &ItemFields) -> Result<ItemId, RemoteError> {
        self.modify(|file| {
            let id = ItemId(file.next_id);
            file.next_id += 1;
            file.items.push(Item::new(id, fields.clone()));
            Ok(id)
        })
    }

    fn update(&self, id: ItemId, change: &RemoteUpdate) -> Result<(), RemoteError> {
        self.modify(|file| {
            let item = file
                .items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or(RemoteError::NotFound { id })?;
            change.apply_to(item);
            Ok(())
        })
    }

    fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        self.modify(|file| {
            let before = file.items.len();
            file.items.retain(|i| i.id != id);
            if file.items.len() == before {
                return Err(RemoteError::NotFound { id });
            }
            Ok(())
        })
    }
}
