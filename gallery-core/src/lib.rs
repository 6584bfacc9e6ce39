//! Gallery core library: item model, local draft, remote store boundary, config.
//!
//! - [`types`]: item records and their defaulting rules
//! - [`draft`]: the local draft store and its persistence slots
//! - [`remote`]: the [`RemoteStore`] trait and an in-memory store
//! - [`config`]: `~/.gallery/config.yaml`
//! - [`seed`]: the built-in seed set

pub mod config;
pub mod draft;
pub mod error;
pub mod paths;
pub mod remote;
pub mod seed;
pub mod types;

pub use config::{GalleryConfig, Mode, RemoteConfig};
pub use draft::{DraftSlot, DraftStore, FileSlot, MemorySlot};
pub use error::{ConfigError, DraftError, RemoteError};
pub use remote::{MemoryRemote, RemoteStore, RemoteUpdate};
pub use types::{Category, Item, ItemFields, ItemId, ItemPatch, DEFAULT_CATEGORY};
