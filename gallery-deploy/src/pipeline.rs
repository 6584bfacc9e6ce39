//! Wiring from configuration to live stores, shared by every CLI command.

use std::path::Path;

use gallery_core::{DraftStore, FileSlot, GalleryConfig, RemoteConfig, RemoteStore};

use crate::{error::DeployError, file_remote::FileRemote, rest::RestRemote};

/// Open the remote store `config` points at.
///
/// `lookup_env` resolves the API key variable for REST remotes; callers pass
/// `|k| std::env::var(k).ok()`.
pub fn open_remote(
    config: &RemoteConfig,
    lookup_env: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn RemoteStore>, DeployError> {
    match config {
        RemoteConfig::File { path } => Ok(Box::new(FileRemote::new(path))),
        RemoteConfig::Rest {
            url,
            table,
            api_key_env,
        } => {
            let api_key = lookup_env(api_key_env).ok_or_else(|| DeployError::MissingApiKey {
                var: api_key_env.clone(),
            })?;
            Ok(Box::new(RestRemote::new(url, table, api_key)))
        }
    }
}

/// Open the draft file for `config`, loaded (or seeded from `remote`).
pub fn open_draft(
    home: &Path,
    config: &GalleryConfig,
    remote: &dyn RemoteStore,
) -> DraftStore<FileSlot> {
    let mut draft = DraftStore::new(FileSlot::new(config.draft_path_at(home)));
    draft.load(remote);
    draft
}

/// Write the built-in seed set as the first draft.
///
/// Only happens when no draft file exists yet and the remote store is empty.
/// Returns whether the draft was seeded.
pub fn bootstrap_draft(
    home: &Path,
    config: &GalleryConfig,
    remote: &dyn RemoteStore,
) -> Result<bool, DeployError> {
    if config.draft_path_at(home).exists() {
        return Ok(false);
    }
    if !remote.fetch_all().map_err(DeployError::Fetch)?.is_empty() {
        return Ok(false);
    }
    let mut draft = DraftStore::new(FileSlot::new(config.draft_path_at(home)));
    draft.reset_to_default()?;
    tracing::info!("seeded a new draft with {} items", draft.items().len());
    Ok(true)
}
