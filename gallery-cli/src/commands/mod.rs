pub mod deploy;
pub mod diff;
pub mod init;
pub mod items;
pub mod list;

use std::path::PathBuf;

use anyhow::{Context, Result};

use gallery_core::{config, DraftStore, FileSlot, GalleryConfig, RemoteStore};
use gallery_deploy::pipeline;

/// Everything a command needs: config, live remote, loaded draft.
pub struct Session {
    pub config: GalleryConfig,
    pub remote: Box<dyn RemoteStore>,
    pub draft: DraftStore<FileSlot>,
}

impl Session {
    pub fn open() -> Result<Self> {
        let home: PathBuf = config::home().context("could not determine home directory")?;
        let config =
            config::load_at(&home).context("failed to load config; run `gallery init` first")?;
        let remote = pipeline::open_remote(&config.remote, |var| std::env::var(var).ok())
            .context("failed to open remote store")?;
        let draft = pipeline::open_draft(&home, &config, remote.as_ref());
        Ok(Self {
            config,
            remote,
            draft,
        })
    }
}
