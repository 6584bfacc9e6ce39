//! `gallery init [--published <path> | --rest-url <url> ...] [--public]`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use gallery_core::{
    config::{self, DEFAULT_API_KEY_ENV, DEFAULT_TABLE},
    paths, GalleryConfig, Mode, RemoteConfig,
};
use gallery_deploy::pipeline;

/// Create the gallery config.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Publish to a local JSON file (default: ~/.gallery/published.json).
    #[arg(long, conflicts_with = "rest_url")]
    pub published: Option<PathBuf>,

    /// Publish to a PostgREST endpoint, e.g. https://<ref>.supabase.co
    #[arg(long)]
    pub rest_url: Option<String>,

    /// Table name on the REST endpoint (default: books).
    #[arg(long, requires = "rest_url")]
    pub table: Option<String>,

    /// Environment variable holding the REST API key (default: GALLERY_API_KEY).
    #[arg(long, requires = "rest_url")]
    pub api_key_env: Option<String>,

    /// Read-only context: deploy will be refused.
    #[arg(long)]
    pub public: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = config::home().context("could not determine home directory")?;

        let remote = match (self.rest_url, self.published) {
            (Some(url), _) => RemoteConfig::Rest {
                url,
                table: self.table.unwrap_or_else(|| DEFAULT_TABLE.to_owned()),
                api_key_env: self
                    .api_key_env
                    .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_owned()),
            },
            (None, Some(path)) => RemoteConfig::File { path },
            (None, None) => RemoteConfig::default_file_at(&home),
        };
        let mode = if self.public { Mode::Public } else { Mode::Admin };

        let cfg = config::init_at(&home, remote, mode).context("failed to write config")?;

        println!("✓ Gallery config ready ({} mode)", cfg.mode);
        println!("  Saved to: {}", paths::config_path(&home).display());
        match &cfg.remote {
            RemoteConfig::File { path } => println!("  Remote: file {}", path.display()),
            RemoteConfig::Rest {
                url,
                table,
                api_key_env,
            } => println!("  Remote: {url} table '{table}' (key from ${api_key_env})"),
        }

        match bootstrap(&home, &cfg) {
            Ok(true) => println!("✓ Draft seeded with the built-in items"),
            Ok(false) => {}
            Err(err) => println!(
                "  Draft not seeded ({err:#}); run `gallery reset` to load the built-in items"
            ),
        }
        Ok(())
    }
}

/// Seed a first draft when the published store is still empty.
fn bootstrap(home: &Path, cfg: &GalleryConfig) -> Result<bool> {
    let remote = pipeline::open_remote(&cfg.remote, |var| std::env::var(var).ok())?;
    Ok(pipeline::bootstrap_draft(home, cfg, remote.as_ref())?)
}
