//! Gallery configuration (`config.yaml`).
//!
//! # Storage layout
//!
//! ```text
//! ~/.gallery/
//!   config.yaml      (mode 0600, written by `gallery init`)
//!   draft.json       (local draft, see [`crate::draft::FileSlot`])
//!   published.json   (file-backed remote store, when configured)
//! ```
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)` takes an explicit home; tests use this with `TempDir`
//! - `fn(…)` derives home from `dirs::home_dir()` and delegates to `_at`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_TABLE: &str = "books";
pub const DEFAULT_API_KEY_ENV: &str = "GALLERY_API_KEY";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Context the tool runs in. Only `Admin` may deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Admin,
    Public,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Admin => write!(f, "admin"),
            Mode::Public => write!(f, "public"),
        }
    }
}

/// Which backend holds the published item set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RemoteConfig {
    /// JSON file on local disk.
    File { path: PathBuf },
    /// PostgREST-compatible HTTP endpoint.
    Rest {
        url: String,
        #[serde(default = "default_table")]
        table: String,
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
    },
}

impl RemoteConfig {
    /// File-backed remote at the default `published.json` location.
    pub fn default_file_at(home: &Path) -> Self {
        RemoteConfig::File {
            path: paths::published_path(home),
        }
    }
}

fn default_table() -> String {
    DEFAULT_TABLE.to_owned()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryConfig {
    pub version: u32,
    #[serde(default)]
    pub mode: Mode,
    /// Overrides `~/.gallery/draft.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_path: Option<PathBuf>,
    pub remote: RemoteConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryConfig {
    pub fn new(remote: RemoteConfig) -> Self {
        let now = Utc::now();
        Self {
            version: CONFIG_VERSION,
            mode: Mode::default(),
            draft_path: None,
            remote,
            created_at: now,
            updated_at: now,
        }
    }

    /// Draft file location, honouring the override.
    pub fn draft_path_at(&self, home: &Path) -> PathBuf {
        self.draft_path
            .clone()
            .unwrap_or_else(|| paths::draft_path(home))
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `<home>/.gallery/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent, `ConfigError::Parse` if malformed.
pub fn load_at(home: &Path) -> Result<GalleryConfig, ConfigError> {
    let path = paths::config_path(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<GalleryConfig, ConfigError> {
    load_at(&home()?)
}

/// Atomically save the config: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &GalleryConfig) -> Result<(), ConfigError> {
    let root = paths::gallery_root(home);
    if !root.exists() {
        std::fs::create_dir_all(&root)?;
        set_dir_permissions(&root)?;
    }
    let path = paths::config_path(home);
    let tmp_path = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &GalleryConfig) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

/// Create the config if it does not exist yet.
///
/// Idempotent: an existing config is loaded and returned unchanged.
pub fn init_at(home: &Path, remote: RemoteConfig, mode: Mode) -> Result<GalleryConfig, ConfigError> {
    if paths::config_path(home).exists() {
        return load_at(home);
    }
    let mut config = GalleryConfig::new(remote);
    config.mode = mode;
    save_at(home, &config)?;
    Ok(config)
}

/// `init_at` convenience wrapper.
pub fn init(remote: RemoteConfig, mode: Mode) -> Result<GalleryConfig, ConfigError> {
    init_at(&home()?, remote, mode)
}

/// The user's home directory, which every `_at` function takes as `home`.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
