use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const DRAFT_FILE: &str = "draft.json";
pub const PUBLISHED_FILE: &str = "published.json";

pub fn gallery_root(home: &Path) -> PathBuf {
    home.join(".gallery")
}

pub fn config_path(home: &Path) -> PathBuf {
    gallery_root(home).join(CONFIG_FILE)
}

pub fn draft_path(home: &Path) -> PathBuf {
    gallery_root(home).join(DRAFT_FILE)
}

pub fn published_path(home: &Path) -> PathBuf {
    gallery_root(home).join(PUBLISHED_FILE)
}
