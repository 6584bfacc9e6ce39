//! Error types for gallery-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ItemId;

/// Errors from loading or saving `config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },
}

/// Errors from draft persistence and draft mutations.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("draft JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `reorder` was handed a list that is not a permutation of the draft.
    #[error("reordered list is not a permutation of the draft ({expected} items expected, {actual} given)")]
    NotAPermutation { expected: usize, actual: usize },

    #[error("no draft item at position {position} (draft has {len} items)")]
    PositionOutOfRange { position: usize, len: usize },
}

/// Errors reported by a [`RemoteStore`](crate::remote::RemoteStore).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("item {id} does not exist in the remote store")]
    NotFound { id: ItemId },

    /// The store answered but refused the request.
    #[error("remote store rejected the request: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("remote store unreachable: {0}")]
    Transport(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("remote JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`DraftError::Io`].
pub(crate) fn draft_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DraftError {
    DraftError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`RemoteError::Io`].
pub fn remote_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RemoteError {
    RemoteError::Io {
        path: path.into(),
        source,
    }
}
