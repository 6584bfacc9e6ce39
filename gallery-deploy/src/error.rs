//! Error types for gallery-deploy.

use thiserror::Error;

use gallery_core::{config::Mode, DraftError, ItemId, RemoteError};

/// All errors that can end a deploy.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Deploy was invoked outside the administrative context. No remote call was made.
    #[error("deploy is only available in admin mode (current mode: {mode})")]
    NotAdmin { mode: Mode },

    /// Another deploy is still in progress on this deployer.
    #[error("a deploy is already in progress")]
    AlreadyRunning,

    /// The remote snapshot could not be fetched. Nothing was changed.
    #[error("failed to fetch published items: {0}")]
    Fetch(#[source] RemoteError),

    /// An insert or update failed; later steps and all deletions were skipped.
    #[error("failed to deploy '{title}': {message}")]
    ItemFailed { title: String, message: String },

    /// The REST remote is configured but its API key variable is unset.
    #[error("environment variable {var} is not set; it must hold the remote API key")]
    MissingApiKey { var: String },

    /// The draft could not be written.
    #[error("draft error: {0}")]
    Draft(#[from] DraftError),

    /// The item was inserted remotely but the draft could not record the
    /// assigned id. The row `assigned` stays published unranked; the next
    /// deploy replaces it with a fresh insert under a new id.
    #[error("failed to deploy '{title}': inserted as {assigned} but the draft could not record it: {source}")]
    IdNotRecorded {
        title: String,
        assigned: ItemId,
        #[source]
        source: DraftError,
    },
}

impl DeployError {
    pub(crate) fn item(title: &str, err: &RemoteError) -> Self {
        DeployError::ItemFailed {
            title: title.to_owned(),
            message: err.to_string(),
        }
    }
}
