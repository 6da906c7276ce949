//! Error types for the provisioning pipeline.
//!
//! Profile-level failures (fetching or parsing the profile itself, the audio
//! group lookup) abort the whole pipeline. Per-resource failures are caught
//! by the aggregation loop, which skips the resource and keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for provisioning operations.
pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;

/// Errors raised while provisioning the assistant container.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A git repository could not be fetched.
    #[error("fetching '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// A profile or resource document is malformed.
    #[error("parsing '{path}': {reason}")]
    Parse { path: PathBuf, reason: String },

    /// A resource declares a type the profile settings do not map.
    #[error("resource '{name}' declares unknown type '{kind}'")]
    UnknownResourceType { name: String, kind: String },

    /// The host audio group could not be resolved.
    #[error("resolving the host audio group: {0}")]
    AudioGroup(String),

    /// A baseline package list is empty; nothing sensible can be rendered.
    #[error("baseline {0} package list is empty")]
    EmptyBaseline(&'static str),

    /// The container engine reported a failure.
    #[error("container engine: {0}")]
    Engine(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
