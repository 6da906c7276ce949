//! Git repository naming and fetching.
//!
//! Repositories are cloned shallowly (single commit) into per-repository
//! cache directories named after the final URL path segment. Fetching goes
//! through the [`Fetch`] trait so the aggregation pipeline can be exercised
//! without network access.

use std::path::Path;
use std::process::Command;

use crate::error::{ProvisionError, Result};

/// Extract the repository name from a git URL.
///
/// Returns the final path segment with a single trailing `.git` suffix
/// stripped. A URL ending in `/` yields the empty string.
pub fn repository_name(url: &str) -> &str {
    let name = url.rsplit('/').next().unwrap_or(url);
    name.strip_suffix(".git").unwrap_or(name)
}

/// Version-control fetch collaborator.
pub trait Fetch {
    /// Fetch `url` into `dest`, shallow.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Fetches repositories with the host `git` binary.
pub struct GitCli;

impl Fetch for GitCli {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        // A previous run already cloned this repository; reuse the cache.
        if dest.join(".git").is_dir() {
            tracing::debug!(url, dest = %dest.display(), "clone cached, skipping fetch");
            return Ok(());
        }

        let output = Command::new("git")
            .args(["clone", "--depth", "1"])
            .arg(url)
            .arg(dest)
            .output()
            .map_err(|err| ProvisionError::Fetch {
                url: url.to_string(),
                reason: format!("running git: {err}"),
            })?;

        if !output.status.success() {
            return Err(ProvisionError::Fetch {
                url: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
