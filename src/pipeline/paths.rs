//! Cache directory layout.
//!
//! Everything the pipeline touches lives under one base directory: the
//! per-repository clones, the `target/` staging tree, the Docker build
//! context, and the rendered Dockerfile. This module only defines WHERE
//! things go, not HOW they get there.

use std::path::{Path, PathBuf};

use crate::repo::repository_name;

/// Name of the staging tree under the base directory.
const TARGET_DIRECTORY: &str = "target";

/// Paths used during provisioning.
#[derive(Debug, Clone)]
pub struct CachePaths {
    /// The base cache directory; every file operation happens inside it.
    pub base: PathBuf,
    /// The staging tree the profile and resources are merged into.
    pub target_profile: PathBuf,
    /// The Docker build context, shared with the container as a volume.
    pub image_files: PathBuf,
}

impl CachePaths {
    /// Create paths relative to the base directory.
    pub fn new(base_dir: &Path, image_files_directory: &str) -> Self {
        Self {
            target_profile: base_dir.join(TARGET_DIRECTORY),
            image_files: base_dir.join(image_files_directory),
            base: base_dir.to_path_buf(),
        }
    }

    /// Clone directory for a repository URL.
    pub fn repository(&self, url: &str) -> PathBuf {
        self.base.join(repository_name(url))
    }

    /// Path of the rendered Dockerfile.
    pub fn dockerfile(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }
}
