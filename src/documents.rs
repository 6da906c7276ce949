//! Typed views of the profile and resource YAML documents.
//!
//! Three loosely-typed documents drive the pipeline:
//!
//! - `settings.yml` in the profile maps resource types to destination
//!   sub-paths (`resource_directory`).
//! - `install.yml` in each resource lists provisioning tasks, each
//!   optionally naming an apt and/or pip package.
//! - `dna.yml` in each resource names the resource and its type.
//!
//! All three are validated here, at the parse boundary. Fields this crate
//! does not consume are ignored so profiles keep working as the upstream
//! document formats grow.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ProvisionError, Result};
use crate::packages::PackageSet;

/// Profile settings file name.
pub const SETTINGS_FILE: &str = "settings.yml";

/// Resource install manifest file name.
pub const INSTALL_FILE: &str = "install.yml";

/// Resource descriptor file name.
pub const DNA_FILE: &str = "dna.yml";

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| ProvisionError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> ProvisionError {
    ProvisionError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// The profile-level settings the pipeline consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSettings {
    /// Resource type name → destination sub-path, relative to profile root.
    pub resource_directory: BTreeMap<String, String>,
}

impl ProfileSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_document(path)?;
        serde_yaml::from_str(&content).map_err(|err| parse_error(path, err))
    }

    /// Resolve the destination sub-path for a resource type.
    pub fn destination_for(&self, kind: &str) -> Option<&str> {
        self.resource_directory.get(kind).map(String::as_str)
    }
}

/// One provisioning task from a resource install manifest.
///
/// A task may declare an apt package, a pip package, both, or neither.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallTask {
    pub apt: Option<PackageRef>,
    pub pip: Option<PackageRef>,
}

/// A package named by an install task.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct InstallPlay {
    tasks: Vec<InstallTask>,
}

/// A resource's install manifest: the task list of the first play.
#[derive(Debug, Clone)]
pub struct InstallManifest {
    pub tasks: Vec<InstallTask>,
}

impl InstallManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_document(path)?;
        let mut plays: Vec<InstallPlay> =
            serde_yaml::from_str(&content).map_err(|err| parse_error(path, err))?;
        if plays.is_empty() {
            return Err(parse_error(path, "manifest contains no plays"));
        }
        Ok(Self {
            tasks: plays.remove(0).tasks,
        })
    }

    /// Collect the declared packages, in task order.
    pub fn packages(&self) -> PackageSet {
        let mut set = PackageSet::default();
        for task in &self.tasks {
            if let Some(apt) = &task.apt {
                set.apt.push(apt.name.clone());
            }
            if let Some(pip) = &task.pip {
                set.pip.push(pip.name.clone());
            }
        }
        set
    }
}

/// A resource descriptor: its name and type.
#[derive(Debug, Clone, Deserialize)]
pub struct Descriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Descriptor {
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_document(path)?;
        serde_yaml::from_str(&content).map_err(|err| parse_error(path, err))
    }
}
