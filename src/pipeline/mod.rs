//! The profile aggregation pipeline.
//!
//! Fetches the declared profile and resource repositories, accumulates the
//! extra packages their install manifests declare, and stages everything
//! into the Docker build context:
//!
//! 1. Fetch the profile (shallow) into the cache; failure is fatal.
//! 2. Create the build-context directory.
//! 3. Merge-copy the profile clone into the `target/` staging tree.
//! 4. Parse the profile's `settings.yml`; failure is fatal.
//! 5. Fetch, parse and stage each resource, in declaration order.
//! 6. Merge-copy the staged tree into the build context under the profile's
//!    repository name.
//!
//! A broken resource does not block the others: it is skipped whole (its
//! package declarations included), logged, and reported in
//! [`Aggregation::skipped`]. There is no rollback; a failed run leaves the
//! partially staged tree for the next run to refresh.

pub mod paths;

use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::documents::{Descriptor, InstallManifest, ProfileSettings, DNA_FILE, INSTALL_FILE, SETTINGS_FILE};
use crate::error::ProvisionError;
use crate::fsops::merge_copy;
use crate::packages::PackageSet;
use crate::repo::{repository_name, Fetch};

pub use paths::CachePaths;

/// A resource the pipeline gave up on, and why.
#[derive(Debug)]
pub struct SkippedResource {
    pub url: String,
    pub error: ProvisionError,
}

/// What aggregation produced.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Extra packages accumulated from resource install manifests, in
    /// declaration order across resources and task order within each.
    pub extras: PackageSet,
    /// Resources that failed and were skipped.
    pub skipped: Vec<SkippedResource>,
}

/// Fetch and stage the profile and its resources.
///
/// Returns the accumulated extra packages. Side effects: the cache
/// directory tree described by [`CachePaths`].
pub fn stage_profile(
    paths: &CachePaths,
    profile_url: &str,
    resource_urls: &[String],
    fetcher: &dyn Fetch,
) -> Result<Aggregation> {
    let profile_dir = paths.repository(profile_url);
    info!(url = profile_url, "fetching profile");
    fetcher.fetch(profile_url, &profile_dir)?;

    fs::create_dir_all(&paths.image_files).with_context(|| {
        format!(
            "creating build context directory '{}'",
            paths.image_files.display()
        )
    })?;

    merge_copy(&profile_dir, &paths.target_profile).with_context(|| {
        format!(
            "staging profile into '{}'",
            paths.target_profile.display()
        )
    })?;

    let settings = ProfileSettings::load(&profile_dir.join(SETTINGS_FILE))?;

    let mut aggregation = Aggregation::default();
    for url in resource_urls {
        match stage_resource(paths, &settings, url, fetcher) {
            Ok(packages) => aggregation.extras.extend(packages),
            Err(error) => {
                warn!(url = %url, error = %error, "skipping resource");
                aggregation.skipped.push(SkippedResource {
                    url: url.clone(),
                    error,
                });
            }
        }
    }

    let context_profile = paths.image_files.join(repository_name(profile_url));
    merge_copy(&paths.target_profile, &context_profile).with_context(|| {
        format!(
            "staging profile into build context '{}'",
            context_profile.display()
        )
    })?;

    Ok(aggregation)
}

/// Fetch, validate and stage one resource.
///
/// The extras are returned only when every step succeeds, so a resource
/// that fails late contributes nothing.
fn stage_resource(
    paths: &CachePaths,
    settings: &ProfileSettings,
    url: &str,
    fetcher: &dyn Fetch,
) -> Result<PackageSet, ProvisionError> {
    let resource_dir = paths.repository(url);
    info!(url, "fetching resource");
    fetcher.fetch(url, &resource_dir)?;

    let manifest = InstallManifest::load(&resource_dir.join(INSTALL_FILE))?;
    let descriptor = Descriptor::load(&resource_dir.join(DNA_FILE))?;

    let destination = settings.destination_for(&descriptor.kind).ok_or_else(|| {
        ProvisionError::UnknownResourceType {
            name: descriptor.name.clone(),
            kind: descriptor.kind.clone(),
        }
    })?;

    let staged = paths
        .target_profile
        .join(destination)
        .join(&descriptor.name);
    merge_copy(&resource_dir, &staged)
        .map_err(|err| ProvisionError::Io(std::io::Error::other(err.to_string())))?;

    Ok(manifest.packages())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;

    /// Serves resources from prepared directories instead of the network.
    struct FakeFetcher {
        repositories: BTreeMap<String, std::path::PathBuf>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                repositories: BTreeMap::new(),
            }
        }

        fn insert(&mut self, url: &str, dir: &Path) {
            self.repositories.insert(url.to_string(), dir.to_path_buf());
        }
    }

    impl Fetch for FakeFetcher {
        fn fetch(&self, url: &str, dest: &Path) -> crate::Result<()> {
            let source = self
                .repositories
                .get(url)
                .ok_or_else(|| ProvisionError::Fetch {
                    url: url.to_string(),
                    reason: "unreachable".to_string(),
                })?;
            merge_copy(source, dest).map_err(|err| ProvisionError::Fetch {
                url: url.to_string(),
                reason: err.to_string(),
            })
        }
    }

    fn write_profile(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join(SETTINGS_FILE),
            "resource_directory:\n  neuron: resources/neurons\n  stt: resources/stt\n",
        )
        .unwrap();
        fs::write(dir.join("brain.yml"), "- name: order\n").unwrap();
    }

    fn write_resource(dir: &Path, name: &str, kind: &str, apt: &[&str], pip: &[&str]) {
        fs::create_dir_all(dir).unwrap();
        let mut install = String::from("- name: install\n  tasks:\n");
        for package in apt {
            install.push_str(&format!("    - apt:\n        name: {package}\n"));
        }
        for package in pip {
            install.push_str(&format!("    - pip:\n        name: {package}\n"));
        }
        if apt.is_empty() && pip.is_empty() {
            install.push_str("    - name: nothing\n");
        }
        fs::write(dir.join(INSTALL_FILE), install).unwrap();
        fs::write(
            dir.join(DNA_FILE),
            format!("name: {name}\ntype: {kind}\n"),
        )
        .unwrap();
    }

    fn setup() -> (TempDir, CachePaths, FakeFetcher) {
        let temp = TempDir::new().unwrap();
        let paths = CachePaths::new(&temp.path().join("cache"), "kalliope-shared");
        let profile_dir = temp.path().join("upstream/starter_en");
        write_profile(&profile_dir);
        let mut fetcher = FakeFetcher::new();
        fetcher.insert("https://host/starter_en.git", &profile_dir);
        (temp, paths, fetcher)
    }

    #[test]
    fn stages_profile_into_build_context() {
        let (_temp, paths, fetcher) = setup();

        let aggregation =
            stage_profile(&paths, "https://host/starter_en.git", &[], &fetcher).unwrap();

        assert!(aggregation.extras.is_empty());
        assert!(aggregation.skipped.is_empty());
        assert!(paths.target_profile.join("brain.yml").exists());
        assert!(paths
            .image_files
            .join("starter_en/settings.yml")
            .exists());
    }

    #[test]
    fn unreachable_profile_is_fatal() {
        let (_temp, paths, fetcher) = setup();

        let result = stage_profile(&paths, "https://host/missing.git", &[], &fetcher);

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::Fetch { .. })
        ));
    }

    #[test]
    fn accumulates_extras_in_declaration_order() {
        let (temp, paths, mut fetcher) = setup();
        let r1 = temp.path().join("upstream/r1");
        let r2 = temp.path().join("upstream/r2");
        write_resource(&r1, "wake_word", "stt", &["a"], &[]);
        write_resource(&r2, "say_hello", "neuron", &["b"], &[]);
        fetcher.insert("https://host/r1.git", &r1);
        fetcher.insert("https://host/r2.git", &r2);

        let aggregation = stage_profile(
            &paths,
            "https://host/starter_en.git",
            &["https://host/r1.git".to_string(), "https://host/r2.git".to_string()],
            &fetcher,
        )
        .unwrap();

        assert_eq!(aggregation.extras.apt, vec!["a", "b"]);
        assert!(paths
            .target_profile
            .join("resources/stt/wake_word")
            .join(DNA_FILE)
            .exists());
        assert!(paths
            .target_profile
            .join("resources/neurons/say_hello")
            .join(DNA_FILE)
            .exists());
    }

    #[test]
    fn a_task_may_declare_both_package_kinds() {
        let (temp, paths, mut fetcher) = setup();
        let r1 = temp.path().join("upstream/r1");
        fs::create_dir_all(&r1).unwrap();
        fs::write(
            r1.join(INSTALL_FILE),
            concat!(
                "- name: install\n",
                "  tasks:\n",
                "    - name: one task, both kinds\n",
                "      apt:\n",
                "        name: flac\n",
                "      pip:\n",
                "        name: speechpy\n",
            ),
        )
        .unwrap();
        fs::write(r1.join(DNA_FILE), "name: transcribe\ntype: stt\n").unwrap();
        fetcher.insert("https://host/r1.git", &r1);

        let aggregation = stage_profile(
            &paths,
            "https://host/starter_en.git",
            &["https://host/r1.git".to_string()],
            &fetcher,
        )
        .unwrap();

        assert_eq!(aggregation.extras.apt, vec!["flac"]);
        assert_eq!(aggregation.extras.pip, vec!["speechpy"]);
    }

    #[test]
    fn unknown_resource_type_skips_the_whole_resource() {
        let (temp, paths, mut fetcher) = setup();
        let r1 = temp.path().join("upstream/r1");
        let r2 = temp.path().join("upstream/r2");
        write_resource(&r1, "odd_one", "hologram", &["ghost"], &[]);
        write_resource(&r2, "say_hello", "neuron", &["b"], &[]);
        fetcher.insert("https://host/r1.git", &r1);
        fetcher.insert("https://host/r2.git", &r2);

        let aggregation = stage_profile(
            &paths,
            "https://host/starter_en.git",
            &["https://host/r1.git".to_string(), "https://host/r2.git".to_string()],
            &fetcher,
        )
        .unwrap();

        // The broken resource contributes no packages and no staged tree.
        assert_eq!(aggregation.extras.apt, vec!["b"]);
        assert_eq!(aggregation.skipped.len(), 1);
        assert!(matches!(
            aggregation.skipped[0].error,
            ProvisionError::UnknownResourceType { ref kind, .. } if kind == "hologram"
        ));
    }

    #[test]
    fn unreachable_resource_is_skipped_not_fatal() {
        let (temp, paths, mut fetcher) = setup();
        let r2 = temp.path().join("upstream/r2");
        write_resource(&r2, "say_hello", "neuron", &["b"], &[]);
        fetcher.insert("https://host/r2.git", &r2);

        let aggregation = stage_profile(
            &paths,
            "https://host/starter_en.git",
            &[
                "https://host/unreachable.git".to_string(),
                "https://host/r2.git".to_string(),
            ],
            &fetcher,
        )
        .unwrap();

        assert_eq!(aggregation.extras.apt, vec!["b"]);
        assert_eq!(aggregation.skipped.len(), 1);
        assert!(matches!(
            aggregation.skipped[0].error,
            ProvisionError::Fetch { .. }
        ));
    }
}
