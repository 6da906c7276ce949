//! Configuration file loading.
//!
//! The configuration is a TOML document; every section and field is
//! optional and falls back to a built-in default, so a missing file yields
//! a fully usable configuration for the English starter profile.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default profile repository.
const DEFAULT_PROFILE_URL: &str = "https://github.com/kalliope-project/kalliope_starter_en";

/// Resolved configuration with every fallback applied.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base cache directory; every file operation happens inside it.
    pub base_directory: PathBuf,
    /// Profile repository URL.
    pub profile_url: String,
    /// Resource repository URLs, in declaration order.
    pub resource_urls: Vec<String>,
    /// Timezone configured inside the image.
    pub timezone: String,
    /// Image tag used for build/run/stop/remove.
    pub image_tag: String,
    /// Dockerfile name under the base directory.
    pub dockerfile: String,
    /// Build-context directory name under the base directory.
    pub image_files_directory: String,
    /// Home directory shared between host and container.
    pub shared_home_directory: String,
    /// Debian release of the base image.
    pub debian_version: String,
    /// Optional baseline package list override files.
    pub apt_requirements: Option<PathBuf>,
    pub pip_requirements: Option<PathBuf>,
    /// Locale codes whose speech models should be installed.
    pub speech_locales: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            resource_urls: Vec::new(),
            timezone: "America/New_York".to_string(),
            image_tag: "kalliope-builder".to_string(),
            dockerfile: "Dockerfile".to_string(),
            image_files_directory: "kalliope-shared".to_string(),
            shared_home_directory: "/home/kalliope".to_string(),
            debian_version: "stretch".to_string(),
            apt_requirements: None,
            pip_requirements: None,
            speech_locales: Vec::new(),
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kalliope-builder")
        .join("config.toml")
}

fn default_base_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kalliope-builder")
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    profile: Option<ProfileToml>,
    resources: Option<ResourcesToml>,
    environment: Option<EnvironmentToml>,
    container: Option<ContainerToml>,
    packages: Option<PackagesToml>,
    speech: Option<SpeechToml>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileToml {
    base_directory: Option<PathBuf>,
    git_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourcesToml {
    urls: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnvironmentToml {
    timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContainerToml {
    image_tag: Option<String>,
    dockerfile: Option<String>,
    image_files_directory: Option<String>,
    shared_home_directory: Option<String>,
    debian_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackagesToml {
    apt_requirements: Option<PathBuf>,
    pip_requirements: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpeechToml {
    locales: Option<Vec<String>>,
}

impl Config {
    /// Load the configuration, falling back to defaults.
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration '{}'", path.display()))?;
        let parsed: ConfigToml = toml::from_str(&content)
            .with_context(|| format!("parsing configuration '{}'", path.display()))?;
        Ok(Self::from_toml(parsed))
    }

    fn from_toml(parsed: ConfigToml) -> Self {
        let defaults = Self::default();
        let profile = parsed.profile.unwrap_or_default();
        let container = parsed.container.unwrap_or_default();
        let packages = parsed.packages.unwrap_or_default();
        Self {
            base_directory: profile.base_directory.unwrap_or(defaults.base_directory),
            profile_url: profile.git_url.unwrap_or(defaults.profile_url),
            resource_urls: parsed
                .resources
                .unwrap_or_default()
                .urls
                .unwrap_or_default(),
            timezone: parsed
                .environment
                .unwrap_or_default()
                .timezone
                .unwrap_or(defaults.timezone),
            image_tag: container.image_tag.unwrap_or(defaults.image_tag),
            dockerfile: container.dockerfile.unwrap_or(defaults.dockerfile),
            image_files_directory: container
                .image_files_directory
                .unwrap_or(defaults.image_files_directory),
            shared_home_directory: container
                .shared_home_directory
                .unwrap_or(defaults.shared_home_directory),
            debian_version: container.debian_version.unwrap_or(defaults.debian_version),
            apt_requirements: packages.apt_requirements,
            pip_requirements: packages.pip_requirements,
            speech_locales: parsed.speech.unwrap_or_default().locales.unwrap_or_default(),
        }
    }
}
