//! Package declarations and baseline list loading.
//!
//! Two package kinds exist: Debian (`apt`) packages and Python (`pip`)
//! packages. The baseline lists ship with the crate under `requirements/`
//! and can be overridden with external files through the configuration.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Baseline Debian packages compiled into the binary.
pub const STANDARD_APT_PACKAGES: &str = include_str!("../requirements/standard-apt-packages.txt");

/// Baseline Python packages compiled into the binary.
pub const STANDARD_PIP_PACKAGES: &str = include_str!("../requirements/standard-pip-packages.txt");

/// Ordered apt and pip package name sequences.
///
/// Order is preserved everywhere because it is observable in the rendered
/// Dockerfile. Duplicates are permitted; apt and pip both tolerate them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    pub apt: Vec<String>,
    pub pip: Vec<String>,
}

impl PackageSet {
    pub fn is_empty(&self) -> bool {
        self.apt.is_empty() && self.pip.is_empty()
    }

    /// Append another set, preserving both orders.
    pub fn extend(&mut self, other: PackageSet) {
        self.apt.extend(other.apt);
        self.pip.extend(other.pip);
    }
}

/// Parse newline-delimited package entries.
///
/// Lines are trimmed and blank lines dropped; an empty package name would
/// render a broken install line.
pub fn parse_package_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read one package list file.
pub fn load_package_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_package_lines(&content))
}

/// Load the baseline package lists from two external files.
pub fn load_baseline(apt_path: &Path, pip_path: &Path) -> Result<PackageSet> {
    Ok(PackageSet {
        apt: load_package_file(apt_path)?,
        pip: load_package_file(pip_path)?,
    })
}

/// The baseline package lists shipped with the crate.
pub fn builtin_baseline() -> PackageSet {
    PackageSet {
        apt: parse_package_lines(STANDARD_APT_PACKAGES),
        pip: parse_package_lines(STANDARD_PIP_PACKAGES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_trims_and_preserves_order() {
        let parsed = parse_package_lines("  git \ncurl\n\n  sox\n");
        assert_eq!(parsed, vec!["git", "curl", "sox"]);
    }

    #[test]
    fn load_baseline_reads_both_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let apt = temp.path().join("apt.txt");
        let pip = temp.path().join("pip.txt");
        fs::write(&apt, "git\ncurl\n").unwrap();
        fs::write(&pip, "kalliope\n").unwrap();

        let baseline = load_baseline(&apt, &pip).unwrap();
        assert_eq!(baseline.apt, vec!["git", "curl"]);
        assert_eq!(baseline.pip, vec!["kalliope"]);
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("missing.txt");
        let mut pip = tempfile::NamedTempFile::new().unwrap();
        writeln!(pip, "kalliope").unwrap();

        let result = load_baseline(&missing, pip.path());
        assert!(matches!(result, Err(crate::ProvisionError::Io(_))));
    }

    #[test]
    fn builtin_baseline_is_non_empty() {
        let baseline = builtin_baseline();
        assert!(!baseline.apt.is_empty());
        assert!(!baseline.pip.is_empty());
    }

    #[test]
    fn extend_appends_in_order() {
        let mut set = PackageSet {
            apt: vec!["a".into()],
            pip: vec![],
        };
        set.extend(PackageSet {
            apt: vec!["b".into()],
            pip: vec!["c".into()],
        });
        assert_eq!(set.apt, vec!["a", "b"]);
        assert_eq!(set.pip, vec!["c"]);
    }
}
