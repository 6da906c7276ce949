//! Docker lifecycle wrappers.
//!
//! Thin command construction around the host `docker` binary: build the
//! image from the rendered Dockerfile, run the container with the audio
//! device and the shared build context mounted, stop matching containers,
//! remove the image. Arguments go through `Command` argv, never through a
//! shell.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{ProvisionError, Result};

/// Host audio device shared with the container.
const AUDIO_DEVICE: &str = "/dev/snd:/dev/snd:rwm";

fn run_checked(mut command: Command, what: &str) -> Result<()> {
    let status = command
        .status()
        .map_err(|err| ProvisionError::Engine(format!("{what}: {err}")))?;
    if !status.success() {
        return Err(ProvisionError::Engine(format!("{what} failed with {status}")));
    }
    Ok(())
}

/// Build the image from the Dockerfile under the base directory.
pub fn build_image(base_dir: &Path, dockerfile: &str, tag: &str) -> Result<()> {
    let dockerfile_path = base_dir.join(dockerfile);
    info!(tag, dockerfile = %dockerfile_path.display(), "building image");

    let mut command = Command::new("docker");
    command
        .args(["build", "-t", tag, "-f"])
        .arg(&dockerfile_path)
        .arg(base_dir);
    run_checked(command, "docker build")
}

/// Remove the image by tag.
pub fn remove_image(tag: &str) -> Result<()> {
    let mut command = Command::new("docker");
    command.args(["rmi", "-f", tag]);
    run_checked(command, "docker rmi")
}

/// Run the container.
///
/// Interactive runs attach a shell in the foreground; otherwise the
/// container is spawned detached with its output discarded.
pub fn run_container(
    base_dir: &Path,
    image_files_directory: &str,
    shared_home: &str,
    tag: &str,
    interactive: bool,
) -> Result<()> {
    let context_dir = base_dir.join(image_files_directory);
    let volume = format!("{}:{}", context_dir.display(), shared_home);

    let mut command = Command::new("docker");
    command
        .args(["run", "--rm=true", "--device", AUDIO_DEVICE, "-v"])
        .arg(&volume);

    if interactive {
        command.args(["-it", tag, "/bin/bash"]);
        run_checked(command, "docker run")
    } else {
        command.arg(tag).stdout(Stdio::null()).stderr(Stdio::null());
        command
            .spawn()
            .map_err(|err| ProvisionError::Engine(format!("docker run: {err}")))?;
        Ok(())
    }
}

/// Stop every running container created from the image tag.
pub fn stop_containers(tag: &str) -> Result<()> {
    let output = Command::new("docker")
        .args(["ps", "--format", "{{.ID}} {{.Image}}"])
        .output()
        .map_err(|err| ProvisionError::Engine(format!("docker ps: {err}")))?;
    if !output.status.success() {
        return Err(ProvisionError::Engine(format!(
            "docker ps failed with {}",
            output.status
        )));
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    for container_id in matching_containers(&listing, tag) {
        info!(container_id, "stopping container");
        let mut command = Command::new("docker");
        command.args(["stop", container_id]);
        run_checked(command, "docker stop")?;
    }
    Ok(())
}

/// Parse `docker ps` output and keep the IDs running the given image.
fn matching_containers<'a>(listing: &'a str, tag: &str) -> Vec<&'a str> {
    listing
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let id = fields.next()?;
            let image = fields.next()?;
            (image == tag).then_some(id)
        })
        .collect()
}

/// Remove the whole cache directory.
pub fn clear_cache(base_dir: &Path) -> Result<()> {
    if base_dir.exists() {
        fs::remove_dir_all(base_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_containers_filters_by_image() {
        let listing = "abc123 kalliope-builder\ndef456 postgres:16\nffff00 kalliope-builder\n";
        assert_eq!(
            matching_containers(listing, "kalliope-builder"),
            vec!["abc123", "ffff00"]
        );
        assert!(matching_containers(listing, "redis").is_empty());
    }

    #[test]
    fn matching_containers_ignores_malformed_lines() {
        assert!(matching_containers("loneid\n\n", "tag").is_empty());
    }

    #[test]
    fn clear_cache_tolerates_missing_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("cache");
        clear_cache(&dir).unwrap();

        std::fs::create_dir_all(dir.join("nested")).unwrap();
        clear_cache(&dir).unwrap();
        assert!(!dir.exists());
    }
}
