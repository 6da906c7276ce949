//! Host audio group resolution.
//!
//! Sharing `/dev/snd` with the container only works when the container user
//! belongs to a group with the host's `audio` GID, so the rendered
//! Dockerfile embeds that GID literally. The lookup sits behind a trait so
//! rendering stays deterministic under test.

use std::process::Command;

use crate::error::{ProvisionError, Result};

/// Resolves the numeric GID of the host `audio` group.
pub trait AudioGroupLookup {
    fn audio_group_id(&self) -> Result<u32>;
}

/// Looks the group up in the host NSS databases via `getent`.
pub struct HostGroups;

impl AudioGroupLookup for HostGroups {
    fn audio_group_id(&self) -> Result<u32> {
        let output = Command::new("getent")
            .args(["group", "audio"])
            .output()
            .map_err(|err| ProvisionError::AudioGroup(format!("running getent: {err}")))?;

        if !output.status.success() {
            return Err(ProvisionError::AudioGroup(
                "no 'audio' group on this host".to_string(),
            ));
        }

        let line = String::from_utf8_lossy(&output.stdout);
        parse_group_line(line.trim())
    }
}

/// Parse the GID out of a `group:passwd:gid:members` database line.
fn parse_group_line(line: &str) -> Result<u32> {
    let gid_field = line
        .split(':')
        .nth(2)
        .ok_or_else(|| ProvisionError::AudioGroup(format!("malformed group entry '{line}'")))?;
    gid_field.parse().map_err(|_| {
        ProvisionError::AudioGroup(format!("invalid GID '{gid_field}' in entry '{line}'"))
    })
}
