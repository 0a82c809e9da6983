//! Temporary Chrome profile directories
//!
//! Each launched automation context gets its own UUID-named profile so a
//! relaunch never trips over the previous process's `SingletonLock`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix shared by every profile directory this crate creates
pub const PROFILE_PREFIX: &str = "fitmap_chrome_";

/// Owned profile directory, removed on drop unless released
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the directory to another owner; the profile no longer removes it
    pub fn into_path(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.cleanup_on_drop {
            remove_profile_dir(&self.path);
        }
    }
}

/// Create a fresh profile directory under the system temp dir
pub fn create_unique_profile() -> Result<BrowserProfile> {
    let path = std::env::temp_dir().join(format!("{PROFILE_PREFIX}{}", Uuid::new_v4()));

    // create_dir fails on collision instead of sharing a directory
    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    debug!("Created Chrome profile directory: {}", path.display());
    Ok(BrowserProfile {
        path,
        cleanup_on_drop: true,
    })
}

/// Best-effort removal; must run after the browser process has exited
pub fn remove_profile_dir(path: &Path) {
    if !path.exists() {
        return;
    }
    debug!("Removing Chrome profile directory: {}", path.display());
    if let Err(e) = std::fs::remove_dir_all(path) {
        warn!(
            "Failed to remove profile directory {}: {}. Manual cleanup may be required.",
            path.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_removed_on_drop() {
        let profile = create_unique_profile().expect("create profile");
        let path = profile.path().to_path_buf();
        assert!(path.exists());
        assert!(path.to_string_lossy().contains(PROFILE_PREFIX));
        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn released_profile_survives_drop() {
        let path = create_unique_profile().expect("create profile").into_path();
        assert!(path.exists());
        remove_profile_dir(&path);
        assert!(!path.exists());
    }
}
