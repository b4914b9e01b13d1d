//! Presence check for locally installed gateway versions.
//!
//! Versions live under `<versions_dir>/<version>/kong`. Only presence is
//! checked; nothing is downloaded or installed.

use std::path::{Path, PathBuf};

/// Path where a gateway version is expected.
#[must_use]
pub fn version_path(versions_dir: &Path, version: &str) -> PathBuf {
    versions_dir.join(version).join("kong")
}

/// Returns `true` if the gateway version directory exists.
#[must_use]
pub fn is_version_available(versions_dir: &Path, version: &str) -> bool {
    version_path(versions_dir, version).is_dir()
}
