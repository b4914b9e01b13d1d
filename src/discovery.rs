use std::path::Path;

use tracing::warn;

use crate::errors::{PongoError, Result};
use crate::models::PluginDirectory;

/// List the plugin directories directly under `root`, sorted by name.
///
/// Every immediate subdirectory is a plugin, including symlinks that resolve
/// to a directory. Files and hidden directories are skipped. Entries that
/// cannot be read are logged and skipped.
///
/// # Errors
///
/// Returns [`PongoError::NotFound`] if `root` is not a directory, or an I/O
/// error if it cannot be listed.
pub fn discover(root: &Path) -> Result<Vec<PluginDirectory>> {
    if !root.is_dir() {
        return Err(PongoError::NotFound {
            path: root.to_path_buf(),
        });
    }

    let mut plugins = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if !hidden && path.is_dir() {
            plugins.push(PluginDirectory::from_path(&path));
        }
    }
    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(plugins)
}
