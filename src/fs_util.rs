//! Filesystem helpers.

use std::io;
use std::path::Path;

/// Read a text file that may legitimately be absent.
///
/// Returns `Ok(None)` when the file does not exist. Any other I/O failure
/// (permissions, the path being a directory) is returned as an error.
/// Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
