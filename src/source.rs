//! Read-only view of a plugin directory used by the validation checks.
//!
//! All textual inspection goes through [`PluginSource`], so the matching
//! strategy (currently regex and substring search) stays out of the report
//! model and out of the individual rule definitions.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::fs_util::read_optional;

/// Name of the primary handler source file inside a plugin directory.
pub const HANDLER_FILE: &str = "handler.lua";

/// A plugin directory with its handler source loaded once.
#[derive(Debug, Clone)]
pub struct PluginSource {
    dir: PathBuf,
    handler: Option<String>,
}

impl PluginSource {
    /// Load the handler source of `dir`.
    ///
    /// A missing handler is not an error: it yields a source for which every
    /// content query returns `false`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the handler exists but cannot be
    /// read.
    pub fn load(dir: &Path) -> std::io::Result<Self> {
        let handler = read_optional(&dir.join(HANDLER_FILE))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            handler,
        })
    }

    /// Build a source from in-memory handler text.
    #[must_use]
    pub fn from_handler(dir: &Path, handler: Option<String>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            handler,
        }
    }

    /// The plugin directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Handler source text, if the handler file exists.
    #[must_use]
    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    /// Returns `true` if a file with exactly this name exists in the directory.
    #[must_use]
    pub fn has_file(&self, name: &str) -> bool {
        self.dir.join(name).exists()
    }

    /// Plain substring containment in the handler source.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.handler().is_some_and(|text| text.contains(needle))
    }

    /// Returns `true` if the handler declares a function named `name`,
    /// optionally behind a table prefix (`function access(` or
    /// `function M.access(`).
    #[must_use]
    pub fn defines_function(&self, name: &str) -> bool {
        let Some(text) = self.handler() else {
            return false;
        };
        let pattern = format!(r"function\s+\w*\.?{}\s*\(", regex::escape(name));
        Regex::new(&pattern)
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn source(text: &str) -> PluginSource {
        PluginSource::from_handler(Path::new("plugin"), Some(text.to_string()))
    }

    #[test]
    fn load_reads_handler() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(HANDLER_FILE), "kong.ctx").unwrap();
        let src = PluginSource::load(dir.path()).unwrap();
        assert_eq!(src.handler(), Some("kong.ctx"));
    }

    #[test]
    fn load_without_handler() {
        let dir = tempdir().unwrap();
        let src = PluginSource::load(dir.path()).unwrap();
        assert!(src.handler().is_none());
        assert!(!src.contains("kong"));
        assert!(!src.defines_function("access"));
    }

    #[test]
    fn has_file_exact_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "# plugin").unwrap();
        let src = PluginSource::load(dir.path()).unwrap();
        assert!(src.has_file("README.md"));
        assert!(!src.has_file("LICENSE"));
    }

    #[test]
    fn defines_plain_function() {
        assert!(source("function access()\nend").defines_function("access"));
    }

    #[test]
    fn defines_prefixed_function() {
        assert!(source("function MyHandler.access (conf)\nend").defines_function("access"));
    }

    #[test]
    fn bare_identifier_is_not_a_definition() {
        let src = source("-- access phase goes here\nlocal access = 1");
        assert!(!src.defines_function("access"));
        assert!(src.contains("access"));
    }

    #[test]
    fn colon_method_syntax_is_not_a_definition() {
        let src = source("function Handler:access(conf)\nend");
        assert!(!src.defines_function("access"));
        assert!(src.contains("access"));
    }

    #[test]
    fn hook_name_is_escaped() {
        assert!(!source("function log()").defines_function("l.g"));
    }
}
