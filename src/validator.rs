use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::checks::{Category, CheckResult, CHECKS};
use crate::errors::{PongoError, Result};
use crate::source::PluginSource;

/// Per-category results for one plugin, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    results: Vec<(Category, CheckResult)>,
}

impl ValidationReport {
    /// Build a report from `(category, result)` pairs.
    #[must_use]
    pub fn new(results: Vec<(Category, CheckResult)>) -> Self {
        Self { results }
    }

    /// Result for one category.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<&CheckResult> {
        self.results
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, r)| r)
    }

    /// Iterate over `(category, result)` pairs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CheckResult)> {
        self.results.iter().map(|(c, r)| (*c, r))
    }

    /// Returns `true` when every category is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|(_, r)| r.valid)
    }

    /// Categories whose result is not valid, in registry order.
    #[must_use]
    pub fn failed_categories(&self) -> Vec<Category> {
        self.results
            .iter()
            .filter(|(_, r)| !r.valid)
            .map(|(c, _)| *c)
            .collect()
    }
}

/// Serialized as a JSON object keyed by category name.
impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (category, result) in &self.results {
            map.serialize_entry(category.as_str(), result)?;
        }
        map.end()
    }
}

/// Validate a plugin directory against every registered check.
///
/// A missing handler file degrades the content checks to "everything
/// missing"; it is not an error.
///
/// # Errors
///
/// Returns [`PongoError::NotFound`] if `dir` is not an existing directory,
/// and [`PongoError::Io`] if the handler exists but cannot be read.
pub fn validate(dir: &Path) -> Result<ValidationReport> {
    if !dir.is_dir() {
        return Err(PongoError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let src = PluginSource::load(dir)?;
    if src.handler().is_none() {
        debug!(plugin = %dir.display(), "handler source not found");
    }

    Ok(validate_source(&src))
}

/// Run every registered check against an already loaded source.
#[must_use]
pub fn validate_source(src: &PluginSource) -> ValidationReport {
    let results = CHECKS
        .iter()
        .map(|(category, check)| {
            let result = check(src);
            debug!(
                plugin = %src.dir().display(),
                category = %category,
                valid = result.valid,
                missing = result.missing.len(),
                "check finished"
            );
            (*category, result)
        })
        .collect();
    ValidationReport::new(results)
}
