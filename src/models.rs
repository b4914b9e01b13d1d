use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checks::Category;
use crate::validator::ValidationReport;

/// A plugin found on disk, identified by its directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDirectory {
    pub name: String,
    pub path: PathBuf,
}

impl PluginDirectory {
    /// Build from a path, naming the plugin after the directory basename.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path: path.to_path_buf(),
        }
    }
}

/// Lifecycle of a plugin within one run: `PENDING -> TESTING -> PASS | FAIL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum PluginStatus {
    Pending = 0,
    Testing = 1,
    Pass = 2,
    Fail = 3,
}

impl PluginStatus {
    /// Returns `true` for `PASS` and `FAIL`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, PluginStatus::Pass | PluginStatus::Fail)
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => PluginStatus::Pending,
            1 => PluginStatus::Testing,
            2 => PluginStatus::Pass,
            _ => PluginStatus::Fail,
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluginStatus::Pending => "PENDING",
            PluginStatus::Testing => "TESTING",
            PluginStatus::Pass => "PASS",
            PluginStatus::Fail => "FAIL",
        };
        f.write_str(s)
    }
}

/// Either the full validation report or the reason validation could not run.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EntryDetails {
    Report(ValidationReport),
    Error(String),
}

/// One row of a run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunEntry {
    pub plugin: String,
    pub status: PluginStatus,
    pub details: EntryDetails,
}

impl RunEntry {
    /// Entry for a plugin whose validation completed.
    #[must_use]
    pub fn from_report(plugin: impl Into<String>, report: ValidationReport) -> Self {
        let status = if report.is_valid() {
            PluginStatus::Pass
        } else {
            PluginStatus::Fail
        };
        Self {
            plugin: plugin.into(),
            status,
            details: EntryDetails::Report(report),
        }
    }

    /// Entry for a plugin whose validation could not be carried out.
    #[must_use]
    pub fn harness_failure(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            status: PluginStatus::Fail,
            details: EntryDetails::Error(message.into()),
        }
    }

    /// Failing categories; empty for a pass or a harness failure.
    #[must_use]
    pub fn failed_categories(&self) -> Vec<Category> {
        match &self.details {
            EntryDetails::Report(report) => report.failed_categories(),
            EntryDetails::Error(_) => Vec::new(),
        }
    }
}

/// Entries of one orchestrated run, in completion order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RunReport {
    pub entries: Vec<RunEntry>,
}

impl RunReport {
    /// Number of entries with status `PASS`.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == PluginStatus::Pass)
            .count()
    }

    /// Number of entries with status `FAIL`.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == PluginStatus::Fail)
            .count()
    }

    /// Look up the entry for a plugin by name.
    #[must_use]
    pub fn entry(&self, plugin: &str) -> Option<&RunEntry> {
        self.entries.iter().find(|e| e.plugin == plugin)
    }
}
