//! Run configuration.
//!
//! Loaded from a JSON or YAML file and then overridden by command-line
//! flags. The resulting [`Config`] is handed to the commands by value; no
//! process environment is read or written here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{PongoError, Result};
use crate::orchestrator::{default_workers, RunOptions};

/// Default location of the aggregate report.
pub const DEFAULT_REPORT_PATH: &str = "result/plugin_validation_report.json";

/// Gateway version assumed when none is configured.
pub const DEFAULT_KONG_VERSION: &str = "3.11.0.0";

/// Directory holding one subdirectory per installed gateway version.
pub const DEFAULT_KONG_VERSIONS_DIR: &str = "kong-versions";

/// Default config file looked up by `pongo run` when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Settings shared by the `run` and `check-gateway` commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory whose subdirectories are the plugins to test.
    pub plugins_directory: Option<PathBuf>,
    /// Where the JSON run report is written.
    pub report_path: PathBuf,
    /// Gateway version the plugins target.
    pub kong_version: String,
    /// Root of the installed gateway versions.
    pub kong_versions_dir: PathBuf,
    /// Worker pool size; defaults to the available parallelism.
    pub max_workers: Option<usize>,
    /// Per-plugin validation timeout in seconds.
    pub task_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugins_directory: None,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            kong_version: DEFAULT_KONG_VERSION.to_string(),
            kong_versions_dir: PathBuf::from(DEFAULT_KONG_VERSIONS_DIR),
            max_workers: None,
            task_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load a config file, choosing the parser from the extension
    /// (`.json`, `.yaml`, `.yml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// extension is not supported.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml" | "yml") => Ok(serde_yaml_ng::from_str(&content)?),
            _ => Err(PongoError::Config {
                message: format!(
                    "unsupported config format: {} (expected .json, .yaml or .yml)",
                    path.display()
                ),
            }),
        }
    }

    /// Load `path` if given, else the default config file if it exists,
    /// else built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given or existing default file
    /// cannot be loaded.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// The plugins directory, which `run` cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`PongoError::Config`] when no plugins directory is set.
    pub fn plugins_directory(&self) -> Result<&Path> {
        self.plugins_directory
            .as_deref()
            .ok_or_else(|| PongoError::Config {
                message: "plugins_directory is not set (use --plugins-dir or the config file)"
                    .to_string(),
            })
    }

    /// Orchestrator settings derived from this config.
    ///
    /// # Errors
    ///
    /// Returns [`PongoError::Config`] when `max_workers` is zero.
    pub fn run_options(&self) -> Result<RunOptions> {
        let max_workers = match self.max_workers {
            Some(0) => {
                return Err(PongoError::Config {
                    message: "max_workers must be at least 1".to_string(),
                })
            }
            Some(n) => n,
            None => default_workers(),
        };
        Ok(RunOptions {
            max_workers,
            task_timeout: self.task_timeout_secs.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn json_with_defaults() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "config.json",
            r#"{ "plugins_directory": "plugins" }"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.plugins_directory.as_deref(), Some(Path::new("plugins")));
        assert_eq!(config.report_path, Path::new(DEFAULT_REPORT_PATH));
        assert_eq!(config.kong_version, DEFAULT_KONG_VERSION);
    }

    #[test]
    fn yaml_all_fields() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "config.yml",
            "plugins_directory: lua_plugins\nreport_path: out/report.json\nkong_version: 3.10.0.5\nkong_versions_dir: versions\nmax_workers: 3\ntask_timeout_secs: 30\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.report_path, Path::new("out/report.json"));
        assert_eq!(config.kong_version, "3.10.0.5");
        assert_eq!(config.kong_versions_dir, Path::new("versions"));
        let options = config.run_options().unwrap();
        assert_eq!(options.max_workers, 3);
        assert_eq!(options.task_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "config.ini", "[section]\nkey=value\n");
        assert!(matches!(
            Config::load(&path),
            Err(PongoError::Config { .. })
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "config.json", r#"{ "plugin_dir": "x" }"#);
        assert!(matches!(Config::load(&path), Err(PongoError::Json(_))));
    }

    #[test]
    fn missing_plugins_directory() {
        assert!(matches!(
            Config::default().plugins_directory(),
            Err(PongoError::Config { .. })
        ));
    }

    #[test]
    fn zero_workers_rejected() {
        let config = Config {
            max_workers: Some(0),
            ..Config::default()
        };
        assert!(config.run_options().is_err());
    }

    #[test]
    fn resolve_explicit_missing_file_errors() {
        let dir = tempdir().unwrap();
        assert!(Config::resolve(Some(&dir.path().join("absent.json"))).is_err());
    }
}
