pub mod checks;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod source;
pub mod status;
pub mod validator;

pub(crate) mod fs_util;

// Re-export key types at crate root for convenience.
pub use checks::{Category, CheckResult, CHECKS};
pub use config::Config;
pub use discovery::discover;
pub use errors::{PongoError, Result};
pub use models::{EntryDetails, PluginDirectory, PluginStatus, RunEntry, RunReport};
pub use orchestrator::{Orchestrator, RunOptions};
pub use report::{render_table, write_report};
pub use status::StatusBoard;
pub use validator::{validate, ValidationReport};
