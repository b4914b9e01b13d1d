//! Concurrent validation of many plugins.
//!
//! [`Orchestrator::new`] puts every plugin on the status board as `PENDING`
//! before anything is spawned. [`Orchestrator::run`] then starts one task
//! per plugin; a semaphore keeps at most `max_workers` validations in
//! flight, and results are collected as tasks finish. A failing, panicking
//! or timed-out validation turns into a `FAIL` row for that plugin only.

use std::any::Any;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::errors::{PongoError, Result};
use crate::models::{EntryDetails, PluginDirectory, PluginStatus, RunEntry, RunReport};
use crate::status::StatusBoard;
use crate::validator::{validate, ValidationReport};

/// Validation function run for each plugin.
pub type ValidateFn = Arc<dyn Fn(&Path) -> Result<ValidationReport> + Send + Sync>;

/// Tuning for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum number of validations running at once.
    pub max_workers: usize,
    /// Upper bound for a single plugin's validation.
    pub task_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_workers: default_workers(),
            task_timeout: None,
        }
    }
}

/// Worker count matching the available execution units.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Runs the validator over a fixed set of plugins.
pub struct Orchestrator {
    plugins: Vec<PluginDirectory>,
    options: RunOptions,
    board: StatusBoard,
    validator: ValidateFn,
}

impl Orchestrator {
    /// Register `plugins` as `PENDING` using the standard validator.
    ///
    /// Plugins are keyed by name; a later entry whose name is already taken
    /// is dropped with a warning.
    #[must_use]
    pub fn new(plugins: Vec<PluginDirectory>, options: RunOptions) -> Self {
        let mut seen = HashSet::new();
        let plugins: Vec<PluginDirectory> = plugins
            .into_iter()
            .filter(|p| {
                let fresh = seen.insert(p.name.clone());
                if !fresh {
                    warn!(
                        plugin = %p.name,
                        path = %p.path.display(),
                        "duplicate plugin name, skipping"
                    );
                }
                fresh
            })
            .collect();
        let board = StatusBoard::new(plugins.iter().map(|p| p.name.clone()));
        Self {
            plugins,
            options,
            board,
            validator: Arc::new(validate),
        }
    }

    /// Replace the validation function.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Path) -> Result<ValidationReport> + Send + Sync + 'static,
    {
        self.validator = Arc::new(validator);
        self
    }

    /// Handle to the live status board.
    #[must_use]
    pub fn status(&self) -> StatusBoard {
        self.board.clone()
    }

    /// Plugins in discovery order.
    #[must_use]
    pub fn plugins(&self) -> &[PluginDirectory] {
        &self.plugins
    }

    /// Validate every plugin and collect the entries in completion order.
    ///
    /// Always returns one entry per plugin.
    pub async fn run(self) -> RunReport {
        info!(
            plugins = self.plugins.len(),
            workers = self.options.max_workers,
            "checklist for plugins to be tested"
        );
        for (name, status) in self.board.snapshot() {
            info!("- {name}: {status}");
        }

        let permits = Arc::new(Semaphore::new(self.options.max_workers.max(1)));
        let mut tasks = JoinSet::new();
        for plugin in &self.plugins {
            tasks.spawn(test_plugin(
                plugin.clone(),
                self.board.clone(),
                Arc::clone(&permits),
                Arc::clone(&self.validator),
                self.options.task_timeout,
            ));
        }

        let mut report = RunReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => report.entries.push(entry),
                Err(e) => error!(error = %e, "plugin task aborted"),
            }
        }

        for plugin in &self.plugins {
            if report.entry(&plugin.name).is_none() {
                let entry = RunEntry::harness_failure(
                    &plugin.name,
                    PongoError::Harness {
                        message: "plugin task did not complete".to_string(),
                    }
                    .to_string(),
                );
                report.entries.push(finish(&self.board, entry));
            }
        }

        info!(
            passed = report.passed(),
            failed = report.failed(),
            "validation run finished"
        );
        report
    }
}

/// One plugin's task: wait for a worker slot, validate, record the outcome.
async fn test_plugin(
    plugin: PluginDirectory,
    board: StatusBoard,
    permits: Arc<Semaphore>,
    validator: ValidateFn,
    timeout: Option<Duration>,
) -> RunEntry {
    // The semaphore is never closed while tasks are alive.
    let permit = permits.acquire_owned().await.ok();

    board.set(&plugin.name, PluginStatus::Testing);
    info!("Testing {}... Status: {}", plugin.name, PluginStatus::Testing);

    // The slot is held by the blocking work itself, so a timed-out
    // validation keeps it until the thread actually returns.
    let path = plugin.path.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        (*validator)(&path)
    });
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                let message = PongoError::Harness {
                    message: format!("validation timed out after {limit:?}"),
                };
                return finish(
                    &board,
                    RunEntry::harness_failure(&plugin.name, message.to_string()),
                );
            }
        },
        None => handle.await,
    };

    let entry = match joined {
        Ok(Ok(report)) => RunEntry::from_report(&plugin.name, report),
        Ok(Err(e)) => RunEntry::harness_failure(&plugin.name, e.to_string()),
        Err(e) if e.is_panic() => {
            let message = PongoError::Harness {
                message: format!("validator panicked: {}", panic_message(e.into_panic())),
            };
            RunEntry::harness_failure(&plugin.name, message.to_string())
        }
        Err(e) => RunEntry::harness_failure(
            &plugin.name,
            PongoError::Harness {
                message: e.to_string(),
            }
            .to_string(),
        ),
    };
    finish(&board, entry)
}

/// Write the terminal status for an entry and log it.
fn finish(board: &StatusBoard, entry: RunEntry) -> RunEntry {
    board.set(&entry.plugin, entry.status);
    match &entry.details {
        EntryDetails::Report(report) if report.is_valid() => {
            info!("Completed {}. Status: {}", entry.plugin, entry.status);
        }
        EntryDetails::Report(report) => {
            let failed: Vec<&str> = report
                .failed_categories()
                .into_iter()
                .map(|c| c.as_str())
                .collect();
            warn!(
                "Completed {}. Status: {} ({})",
                entry.plugin,
                entry.status,
                failed.join(", ")
            );
        }
        EntryDetails::Error(message) => {
            error!("Completed {}. Status: {} ({message})", entry.plugin, entry.status);
        }
    }
    entry
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
