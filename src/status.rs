//! Shared per-plugin status for an orchestrated run.
//!
//! The board is populated with every plugin before any worker starts and
//! never gains or loses keys afterwards. Each worker owns exactly one key,
//! so values are plain atomics and the map itself needs no lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::models::PluginStatus;

/// Cloneable handle to the status map of one run.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    cells: Arc<HashMap<String, AtomicU8>>,
}

impl StatusBoard {
    /// Create a board with every name set to `PENDING`.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = names
            .into_iter()
            .map(|n| (n.into(), AtomicU8::new(PluginStatus::Pending as u8)))
            .collect();
        Self {
            cells: Arc::new(cells),
        }
    }

    /// Current status of a plugin, `None` for names not on the board.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<PluginStatus> {
        self.cells
            .get(name)
            .map(|cell| PluginStatus::from_u8(cell.load(Ordering::Acquire)))
    }

    /// Record a transition. Unknown names and transitions out of a terminal
    /// state are ignored; returns whether the status changed.
    pub fn set(&self, name: &str, status: PluginStatus) -> bool {
        let Some(cell) = self.cells.get(name) else {
            return false;
        };
        cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            if PluginStatus::from_u8(current).is_terminal() {
                None
            } else {
                Some(status as u8)
            }
        })
        .is_ok()
    }

    /// Number of plugins on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the board tracks no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All statuses, sorted by plugin name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, PluginStatus)> {
        let mut rows: Vec<(String, PluginStatus)> = self
            .cells
            .iter()
            .map(|(name, cell)| {
                (
                    name.clone(),
                    PluginStatus::from_u8(cell.load(Ordering::Acquire)),
                )
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}
