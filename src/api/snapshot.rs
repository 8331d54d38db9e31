//! Offline snapshots: traders plus their open positions, stored as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{PositionBook, Trader};

use super::validate::sanitize_book;
use super::PositionSource;

/// One collection pass: the leaderboard and the positions held by its traders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub traders: Vec<Trader>,
    #[serde(default)]
    pub positions: PositionBook,
}

/// Reads a [`Snapshot`] from a JSON file on every fetch.
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PositionSource for SnapshotFile {
    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            traders = snapshot.traders.len(),
            "Loaded snapshot"
        );

        Ok(Snapshot {
            positions: sanitize_book(snapshot.positions),
            ..snapshot
        })
    }
}
