//! Position sources: the live futures leaderboard and offline snapshot files.

mod error;
mod leaderboard_client;
mod snapshot;
mod types;
mod validate;

use anyhow::Result;

pub use leaderboard_client::{LeaderboardClient, LeaderboardSource};
pub use snapshot::{Snapshot, SnapshotFile};

/// Anything that can produce a fresh trader/position snapshot for one scan cycle.
pub trait PositionSource {
    async fn fetch_snapshot(&self) -> Result<Snapshot>;
}
