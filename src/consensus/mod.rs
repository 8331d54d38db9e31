//! Consensus engine: per-symbol aggregation, signal classification, and reporting.

mod aggregator;
mod builder;
mod classifier;
mod report;

pub use builder::{ConsensusBuilder, DEFAULT_MIN_CONSENSUS_PERCENT};
pub use report::{format_console_table, format_consensus_report};
