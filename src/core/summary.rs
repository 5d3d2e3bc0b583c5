//! Run accounting and reporting
//!
//! Chunk processing produces a [`ChunkResult`]; the [`RunState`] owned by
//! the coordinator folds those into run totals and is consumed once into a
//! [`RunSummary`] when the run ends.

use crate::cli::exit_codes;
use crate::domain::ItemFailure;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Failure samples kept for the final report
pub const MAX_FAILURE_SAMPLES: usize = 100;

/// Failure samples printed in the human-readable summary
const PRINTED_FAILURES: usize = 10;

/// Outcome counts for one chunk
#[derive(Debug, Clone, Default)]
pub struct ChunkResult {
    /// Records that reached a terminal outcome
    pub records: usize,

    /// Records accepted by the store or written to the sink
    pub accepted: usize,

    /// Rejected records
    pub failures: Vec<ItemFailure>,

    /// Records that produced nothing (empty filter output)
    pub skipped: usize,

    /// Resubmissions made while resolving retryable items
    pub retries: usize,
}

impl ChunkResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record accepted records
    pub fn add_success(&mut self, count: usize) {
        self.records += count;
        self.accepted += count;
    }

    /// Record one rejected record
    pub fn add_failure(&mut self, failure: ItemFailure) {
        self.records += 1;
        self.failures.push(failure);
    }

    /// Record one skipped record
    pub fn add_skipped(&mut self) {
        self.records += 1;
        self.skipped += 1;
    }

    /// Number of rejected records
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ChunkResult) {
        self.records += other.records;
        self.accepted += other.accepted;
        self.skipped += other.skipped;
        self.retries += other.retries;
        self.failures.extend(other.failures);
    }
}

/// Which way documents flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// File to store
    Import,

    /// Store to file
    Export,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Import => write!(f, "Import"),
            Direction::Export => write!(f, "Export"),
        }
    }
}

/// Running totals for one transfer
///
/// Counters only ever grow. There is exactly one `RunState` per run.
#[derive(Debug)]
pub struct RunState {
    direction: Direction,
    started: Instant,
    started_at: DateTime<Utc>,
    chunks: usize,
    attempted: usize,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    retries: usize,
    failures: Vec<ItemFailure>,
}

impl RunState {
    /// Start accounting for a run
    pub fn start(direction: Direction) -> Self {
        Self {
            direction,
            started: Instant::now(),
            started_at: Utc::now(),
            chunks: 0,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            retries: 0,
            failures: Vec::new(),
        }
    }

    /// Fold one processed chunk into the totals
    pub fn record_chunk(&mut self, result: ChunkResult) {
        self.chunks += 1;
        self.attempted += result.records;
        self.succeeded += result.accepted;
        self.failed += result.failures.len();
        self.skipped += result.skipped;
        self.retries += result.retries;

        let room = MAX_FAILURE_SAMPLES.saturating_sub(self.failures.len());
        self.failures
            .extend(result.failures.into_iter().take(room));
    }

    /// Count records skipped outside any chunk (blank input lines, dry runs)
    pub fn add_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    /// Chunks processed so far
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Records accepted so far
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Records rejected so far
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Close the run
    pub fn finish(self, dry_run: bool, interrupted: bool) -> RunSummary {
        RunSummary {
            direction: self.direction,
            started_at: self.started_at,
            duration: self.started.elapsed(),
            chunks: self.chunks,
            attempted: self.attempted,
            succeeded: self.succeeded,
            failed: self.failed,
            skipped: self.skipped,
            retries: self.retries,
            failures: self.failures,
            dry_run,
            interrupted,
        }
    }
}

/// Final report of a transfer
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Transfer direction
    pub direction: Direction,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    /// Duration of the run
    pub duration: Duration,

    /// Chunks processed
    pub chunks: usize,

    /// Records that reached a terminal outcome
    pub attempted: usize,

    /// Accepted records
    pub succeeded: usize,

    /// Rejected records
    pub failed: usize,

    /// Skipped records
    pub skipped: usize,

    /// Resubmissions made
    pub retries: usize,

    /// First failures, in order of occurrence
    pub failures: Vec<ItemFailure>,

    /// Nothing was sent to the store
    pub dry_run: bool,

    /// The run stopped early on a shutdown signal
    pub interrupted: bool,
}

impl RunSummary {
    /// Check if the run finished without rejections
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let terminal = self.succeeded + self.failed;
        if terminal == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / terminal as f64) * 100.0
    }

    /// Process exit code for this run
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            exit_codes::INTERRUPTED
        } else if self.dry_run || self.failed == 0 {
            exit_codes::SUCCESS
        } else {
            exit_codes::PARTIAL_FAILURE
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            direction = %self.direction,
            started_at = %self.started_at.to_rfc3339(),
            chunks = self.chunks,
            attempted = self.attempted,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            retries = self.retries,
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs_f64(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Transfer completed"
        );

        for failure in &self.failures {
            tracing::debug!(
                ordinal = failure.ordinal,
                status = ?failure.status,
                reason = %failure.reason,
                "Rejected record"
            );
        }
    }

    /// Human-readable report
    ///
    /// Written to stderr by the CLI because stdout may carry documents.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { " (dry run)" } else { "" };
        out.push_str(&format!("{} Summary{mode}:\n", self.direction));
        out.push_str(&format!("  Chunks: {}\n", self.chunks));
        out.push_str(&format!("  Succeeded: {}\n", self.succeeded));
        out.push_str(&format!("  Failed: {}\n", self.failed));
        out.push_str(&format!("  Skipped: {}\n", self.skipped));
        if self.retries > 0 {
            out.push_str(&format!("  Retries: {}\n", self.retries));
        }
        out.push_str(&format!(
            "  Duration: {:.2}s\n",
            self.duration.as_secs_f64()
        ));
        if self.interrupted {
            out.push_str("  Interrupted: stopped after the current chunk\n");
        }

        if !self.failures.is_empty() {
            out.push_str("  Failures:\n");
            for failure in self.failures.iter().take(PRINTED_FAILURES) {
                match failure.status {
                    Some(status) => out.push_str(&format!(
                        "    - record {} [{}]: {}\n",
                        failure.ordinal, status, failure.reason
                    )),
                    None => out.push_str(&format!(
                        "    - record {}: {}\n",
                        failure.ordinal, failure.reason
                    )),
                }
            }
            if self.failed > PRINTED_FAILURES {
                out.push_str(&format!(
                    "    ... and {} more\n",
                    self.failed - PRINTED_FAILURES
                ));
            }
        }

        out
    }
}
