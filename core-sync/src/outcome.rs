//! # Sync Outcomes
//!
//! The immutable report produced by one bulk synchronization pass: a
//! per-connection, per-job record plus aggregate counters. Partial success
//! is the common case, so callers render the counts rather than a single
//! binary status. The core never persists outcomes.

use serde::{Deserialize, Serialize};

use platform_traits::ConnectionId;

use crate::run::SyncRunId;

/// Result of one job attempt against one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    /// The job ran and returned successfully.
    Succeeded,
    /// The job ran and failed; the error is recorded, never propagated.
    Failed { message: String },
    /// The job did not apply to this connection. Counted as neither
    /// success nor failure.
    Skipped,
}

/// One job's record within a connection's sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job name.
    pub job: String,
    /// What happened.
    pub status: JobStatus,
}

/// All job records for one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOutcome {
    /// The connection the jobs ran against.
    pub connection_id: ConnectionId,
    /// Job records in execution order.
    pub jobs: Vec<JobRecord>,
}

impl ConnectionOutcome {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            jobs: Vec::new(),
        }
    }

    /// Whether every attempted job succeeded (skips ignored).
    pub fn is_clean(&self) -> bool {
        !self
            .jobs
            .iter()
            .any(|r| matches!(r.status, JobStatus::Failed { .. }))
    }
}

/// The aggregate result of one sync pass.
///
/// Distinguishes "nothing to sync" (no connections in the batch) from a
/// pass that ran and succeeded: [`has_connections`](SyncOutcome::has_connections)
/// is false only in the former case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// The run this outcome belongs to.
    pub run_id: SyncRunId,
    /// The platform synced.
    pub platform: String,
    /// Per-connection records, in batch order.
    pub connections: Vec<ConnectionOutcome>,
    /// Unix timestamp when the pass started.
    pub started_at: i64,
    /// Unix timestamp when the pass finished.
    pub finished_at: i64,
}

impl SyncOutcome {
    /// Whether the batch contained any connections at all.
    ///
    /// Callers use this to show "nothing to sync" instead of a hollow
    /// success message.
    pub fn has_connections(&self) -> bool {
        !self.connections.is_empty()
    }

    /// Jobs attempted across all connections. Skips are excluded.
    pub fn jobs_attempted(&self) -> u64 {
        self.job_statuses()
            .filter(|s| !matches!(s, JobStatus::Skipped))
            .count() as u64
    }

    /// Jobs that succeeded.
    pub fn jobs_succeeded(&self) -> u64 {
        self.job_statuses()
            .filter(|s| matches!(s, JobStatus::Succeeded))
            .count() as u64
    }

    /// Jobs that failed.
    pub fn jobs_failed(&self) -> u64 {
        self.job_statuses()
            .filter(|s| matches!(s, JobStatus::Failed { .. }))
            .count() as u64
    }

    /// Jobs skipped because they did not apply to a connection.
    pub fn jobs_skipped(&self) -> u64 {
        self.job_statuses()
            .filter(|s| matches!(s, JobStatus::Skipped))
            .count() as u64
    }

    /// Whether the pass ran against at least one connection with no job
    /// failures.
    pub fn is_fully_successful(&self) -> bool {
        self.has_connections() && self.jobs_failed() == 0
    }

    /// Connections whose last successful job should advance their
    /// `last_sync_at` timestamp: those with at least one succeeded job.
    pub fn synced_connection_ids(&self) -> Vec<&ConnectionId> {
        self.connections
            .iter()
            .filter(|c| {
                c.jobs
                    .iter()
                    .any(|r| matches!(r.status, JobStatus::Succeeded))
            })
            .map(|c| &c.connection_id)
            .collect()
    }

    /// Duration of the pass in seconds.
    pub fn duration_secs(&self) -> u64 {
        (self.finished_at - self.started_at).max(0) as u64
    }

    fn job_statuses(&self) -> impl Iterator<Item = &JobStatus> {
        self.connections
            .iter()
            .flat_map(|c| c.jobs.iter())
            .map(|r| &r.status)
    }
}
