//! # Sync Run State Machine
//!
//! Manages the lifecycle of one bulk synchronization pass with validated
//! state transitions.
//!
//! ## State Machine
//!
//! ```text
//! Pending → Running → Completed
//!     ↓         ↓
//!     └──────→ Failed
//! ```
//!
//! A run only fails on a contract violation (malformed job list, broken
//! connection source); remote job failures are recorded in the outcome and
//! leave the run on the path to `Completed`. Cancellation is deliberately
//! not modeled; callers wanting it must layer a cooperative check above the
//! orchestrator.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{Result, SyncError};

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncRunId(Uuid);

impl SyncRunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the string representation of this ID
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for SyncRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SyncRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Status Types
// ============================================================================

/// The current status of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Run has been created but not yet started
    Pending,
    /// Run is processing connections
    Running,
    /// Run processed every connection (individual jobs may have failed)
    Completed,
    /// Run aborted on a contract violation
    Failed,
}

impl RunStatus {
    /// Check if this status represents a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl FromStr for RunStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RunStatus::Pending),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            _ => Err(SyncError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Progress information for a running sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    /// Connections in the batch
    pub connections_total: u64,
    /// Connections fully processed so far
    pub connections_processed: u64,
    /// Jobs attempted so far (skips excluded)
    pub jobs_attempted: u64,
    /// Progress percentage (0-100)
    pub percent: u8,
}

impl RunProgress {
    /// Update progress with new values
    pub fn update(&mut self, connections_processed: u64, jobs_attempted: u64) {
        self.connections_processed = connections_processed;
        self.jobs_attempted = jobs_attempted;
        self.percent = if self.connections_total > 0 {
            ((connections_processed as f64 / self.connections_total as f64) * 100.0).min(100.0)
                as u8
        } else {
            0
        };
    }
}

// ============================================================================
// Sync Run Entity
// ============================================================================

/// One bulk synchronization pass over a platform's connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRun {
    /// Unique identifier for this run
    pub id: SyncRunId,
    /// The platform being synced
    pub platform: String,
    /// Current status
    pub status: RunStatus,
    /// Progress information
    pub progress: RunProgress,
    /// Error message if the run failed
    pub error_message: Option<String>,
    /// When the run was created
    pub created_at: i64,
    /// When the run started processing
    pub started_at: Option<i64>,
    /// When the run reached a terminal state
    pub completed_at: Option<i64>,
}

impl SyncRun {
    /// Create a new sync run in pending state
    pub fn new(platform: impl Into<String>, connections_total: u64) -> Self {
        Self {
            id: SyncRunId::new(),
            platform: platform.into(),
            status: RunStatus::Pending,
            progress: RunProgress {
                connections_total,
                ..RunProgress::default()
            },
            error_message: None,
            created_at: current_timestamp(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Start the run
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not in `Pending` state
    pub fn start(mut self) -> Result<Self> {
        self.validate_transition(RunStatus::Running)?;
        self.status = RunStatus::Running;
        self.started_at = Some(current_timestamp());
        Ok(self)
    }

    /// Update progress information
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not in `Running` state
    pub fn update_progress(&mut self, connections_processed: u64, jobs_attempted: u64) -> Result<()> {
        if self.status != RunStatus::Running {
            return Err(SyncError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: "update_progress".to_string(),
                reason: "Run must be running to update progress".to_string(),
            });
        }

        self.progress.update(connections_processed, jobs_attempted);
        Ok(())
    }

    /// Mark the run as completed
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not in `Running` state
    pub fn complete(mut self) -> Result<Self> {
        self.validate_transition(RunStatus::Completed)?;
        self.status = RunStatus::Completed;
        self.completed_at = Some(current_timestamp());
        self.progress.percent = 100;
        Ok(self)
    }

    /// Mark the run as failed with an error message
    ///
    /// # Errors
    ///
    /// Returns an error if the run is already in a terminal state
    pub fn fail(mut self, error_message: String) -> Result<Self> {
        self.validate_transition(RunStatus::Failed)?;
        self.status = RunStatus::Failed;
        self.completed_at = Some(current_timestamp());
        self.error_message = Some(error_message);
        Ok(self)
    }

    /// Get the duration of the run in seconds
    ///
    /// Returns None if the run hasn't started or finished yet
    pub fn duration_secs(&self) -> Option<u64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).max(0) as u64),
            _ => None,
        }
    }

    /// Validate a state transition
    fn validate_transition(&self, to: RunStatus) -> Result<()> {
        let valid = matches!(
            (self.status, to),
            (RunStatus::Pending, RunStatus::Running)
                | (RunStatus::Pending, RunStatus::Failed)
                | (RunStatus::Running, RunStatus::Completed)
                | (RunStatus::Running, RunStatus::Failed)
        );

        if !valid {
            return Err(SyncError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: to.as_str().to_string(),
                reason: format!(
                    "Cannot transition from {} to {}",
                    self.status.as_str(),
                    to.as_str()
                ),
            });
        }

        Ok(())
    }
}

/// Get current Unix timestamp
pub(crate) fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

// ============================================================================
// Tests
// ============================================================================
