//! # Event Bus System
//!
//! Event-driven channel between the orchestration core and presentation
//! layers, built on `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The orchestration core never renders anything itself; it emits typed
//! events that dashboards, loggers, or notification hooks consume
//! independently. Multiple subscribers can listen at once, and a slow
//! subscriber lags (receiving `RecvError::Lagged`) without blocking fast
//! ones.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{ConsoleEvent, EventBus, SyncEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(ConsoleEvent::Sync(SyncEvent::Started {
//!         run_id: "run-1".to_string(),
//!         platform: "slack".to_string(),
//!         connection_count: 2,
//!     }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Sync run started");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: subscriber missed `n` events; non-fatal.
//! - **`RecvError::Closed`**: all senders dropped; treat as shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum ConsoleEvent {
    /// Bulk synchronization events
    Sync(SyncEvent),
    /// Statistics aggregation events
    Stats(StatsEvent),
}

impl ConsoleEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            ConsoleEvent::Sync(e) => e.description(),
            ConsoleEvent::Stats(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            ConsoleEvent::Sync(SyncEvent::Failed { .. }) => EventSeverity::Error,
            ConsoleEvent::Sync(SyncEvent::JobFailed { .. }) => EventSeverity::Warning,
            ConsoleEvent::Stats(StatsEvent::ProbeFailed { .. }) => EventSeverity::Warning,
            ConsoleEvent::Sync(SyncEvent::Completed { .. }) => EventSeverity::Info,
            ConsoleEvent::Sync(SyncEvent::NothingToSync { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Sync Events
// ============================================================================

/// Events emitted during a bulk synchronization pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// Sync run initiated.
    Started {
        /// Unique identifier for this sync run.
        run_id: String,
        /// The platform being synced.
        platform: String,
        /// Number of active connections in the batch.
        connection_count: usize,
    },
    /// Processing moved on to the next connection in the batch.
    ConnectionStarted {
        /// The sync run ID.
        run_id: String,
        /// The connection being processed.
        connection_id: String,
        /// 1-based position within the batch.
        position: usize,
        /// Total connections in the batch.
        total: usize,
    },
    /// A job failed for one connection. The run continues.
    JobFailed {
        /// The sync run ID.
        run_id: String,
        /// The connection the job ran against.
        connection_id: String,
        /// The job name.
        job: String,
        /// Human-readable error message.
        message: String,
    },
    /// Sync run finished processing every connection.
    Completed {
        /// The sync run ID.
        run_id: String,
        /// Jobs attempted across all connections (skips excluded).
        jobs_attempted: u64,
        /// Jobs that succeeded.
        jobs_succeeded: u64,
        /// Jobs that failed.
        jobs_failed: u64,
        /// Duration of the run in seconds.
        duration_secs: u64,
    },
    /// Sync was requested but no active connections exist.
    NothingToSync {
        /// The platform the request targeted.
        platform: String,
    },
    /// The run itself failed on a contract violation before completing.
    Failed {
        /// The sync run ID.
        run_id: String,
        /// Human-readable error message.
        message: String,
    },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::Started { .. } => "Sync run started",
            SyncEvent::ConnectionStarted { .. } => "Connection sync started",
            SyncEvent::JobFailed { .. } => "Sync job failed",
            SyncEvent::Completed { .. } => "Sync run completed",
            SyncEvent::NothingToSync { .. } => "No connections to sync",
            SyncEvent::Failed { .. } => "Sync run failed",
        }
    }
}

// ============================================================================
// Stats Events
// ============================================================================

/// Events emitted during statistics aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum StatsEvent {
    /// An aggregation pass finished.
    Aggregated {
        /// The platform aggregated.
        platform: String,
        /// Total metrics in the snapshot.
        metric_count: usize,
        /// Metrics populated from fallback values.
        fallback_count: usize,
    },
    /// A probe failed and its fallback values were substituted.
    ProbeFailed {
        /// The platform aggregated.
        platform: String,
        /// The failing probe's name.
        probe: String,
        /// Human-readable error message.
        message: String,
    },
}

impl StatsEvent {
    fn description(&self) -> &str {
        match self {
            StatsEvent::Aggregated { .. } => "Statistics aggregated",
            StatsEvent::ProbeFailed { .. } => "Statistics probe failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ConsoleEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events, it
    /// will receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers. Callers that emit
    /// best-effort notifications should `.ok()` the result.
    pub fn emit(&self, event: ConsoleEvent) -> Result<usize, SendError<ConsoleEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscription to the event stream.
    ///
    /// Only events emitted after this call are received.
    pub fn subscribe(&self) -> Receiver<ConsoleEvent> {
        self.sender.subscribe()
    }

    /// Number of currently active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}
