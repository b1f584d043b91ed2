//! # Core Sync
//!
//! Platform-agnostic synchronization and status-aggregation engine for the
//! management console.
//!
//! ## Overview
//!
//! Every platform integration looks the same from the console's point of
//! view: some stored connections, a handful of statistics probes, an ordered
//! list of sync jobs, and a few management areas whose status the dashboard
//! renders. This crate implements that shape once:
//!
//! - [`StatAggregator`] fans probes out concurrently and merges their
//!   metrics into a [`StatSnapshot`], substituting fallback values for any
//!   probe that fails.
//! - [`derive_status`] maps a snapshot plus the connection count onto the
//!   three-level [`ServiceStatus`] ladder the dashboard shows.
//! - [`SyncOrchestrator`] walks connections sequentially, runs jobs in
//!   order with per-job failure isolation, and paces requests between
//!   connections.
//! - [`IntegrationHub`] ties it together: platforms register a
//!   [`PlatformAdapter`] and the hub serves overview and sync-all requests,
//!   allowing at most one sync in flight per platform.
//!
//! Probe and job failures are data, not errors: they surface as fallback
//! provenance in snapshots and failure records in [`SyncOutcome`]s.
//! [`SyncError`] is reserved for contract violations and invalid requests.

pub mod aggregator;
pub mod error;
pub mod hub;
pub mod orchestrator;
pub mod outcome;
pub mod run;
pub mod snapshot;
pub mod status;

pub use aggregator::StatAggregator;
pub use error::{Result, SyncError};
pub use hub::{IntegrationHub, PlatformAdapter, PlatformOverview};
pub use orchestrator::{OrchestratorConfig, SyncOrchestrator};
pub use outcome::{ConnectionOutcome, JobRecord, JobStatus, SyncOutcome};
pub use run::{RunProgress, RunStatus, SyncRun, SyncRunId};
pub use snapshot::{MetricEntry, Provenance, StatSnapshot};
pub use status::{derive_status, ServiceArea, ServiceStatus};
