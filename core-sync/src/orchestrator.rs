//! # Sync Orchestrator
//!
//! Drives a full synchronization pass over a platform's active connections.
//!
//! ## Overview
//!
//! The orchestrator is a deliberate single-lane pipeline: connections are
//! processed strictly in input order, one at a time, with an ordered list of
//! jobs per connection and a settling delay between consecutive connections.
//! Bulk operations against external platform APIs are subject to rate
//! limits keyed by connection or underlying account; parallelizing across
//! connections risks tripping shared limits.
//!
//! Within one connection, jobs run sequentially in declared order. Later
//! jobs may be scoped by data synced by earlier ones; the orchestrator does
//! not inspect job results, it relies on ordering as a convention.
//!
//! ## Failure semantics
//!
//! A failing job is caught, recorded in the [`SyncOutcome`], and never
//! aborts the connection's remaining jobs or the outer loop. The
//! orchestrator itself only fails on contract violations: an empty or
//! duplicate-named job list. No retry is performed within a run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_runtime::events::{ConsoleEvent, EventBus, SyncEvent};
use platform_traits::{Connection, SyncJob};

use crate::outcome::{ConnectionOutcome, JobRecord, JobStatus, SyncOutcome};
use crate::run::{current_timestamp, SyncRun};
use crate::{Result, SyncError};

/// Sync orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Delay between finishing one connection and starting the next
    /// (milliseconds). Zero disables pacing. No delay is applied after the
    /// last connection.
    pub pacing_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            // The interval the console historically used between
            // connections to stay under upstream per-minute limits.
            pacing_delay_ms: 1000,
        }
    }
}

impl OrchestratorConfig {
    /// Set the pacing delay in milliseconds
    pub fn with_pacing_delay_ms(mut self, delay_ms: u64) -> Self {
        self.pacing_delay_ms = delay_ms;
        self
    }
}

/// Orchestrates bulk synchronization passes.
///
/// One orchestrator can serve any number of platforms; the platform key is
/// passed per run. Callers are responsible for serializing concurrent runs
/// against the same connection set (see
/// [`IntegrationHub`](crate::hub::IntegrationHub)).
pub struct SyncOrchestrator {
    config: OrchestratorConfig,
    event_bus: Option<Arc<EventBus>>,
}

impl SyncOrchestrator {
    /// Create an orchestrator with the given configuration.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            event_bus: None,
        }
    }

    /// Attach an event bus; run lifecycle events are emitted best-effort.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Run every job against every connection, sequentially.
    ///
    /// `connections` must already be filtered to active connections; the
    /// orchestrator processes exactly what it is given, in the given order.
    /// An empty batch returns immediately with a distinguishable
    /// no-connections outcome rather than a hollow success.
    ///
    /// # Errors
    ///
    /// Returns an error only for contract violations: an empty job list or
    /// duplicate job names. The run is marked failed and a
    /// [`SyncEvent::Failed`] is emitted before the error propagates, so
    /// subscribers learn about aborted runs too. Remote failures are
    /// recorded in the outcome.
    #[instrument(skip(self, connections, jobs), fields(platform = %platform, connections = connections.len(), jobs = jobs.len()))]
    pub async fn run_sync_all(
        &self,
        platform: &str,
        connections: &[Connection],
        jobs: &[Arc<dyn SyncJob>],
    ) -> Result<SyncOutcome> {
        let run = SyncRun::new(platform, connections.len() as u64);
        let run_id = run.id;

        if let Err(e) = validate_jobs(jobs) {
            run.fail(e.to_string())?;
            self.emit(ConsoleEvent::Sync(SyncEvent::Failed {
                run_id: run_id.to_string(),
                message: e.to_string(),
            }));
            return Err(e);
        }

        if connections.is_empty() {
            info!("No active connections, nothing to sync");
            self.emit(ConsoleEvent::Sync(SyncEvent::NothingToSync {
                platform: platform.to_string(),
            }));

            let now = current_timestamp();
            return Ok(SyncOutcome {
                run_id,
                platform: platform.to_string(),
                connections: Vec::new(),
                started_at: now,
                finished_at: now,
            });
        }

        let mut run = run.start()?;
        self.emit(ConsoleEvent::Sync(SyncEvent::Started {
            run_id: run_id.to_string(),
            platform: platform.to_string(),
            connection_count: connections.len(),
        }));

        let mut connection_outcomes = Vec::with_capacity(connections.len());
        let mut jobs_attempted = 0u64;

        for (index, connection) in connections.iter().enumerate() {
            self.emit(ConsoleEvent::Sync(SyncEvent::ConnectionStarted {
                run_id: run_id.to_string(),
                connection_id: connection.id.to_string(),
                position: index + 1,
                total: connections.len(),
            }));

            let mut outcome = ConnectionOutcome::new(connection.id.clone());

            for job in jobs {
                if !job.applies_to(connection) {
                    debug!(
                        connection = %connection.id,
                        job = job.name(),
                        "Job does not apply to connection, skipping"
                    );
                    outcome.jobs.push(JobRecord {
                        job: job.name().to_string(),
                        status: JobStatus::Skipped,
                    });
                    continue;
                }

                jobs_attempted += 1;
                match job.run(connection).await {
                    Ok(()) => {
                        debug!(connection = %connection.id, job = job.name(), "Job succeeded");
                        outcome.jobs.push(JobRecord {
                            job: job.name().to_string(),
                            status: JobStatus::Succeeded,
                        });
                    }
                    Err(e) => {
                        warn!(
                            connection = %connection.id,
                            job = job.name(),
                            error = %e,
                            "Job failed, continuing with remaining jobs"
                        );
                        self.emit(ConsoleEvent::Sync(SyncEvent::JobFailed {
                            run_id: run_id.to_string(),
                            connection_id: connection.id.to_string(),
                            job: job.name().to_string(),
                            message: e.to_string(),
                        }));
                        outcome.jobs.push(JobRecord {
                            job: job.name().to_string(),
                            status: JobStatus::Failed {
                                message: e.to_string(),
                            },
                        });
                    }
                }
            }

            connection_outcomes.push(outcome);
            run.update_progress((index + 1) as u64, jobs_attempted)?;

            // Settling delay between connections, never after the last one.
            let more_remain = index + 1 < connections.len();
            if more_remain && self.config.pacing_delay_ms > 0 {
                debug!(delay_ms = self.config.pacing_delay_ms, "Pacing before next connection");
                tokio::time::sleep(Duration::from_millis(self.config.pacing_delay_ms)).await;
            }
        }

        let run = run.complete()?;
        let outcome = SyncOutcome {
            run_id,
            platform: platform.to_string(),
            connections: connection_outcomes,
            started_at: run.started_at.unwrap_or(run.created_at),
            finished_at: run.completed_at.unwrap_or_else(current_timestamp),
        };

        self.emit(ConsoleEvent::Sync(SyncEvent::Completed {
            run_id: run_id.to_string(),
            jobs_attempted: outcome.jobs_attempted(),
            jobs_succeeded: outcome.jobs_succeeded(),
            jobs_failed: outcome.jobs_failed(),
            duration_secs: outcome.duration_secs(),
        }));

        info!(
            "Sync run {} completed: {} attempted, {} succeeded, {} failed, {} skipped",
            run_id,
            outcome.jobs_attempted(),
            outcome.jobs_succeeded(),
            outcome.jobs_failed(),
            outcome.jobs_skipped()
        );

        Ok(outcome)
    }

    fn emit(&self, event: ConsoleEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event).ok();
        }
    }
}

/// Reject an empty job list or duplicate job names.
fn validate_jobs(jobs: &[Arc<dyn SyncJob>]) -> Result<()> {
    if jobs.is_empty() {
        return Err(SyncError::EmptyJobList);
    }

    let mut seen = HashSet::new();
    for job in jobs {
        if !seen.insert(job.name()) {
            return Err(SyncError::DuplicateJob {
                name: job.name().to_string(),
            });
        }
    }

    Ok(())
}
