//! # Statistics Aggregator
//!
//! Fans a platform's probe set out in parallel and merges the results into
//! one snapshot, substituting declared fallback values for any probe that
//! fails.
//!
//! ## Overview
//!
//! Backend sub-resources (users, channels, repositories, billing) have
//! different availability and latency. Requiring all of them to succeed
//! would make the whole dashboard unusable whenever one minor sub-resource
//! is down, so each probe fails independently: its declared fallback values
//! are substituted and flagged with `fallback` provenance, and the
//! aggregation itself still completes.
//!
//! The aggregation call only fails on a malformed probe set (duplicate probe
//! names or overlapping metric declarations), which is a caller programming
//! error rather than a runtime condition.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use core_runtime::events::{ConsoleEvent, EventBus, StatsEvent};
use platform_traits::StatProbe;

use crate::snapshot::{MetricEntry, StatSnapshot};
use crate::{Result, SyncError};

/// Aggregates a platform's statistics probes into one snapshot.
pub struct StatAggregator {
    /// Platform key, used for logging and event payloads.
    platform: String,
    /// Optional event bus for aggregation events.
    event_bus: Option<Arc<EventBus>>,
}

impl StatAggregator {
    /// Create an aggregator for one platform.
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            event_bus: None,
        }
    }

    /// Attach an event bus; aggregation and probe-failure events are
    /// emitted best-effort.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Run all probes concurrently and merge their results.
    ///
    /// The returned snapshot contains every metric declared across the
    /// probes' fallback tables exactly once: real values for keys a
    /// successful probe reported, fallback values for everything else.
    /// Metrics a probe reports without declaring are dropped with a warning
    /// rather than merged, so the snapshot key set stays deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error only for a malformed probe set: duplicate probe
    /// names, or the same metric declared by two probes.
    #[instrument(skip(self, probes), fields(platform = %self.platform, probes = probes.len()))]
    pub async fn aggregate(&self, probes: &[Arc<dyn StatProbe>]) -> Result<StatSnapshot> {
        self.validate(probes)?;

        let results = join_all(probes.iter().map(|probe| async move {
            let outcome = probe.run().await;
            (probe, outcome)
        }))
        .await;

        let mut snapshot = StatSnapshot::new();

        for (probe, outcome) in results {
            let fallback = probe.fallback();

            match outcome {
                Ok(mut reported) => {
                    debug!(probe = probe.name(), metrics = reported.len(), "Probe succeeded");

                    for undeclared in reported
                        .keys()
                        .filter(|k| !fallback.contains_key(*k))
                        .cloned()
                        .collect::<Vec<_>>()
                    {
                        warn!(
                            probe = probe.name(),
                            metric = %undeclared,
                            "Probe reported undeclared metric, dropping"
                        );
                        reported.remove(&undeclared);
                    }

                    for (name, default) in fallback {
                        let entry = match reported.remove(&name) {
                            Some(value) => MetricEntry::ok(value),
                            None => MetricEntry::fallback(default),
                        };
                        snapshot.insert(name, entry);
                    }
                }
                Err(e) => {
                    warn!(probe = probe.name(), error = %e, "Probe failed, substituting fallback values");

                    if let Some(bus) = &self.event_bus {
                        bus.emit(ConsoleEvent::Stats(StatsEvent::ProbeFailed {
                            platform: self.platform.clone(),
                            probe: probe.name().to_string(),
                            message: e.to_string(),
                        }))
                        .ok();
                    }

                    for (name, default) in fallback {
                        snapshot.insert(name, MetricEntry::fallback(default));
                    }
                }
            }
        }

        if let Some(bus) = &self.event_bus {
            bus.emit(ConsoleEvent::Stats(StatsEvent::Aggregated {
                platform: self.platform.clone(),
                metric_count: snapshot.len(),
                fallback_count: snapshot.fallback_count(),
            }))
            .ok();
        }

        Ok(snapshot)
    }

    /// Reject duplicate probe names and overlapping metric declarations.
    fn validate(&self, probes: &[Arc<dyn StatProbe>]) -> Result<()> {
        let mut metric_owners: HashMap<String, String> = HashMap::new();
        let mut probe_names: HashSet<&str> = HashSet::new();

        for probe in probes {
            if !probe_names.insert(probe.name()) {
                return Err(SyncError::DuplicateProbe {
                    name: probe.name().to_string(),
                });
            }

            for metric in probe.fallback().into_keys() {
                if let Some(first) = metric_owners.get(&metric) {
                    return Err(SyncError::DuplicateMetric {
                        metric,
                        first: first.clone(),
                        second: probe.name().to_string(),
                    });
                }
                metric_owners.insert(metric, probe.name().to_string());
            }
        }

        Ok(())
    }
}
