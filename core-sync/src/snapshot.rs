//! Statistics Snapshots
//!
//! The merged, fallback-completed result of running one platform's probe
//! set. Snapshots are recomputed on every aggregation request and never
//! persisted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a metric value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The probe succeeded and reported this value.
    Ok,
    /// The probe failed (or omitted the key); this is its declared fallback.
    Fallback,
}

/// One metric in a snapshot: the value plus its provenance flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub value: Value,
    pub provenance: Provenance,
}

impl MetricEntry {
    pub fn ok(value: Value) -> Self {
        Self {
            value,
            provenance: Provenance::Ok,
        }
    }

    pub fn fallback(value: Value) -> Self {
        Self {
            value,
            provenance: Provenance::Fallback,
        }
    }

    /// Whether the value is a number strictly greater than zero.
    ///
    /// Non-numeric values count as non-positive, so a string metric never
    /// flips a management area to `active` on its own.
    pub fn is_positive(&self) -> bool {
        match &self.value {
            Value::Number(n) => n.as_f64().is_some_and(|v| v > 0.0),
            _ => false,
        }
    }
}

/// The merged result of one aggregation pass for one platform.
///
/// Every metric declared by the probe set is present exactly once, either
/// with a real value (`ok`) or its declared fallback (`fallback`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSnapshot {
    metrics: BTreeMap<String, MetricEntry>,
}

impl StatSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a metric entry. Returns the previous entry if the key was
    /// already present; the aggregator treats that as a contract violation.
    pub(crate) fn insert(&mut self, name: String, entry: MetricEntry) -> Option<MetricEntry> {
        self.metrics.insert(name, entry)
    }

    /// Look up one metric.
    pub fn get(&self, name: &str) -> Option<&MetricEntry> {
        self.metrics.get(name)
    }

    /// Raw value of one metric, if present.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.metrics.get(name).map(|e| &e.value)
    }

    /// Whether the named metric is a positive number. Absent metrics are
    /// not positive.
    pub fn is_positive(&self, name: &str) -> bool {
        self.metrics.get(name).is_some_and(MetricEntry::is_positive)
    }

    /// Iterate metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricEntry)> {
        self.metrics.iter()
    }

    /// Total number of metrics in the snapshot.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Number of metrics populated from fallback values.
    pub fn fallback_count(&self) -> usize {
        self.metrics
            .values()
            .filter(|e| e.provenance == Provenance::Fallback)
            .count()
    }
}
