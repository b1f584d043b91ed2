//! # Service Status Derivation
//!
//! Maps a statistics snapshot plus connection count into the coarse
//! operational status shown on each management-area card.
//!
//! Derivation is a pure, total function: absence of any connection always
//! dominates (a dashboard full of zeros still reads "set up required" when
//! nothing is connected), and otherwise an area is "active" exactly when at
//! least one of its metrics is positive. Fallback values are required to be
//! zero for this to hold; see [`StatProbe::fallback`](platform_traits::StatProbe::fallback).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::snapshot::StatSnapshot;
use crate::{Result, SyncError};

/// Operational status of one management area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStatus {
    /// No active connections exist; the area cannot show data yet.
    SetupRequired,
    /// Connections exist but none of the area's metrics are positive.
    Available,
    /// Connections exist and at least one metric is positive.
    Active,
}

impl ServiceStatus {
    /// String form used in API payloads and the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::SetupRequired => "setup-required",
            ServiceStatus::Available => "available",
            ServiceStatus::Active => "active",
        }
    }
}

impl FromStr for ServiceStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "setup-required" => Ok(ServiceStatus::SetupRequired),
            "available" => Ok(ServiceStatus::Available),
            "active" => Ok(ServiceStatus::Active),
            _ => Err(SyncError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One management area and the snapshot metrics that drive its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceArea {
    /// Area key (e.g., "users", "billing-area").
    pub key: String,
    /// Metric names consulted when deriving the area's status.
    pub metrics: Vec<String>,
}

impl ServiceArea {
    pub fn new(key: impl Into<String>, metrics: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key: key.into(),
            metrics: metrics.into_iter().map(Into::into).collect(),
        }
    }
}

/// Derive the status of one management area.
///
/// Zero connections always yields [`ServiceStatus::SetupRequired`],
/// regardless of snapshot content. Otherwise the area is
/// [`ServiceStatus::Active`] when any of its metrics is a positive number
/// and [`ServiceStatus::Available`] when all are zero or absent. An area
/// with no metrics configured is never active.
pub fn derive_status(
    area: &ServiceArea,
    snapshot: &StatSnapshot,
    connection_count: usize,
) -> ServiceStatus {
    if connection_count == 0 {
        return ServiceStatus::SetupRequired;
    }

    let any_positive = area.metrics.iter().any(|m| snapshot.is_positive(m));
    if any_positive {
        ServiceStatus::Active
    } else {
        ServiceStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MetricEntry;
    use serde_json::json;

    fn snapshot_with(entries: &[(&str, serde_json::Value, bool)]) -> StatSnapshot {
        let mut snapshot = StatSnapshot::new();
        for (name, value, ok) in entries {
            let entry = if *ok {
                MetricEntry::ok(value.clone())
            } else {
                MetricEntry::fallback(value.clone())
            };
            snapshot.insert(name.to_string(), entry);
        }
        snapshot
    }

    #[test]
    fn test_zero_connections_dominates() {
        // Even a loaded snapshot reads setup-required with no connections.
        let snapshot = snapshot_with(&[("total_users", json!(500), true)]);
        let area = ServiceArea::new("users", ["total_users"]);

        assert_eq!(
            derive_status(&area, &snapshot, 0),
            ServiceStatus::SetupRequired
        );
    }

    #[test]
    fn test_positive_metric_is_active() {
        let snapshot = snapshot_with(&[("total_users", json!(3), true)]);
        let area = ServiceArea::new("users", ["total_users"]);

        assert_eq!(derive_status(&area, &snapshot, 1), ServiceStatus::Active);
    }

    #[test]
    fn test_zero_metrics_are_available() {
        let snapshot = snapshot_with(&[
            ("total_users", json!(0), true),
            ("active_users", json!(0), false),
        ]);
        let area = ServiceArea::new("users", ["total_users", "active_users"]);

        assert_eq!(derive_status(&area, &snapshot, 2), ServiceStatus::Available);
    }

    #[test]
    fn test_absent_metrics_are_available() {
        let snapshot = StatSnapshot::new();
        let area = ServiceArea::new("billing-area", ["open_invoices"]);

        assert_eq!(derive_status(&area, &snapshot, 1), ServiceStatus::Available);
    }

    #[test]
    fn test_fallback_zero_stays_available() {
        // Scenario B from the console requirements: a failed billing probe
        // must not light the billing card up as active.
        let snapshot = snapshot_with(&[
            ("users", json!(9), true),
            ("billing", json!(0), false),
        ]);
        let area = ServiceArea::new("billing-area", ["billing"]);

        assert_eq!(derive_status(&area, &snapshot, 1), ServiceStatus::Available);
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            ServiceStatus::SetupRequired,
            ServiceStatus::Available,
            ServiceStatus::Active,
        ] {
            assert_eq!(status.as_str().parse::<ServiceStatus>().unwrap(), status);
        }
        assert!("unknown".parse::<ServiceStatus>().is_err());
    }
}
