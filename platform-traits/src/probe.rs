//! Statistics Probes
//!
//! A probe is a read-only, independently-failable statistics fetch for one
//! sub-resource of a platform (users, channels, repositories, billing).
//! Probes close over whatever connection and auth context they need and are
//! invoked with no arguments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Metric name to value mapping returned by a probe.
///
/// Values are JSON values by convention: counters are numbers, but probes
/// may also report strings (e.g., a plan tier). Counters must use zero as
/// their fallback for status derivation to hold.
pub type MetricMap = BTreeMap<String, Value>;

/// A named, independently-failable statistics read.
///
/// The aggregator invokes all probes of a platform concurrently. A failing
/// probe does not taint the others; its declared fallback values are
/// substituted and flagged in the snapshot.
///
/// # Contract
///
/// - `name()` must be unique within one platform's probe set.
/// - `fallback()` declares the probe's complete key set. Every key a probe
///   can contribute must appear here, and counter fallbacks must be zero.
/// - `run()` is read-only with respect to the platform; it may fail with any
///   [`PlatformError`](crate::error::PlatformError), treated opaquely.
#[async_trait]
pub trait StatProbe: Send + Sync {
    /// Probe name, unique per platform (e.g., "users", "billing").
    fn name(&self) -> &str;

    /// Values substituted when `run` fails, keyed by the probe's full
    /// declared metric set. Counters must be zero.
    fn fallback(&self) -> MetricMap;

    /// Fetch the probe's metrics.
    async fn run(&self) -> Result<MetricMap>;
}
