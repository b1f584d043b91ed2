//! # Integration Hub
//!
//! One generic engine any platform integration can parametrize.
//!
//! ## Overview
//!
//! Each platform registers a [`PlatformAdapter`] bundling its connection
//! source, statistics probes, sync jobs, and management areas. The hub then
//! serves the two console flows:
//!
//! - **Overview** ([`IntegrationHub::platform_overview`]): list connections,
//!   drop inactive ones, aggregate the probe set concurrently, and derive a
//!   status per management area.
//! - **Sync all** ([`IntegrationHub::sync_platform`]): list and filter
//!   connections, then drive the sequential sync orchestrator.
//!
//! The hub rejects a second concurrent sync for the same platform; the
//! console disables its "Sync All" trigger while a run is in flight, and
//! this guard backs that up server-side. Connection records are never
//! mutated here; callers interpret the returned [`SyncOutcome`] and update
//! `last_sync_at` through their own persistence layer.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument};

use core_runtime::events::EventBus;
use platform_traits::{connection::filter_active, ConnectionSource, StatProbe, SyncJob};

use crate::aggregator::StatAggregator;
use crate::orchestrator::{OrchestratorConfig, SyncOrchestrator};
use crate::outcome::SyncOutcome;
use crate::snapshot::StatSnapshot;
use crate::status::{derive_status, ServiceArea, ServiceStatus};
use crate::{Result, SyncError};

/// Everything one platform integration supplies to the engine.
pub struct PlatformAdapter {
    /// Stable platform key (e.g., "github", "slack").
    pub key: String,
    /// Name shown in the console.
    pub display_name: String,
    /// Supplies the platform's stored connections.
    pub connection_source: Arc<dyn ConnectionSource>,
    /// Statistics probes, one per sub-resource.
    pub probes: Vec<Arc<dyn StatProbe>>,
    /// Sync jobs in execution order.
    pub jobs: Vec<Arc<dyn SyncJob>>,
    /// Management areas and the metrics that drive their status.
    pub areas: Vec<ServiceArea>,
}

/// The aggregated dashboard view for one platform.
#[derive(Debug, Clone)]
pub struct PlatformOverview {
    /// Platform key.
    pub platform: String,
    /// Number of active connections.
    pub connection_count: usize,
    /// Merged, fallback-completed statistics.
    pub snapshot: StatSnapshot,
    /// Derived status per management area, keyed by area.
    pub statuses: BTreeMap<String, ServiceStatus>,
}

/// Registry and entry point for all platform integrations.
pub struct IntegrationHub {
    config: OrchestratorConfig,
    event_bus: Arc<EventBus>,
    adapters: RwLock<HashMap<String, Arc<PlatformAdapter>>>,
    /// Platforms with a sync run currently in flight.
    active_syncs: Mutex<HashSet<String>>,
}

impl IntegrationHub {
    /// Create a hub with the given orchestrator configuration.
    pub fn new(config: OrchestratorConfig, event_bus: Arc<EventBus>) -> Self {
        Self {
            config,
            event_bus,
            adapters: RwLock::new(HashMap::new()),
            active_syncs: Mutex::new(HashSet::new()),
        }
    }

    /// Register a platform adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is already registered.
    pub async fn register_platform(&self, adapter: PlatformAdapter) -> Result<()> {
        let mut adapters = self.adapters.write().await;
        if adapters.contains_key(&adapter.key) {
            return Err(SyncError::PlatformAlreadyRegistered {
                platform: adapter.key,
            });
        }

        info!(platform = %adapter.key, probes = adapter.probes.len(), jobs = adapter.jobs.len(), "Registered platform");
        adapters.insert(adapter.key.clone(), Arc::new(adapter));
        Ok(())
    }

    /// Keys of all registered platforms, sorted.
    pub async fn platform_keys(&self) -> Vec<String> {
        let adapters = self.adapters.read().await;
        let mut keys: Vec<String> = adapters.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Whether a sync run is currently in flight for the platform.
    pub async fn is_sync_active(&self, platform: &str) -> bool {
        self.active_syncs.lock().await.contains(platform)
    }

    /// Build the dashboard overview for one platform: active connection
    /// count, aggregated statistics, and a derived status per area.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform is unknown, its connection source
    /// fails, or its probe set is malformed. Individual probe failures do
    /// not error; they appear as fallback provenance in the snapshot.
    #[instrument(skip(self))]
    pub async fn platform_overview(&self, platform: &str) -> Result<PlatformOverview> {
        let adapter = self.adapter(platform).await?;

        let connections = adapter
            .connection_source
            .list()
            .await
            .map_err(|e| SyncError::ConnectionSource(e.to_string()))?;
        let active = filter_active(connections);

        let aggregator = StatAggregator::new(platform.to_string())
            .with_event_bus(Arc::clone(&self.event_bus));
        let snapshot = aggregator.aggregate(&adapter.probes).await?;

        let statuses = adapter
            .areas
            .iter()
            .map(|area| {
                let status = derive_status(area, &snapshot, active.len());
                (area.key.clone(), status)
            })
            .collect();

        Ok(PlatformOverview {
            platform: platform.to_string(),
            connection_count: active.len(),
            snapshot,
            statuses,
        })
    }

    /// Run a full synchronization pass for one platform.
    ///
    /// Lists connections, drops inactive ones, and drives the sequential
    /// orchestrator. At most one run per platform is in flight at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform is unknown, a run is already in
    /// flight, the connection source fails, or the job list is malformed.
    /// Remote job failures are recorded in the returned outcome instead.
    #[instrument(skip(self))]
    pub async fn sync_platform(&self, platform: &str) -> Result<SyncOutcome> {
        let adapter = self.adapter(platform).await?;

        {
            let mut active_syncs = self.active_syncs.lock().await;
            if !active_syncs.insert(platform.to_string()) {
                return Err(SyncError::SyncInProgress {
                    platform: platform.to_string(),
                });
            }
        }

        let result = self.sync_platform_inner(&adapter, platform).await;

        self.active_syncs.lock().await.remove(platform);
        result
    }

    async fn sync_platform_inner(
        &self,
        adapter: &PlatformAdapter,
        platform: &str,
    ) -> Result<SyncOutcome> {
        let connections = adapter
            .connection_source
            .list()
            .await
            .map_err(|e| SyncError::ConnectionSource(e.to_string()))?;
        let active = filter_active(connections);

        let orchestrator = SyncOrchestrator::new(self.config.clone())
            .with_event_bus(Arc::clone(&self.event_bus));
        orchestrator
            .run_sync_all(platform, &active, &adapter.jobs)
            .await
    }

    async fn adapter(&self, platform: &str) -> Result<Arc<PlatformAdapter>> {
        let adapters = self.adapters.read().await;
        adapters
            .get(platform)
            .cloned()
            .ok_or_else(|| SyncError::PlatformNotRegistered {
                platform: platform.to_string(),
            })
    }
}
