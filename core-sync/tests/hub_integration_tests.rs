//! End-to-end tests for the integration hub: a fake platform adapter wired
//! through overview aggregation, status derivation, and a full sync pass.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use core_runtime::events::{ConsoleEvent, EventBus, StatsEvent, SyncEvent};
use core_sync::{
    IntegrationHub, OrchestratorConfig, PlatformAdapter, Provenance, ServiceArea, ServiceStatus,
    SyncError,
};
use platform_traits::{
    Connection, ConnectionSource, MetricMap, PlatformError, StatProbe, SyncJob,
};

// ============================================================================
// Fake platform pieces
// ============================================================================

struct FixedSource {
    connections: Vec<Connection>,
}

#[async_trait]
impl ConnectionSource for FixedSource {
    async fn list(&self) -> platform_traits::error::Result<Vec<Connection>> {
        Ok(self.connections.clone())
    }
}

/// A probe that reports fixed metrics, or fails when `metrics` is None.
struct FakeProbe {
    name: &'static str,
    metrics: Option<BTreeMap<&'static str, i64>>,
    declared: Vec<&'static str>,
}

impl FakeProbe {
    fn reporting(name: &'static str, metrics: &[(&'static str, i64)]) -> Arc<dyn StatProbe> {
        Arc::new(Self {
            name,
            metrics: Some(metrics.iter().cloned().collect()),
            declared: metrics.iter().map(|(k, _)| *k).collect(),
        })
    }

    fn failing(name: &'static str, declared: &[&'static str]) -> Arc<dyn StatProbe> {
        Arc::new(Self {
            name,
            metrics: None,
            declared: declared.to_vec(),
        })
    }
}

#[async_trait]
impl StatProbe for FakeProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn fallback(&self) -> MetricMap {
        self.declared
            .iter()
            .map(|k| (k.to_string(), json!(0)))
            .collect()
    }

    async fn run(&self) -> platform_traits::error::Result<MetricMap> {
        match &self.metrics {
            Some(metrics) => Ok(metrics
                .iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect()),
            None => Err(PlatformError::Unavailable("probe endpoint 503".to_string())),
        }
    }
}

struct LoggingJob {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    fail_for: Option<&'static str>,
}

#[async_trait]
impl SyncJob for LoggingJob {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, connection: &Connection) -> platform_traits::error::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}.{}", connection.id, self.name));

        if self.fail_for == Some(connection.id.as_str()) {
            return Err(PlatformError::Unauthorized(
                "token expired".to_string(),
            ));
        }
        Ok(())
    }
}

fn hub_with_pacing(pacing_delay_ms: u64) -> IntegrationHub {
    IntegrationHub::new(
        OrchestratorConfig::default().with_pacing_delay_ms(pacing_delay_ms),
        Arc::new(EventBus::new(64)),
    )
}

fn github_adapter(
    connections: Vec<Connection>,
    probes: Vec<Arc<dyn StatProbe>>,
    jobs: Vec<Arc<dyn SyncJob>>,
) -> PlatformAdapter {
    PlatformAdapter {
        key: "github".to_string(),
        display_name: "GitHub".to_string(),
        connection_source: Arc::new(FixedSource { connections }),
        probes,
        jobs,
        areas: vec![
            ServiceArea::new("users", ["total_users"]),
            ServiceArea::new("billing-area", ["open_invoices"]),
        ],
    }
}

// ============================================================================
// Overview flow
// ============================================================================

#[tokio::test]
async fn test_overview_merges_probes_and_derives_statuses() {
    let hub = hub_with_pacing(0);
    hub.register_platform(github_adapter(
        vec![Connection::new("c1", "Acme Corp")],
        vec![
            FakeProbe::reporting("users", &[("total_users", 42)]),
            FakeProbe::reporting("billing", &[("open_invoices", 0)]),
        ],
        vec![Arc::new(LoggingJob {
            name: "sync-users",
            log: Arc::new(Mutex::new(Vec::new())),
            fail_for: None,
        })],
    ))
    .await
    .unwrap();

    let overview = hub.platform_overview("github").await.unwrap();

    assert_eq!(overview.connection_count, 1);
    assert_eq!(overview.snapshot.len(), 2);
    assert_eq!(overview.snapshot.value("total_users"), Some(&json!(42)));
    assert_eq!(overview.statuses["users"], ServiceStatus::Active);
    assert_eq!(overview.statuses["billing-area"], ServiceStatus::Available);
}

#[tokio::test]
async fn test_overview_with_failing_probe_falls_back() {
    // One probe down must not poison the others, and the failed area must
    // read available, not active, off its zero fallbacks.
    let bus = Arc::new(EventBus::new(64));
    let mut events = bus.subscribe();
    let hub = IntegrationHub::new(
        OrchestratorConfig::default().with_pacing_delay_ms(0),
        Arc::clone(&bus),
    );

    hub.register_platform(github_adapter(
        vec![Connection::new("c1", "Acme Corp")],
        vec![
            FakeProbe::reporting("users", &[("total_users", 42)]),
            FakeProbe::failing("billing", &["open_invoices"]),
        ],
        vec![Arc::new(LoggingJob {
            name: "sync-users",
            log: Arc::new(Mutex::new(Vec::new())),
            fail_for: None,
        })],
    ))
    .await
    .unwrap();

    let overview = hub.platform_overview("github").await.unwrap();

    assert_eq!(overview.snapshot.value("total_users"), Some(&json!(42)));
    assert_eq!(overview.snapshot.value("open_invoices"), Some(&json!(0)));
    assert_eq!(
        overview.snapshot.get("open_invoices").map(|e| e.provenance),
        Some(Provenance::Fallback)
    );
    assert_eq!(overview.statuses["users"], ServiceStatus::Active);
    assert_eq!(overview.statuses["billing-area"], ServiceStatus::Available);

    let mut saw_probe_failure = false;
    while let Ok(event) = events.try_recv() {
        if let ConsoleEvent::Stats(StatsEvent::ProbeFailed { probe, .. }) = event {
            assert_eq!(probe, "billing");
            saw_probe_failure = true;
        }
    }
    assert!(saw_probe_failure);
}

#[tokio::test]
async fn test_overview_without_connections_is_setup_required_everywhere() {
    let hub = hub_with_pacing(0);
    hub.register_platform(github_adapter(
        vec![],
        vec![FakeProbe::reporting("users", &[("total_users", 42)])],
        vec![Arc::new(LoggingJob {
            name: "sync-users",
            log: Arc::new(Mutex::new(Vec::new())),
            fail_for: None,
        })],
    ))
    .await
    .unwrap();

    let overview = hub.platform_overview("github").await.unwrap();
    for status in overview.statuses.values() {
        assert_eq!(*status, ServiceStatus::SetupRequired);
    }
}

// ============================================================================
// Sync flow
// ============================================================================

#[tokio::test]
async fn test_full_sync_pass_with_partial_failure() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let hub = hub_with_pacing(0);

    hub.register_platform(github_adapter(
        vec![
            Connection::new("c1", "Acme Corp"),
            Connection::new("c2", "Globex").with_active(false),
            Connection::new("c3", "Initech"),
        ],
        vec![FakeProbe::reporting("users", &[("total_users", 42)])],
        vec![
            Arc::new(LoggingJob {
                name: "sync-users",
                log: Arc::clone(&log),
                fail_for: Some("c3"),
            }),
            Arc::new(LoggingJob {
                name: "sync-teams",
                log: Arc::clone(&log),
                fail_for: None,
            }),
        ],
    ))
    .await
    .unwrap();

    let outcome = hub.sync_platform("github").await.unwrap();

    // Inactive c2 excluded; c3's failure did not stop its second job.
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "c1.sync-users",
            "c1.sync-teams",
            "c3.sync-users",
            "c3.sync-teams",
        ]
    );
    assert_eq!(outcome.jobs_attempted(), 4);
    assert_eq!(outcome.jobs_succeeded(), 3);
    assert_eq!(outcome.jobs_failed(), 1);
    assert!(!outcome.is_fully_successful());

    // Both connections still had at least one success.
    assert_eq!(outcome.synced_connection_ids().len(), 2);
}

#[tokio::test]
async fn test_sync_emits_lifecycle_events() {
    let bus = Arc::new(EventBus::new(64));
    let mut events = bus.subscribe();
    let hub = IntegrationHub::new(
        OrchestratorConfig::default().with_pacing_delay_ms(0),
        Arc::clone(&bus),
    );

    let log = Arc::new(Mutex::new(Vec::new()));
    hub.register_platform(github_adapter(
        vec![Connection::new("c1", "Acme Corp")],
        vec![FakeProbe::reporting("users", &[("total_users", 42)])],
        vec![Arc::new(LoggingJob {
            name: "sync-users",
            log: Arc::clone(&log),
            fail_for: None,
        })],
    ))
    .await
    .unwrap();

    hub.sync_platform("github").await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ConsoleEvent::Sync(sync_event) = event {
            kinds.push(match sync_event {
                SyncEvent::Started { .. } => "started",
                SyncEvent::ConnectionStarted { .. } => "connection",
                SyncEvent::Completed { .. } => "completed",
                SyncEvent::JobFailed { .. } => "job-failed",
                SyncEvent::NothingToSync { .. } => "nothing",
                SyncEvent::Failed { .. } => "failed",
            });
        }
    }
    assert_eq!(kinds, vec!["started", "connection", "completed"]);
}

#[tokio::test]
async fn test_sync_with_no_active_connections_reports_nothing_to_sync() {
    let bus = Arc::new(EventBus::new(64));
    let mut events = bus.subscribe();
    let hub = IntegrationHub::new(
        OrchestratorConfig::default().with_pacing_delay_ms(0),
        Arc::clone(&bus),
    );

    hub.register_platform(github_adapter(
        vec![Connection::new("c1", "Acme Corp").with_active(false)],
        vec![FakeProbe::reporting("users", &[("total_users", 42)])],
        vec![Arc::new(LoggingJob {
            name: "sync-users",
            log: Arc::new(Mutex::new(Vec::new())),
            fail_for: None,
        })],
    ))
    .await
    .unwrap();

    let outcome = hub.sync_platform("github").await.unwrap();
    assert!(!outcome.has_connections());

    let mut saw_nothing = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, ConsoleEvent::Sync(SyncEvent::NothingToSync { .. })) {
            saw_nothing = true;
        }
    }
    assert!(saw_nothing);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_sync_rejected_while_first_runs() {
    struct SlowJob;

    #[async_trait]
    impl SyncJob for SlowJob {
        fn name(&self) -> &str {
            "sync-users"
        }

        async fn run(&self, _connection: &Connection) -> platform_traits::error::Result<()> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    let hub = Arc::new(hub_with_pacing(0));
    hub.register_platform(github_adapter(
        vec![Connection::new("c1", "Acme Corp")],
        vec![FakeProbe::reporting("users", &[("total_users", 42)])],
        vec![Arc::new(SlowJob)],
    ))
    .await
    .unwrap();

    let first = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move { hub.sync_platform("github").await })
    };

    // Let the first run acquire the guard before contending.
    tokio::task::yield_now().await;
    assert!(hub.is_sync_active("github").await);

    let err = hub.sync_platform("github").await.unwrap_err();
    assert!(matches!(err, SyncError::SyncInProgress { .. }));

    first.await.unwrap().unwrap();
    assert!(!hub.is_sync_active("github").await);
}

#[tokio::test(start_paused = true)]
async fn test_sync_paces_between_connections() {
    struct StampJob {
        stamps: Arc<Mutex<Vec<tokio::time::Instant>>>,
    }

    #[async_trait]
    impl SyncJob for StampJob {
        fn name(&self) -> &str {
            "sync-users"
        }

        async fn run(&self, _connection: &Connection) -> platform_traits::error::Result<()> {
            self.stamps.lock().unwrap().push(tokio::time::Instant::now());
            Ok(())
        }
    }

    let stamps: Arc<Mutex<Vec<tokio::time::Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let hub = hub_with_pacing(1000);
    hub.register_platform(github_adapter(
        vec![Connection::new("c1", "Acme Corp"), Connection::new("c2", "Globex")],
        vec![FakeProbe::reporting("users", &[("total_users", 42)])],
        vec![Arc::new(StampJob {
            stamps: Arc::clone(&stamps),
        })],
    ))
    .await
    .unwrap();

    hub.sync_platform("github").await.unwrap();

    let stamps = stamps.lock().unwrap();
    assert_eq!(stamps.len(), 2);
    assert!(stamps[1] - stamps[0] >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_two_platforms_sync_independently() {
    let hub = hub_with_pacing(0);
    let log = Arc::new(Mutex::new(Vec::new()));

    for key in ["github", "slack"] {
        hub.register_platform(PlatformAdapter {
            key: key.to_string(),
            display_name: key.to_string(),
            connection_source: Arc::new(FixedSource {
                connections: vec![Connection::new(format!("{key}-c1"), "One")],
            }),
            probes: vec![FakeProbe::reporting("users", &[("total_users", 1)])],
            jobs: vec![Arc::new(LoggingJob {
                name: "sync-users",
                log: Arc::clone(&log),
                fail_for: None,
            })],
            areas: vec![ServiceArea::new("users", ["total_users"])],
        })
        .await
        .unwrap();
    }

    assert_eq!(hub.platform_keys().await, vec!["github", "slack"]);

    let github = hub.sync_platform("github").await.unwrap();
    let slack = hub.sync_platform("slack").await.unwrap();
    assert!(github.is_fully_successful());
    assert!(slack.is_fully_successful());
    assert_ne!(github.run_id, slack.run_id);
}
