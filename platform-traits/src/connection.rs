//! Connection Records
//!
//! A connection is one authenticated link to an external platform instance:
//! an account, workspace, domain, or organization. Connections are created
//! and destroyed by the console's connection wizard; the orchestration core
//! only ever reads them.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a connection, unique within one platform.
///
/// Platforms supply their own identifier formats (numeric account IDs,
/// workspace slugs, domain names), so this is a thin string wrapper rather
/// than a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One stored connection to an external platform instance.
///
/// Inactive connections never appear in an aggregation or sync batch; the
/// caller filters by [`is_active`](Connection::is_active) before handing a
/// list to the orchestrator. `last_sync_at` is updated by the caller after
/// interpreting a sync outcome, never by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Platform-scoped identifier.
    pub id: ConnectionId,
    /// Human-readable name shown in the console.
    pub display_name: String,
    /// Optional scope attribute (e.g., an organization vs. personal account).
    /// Jobs may decline to run for connections outside their scope.
    pub scope: Option<String>,
    /// Whether this connection participates in aggregation and sync.
    pub is_active: bool,
    /// Unix timestamp of the last successful sync job, if any.
    pub last_sync_at: Option<i64>,
}

impl Connection {
    /// Create an active connection with no sync history.
    pub fn new(id: impl Into<ConnectionId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            scope: None,
            is_active: true,
            last_sync_at: None,
        }
    }

    /// Set the scope attribute.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Mark the connection active or inactive.
    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }
}

/// Retain only the connections eligible for aggregation and sync.
pub fn filter_active(connections: Vec<Connection>) -> Vec<Connection> {
    connections.into_iter().filter(|c| c.is_active).collect()
}
