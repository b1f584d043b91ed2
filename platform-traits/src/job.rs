//! Sync Jobs
//!
//! A sync job is one named remote mutation performed against one connection
//! during a bulk synchronization pass (e.g., "sync users", "sync channels").

use async_trait::async_trait;

use crate::connection::Connection;
use crate::error::Result;

/// An idempotent remote mutation executed per connection.
///
/// # Contract
///
/// - `name()` must be unique within one platform's job list.
/// - Jobs run sequentially in list order for each connection. Later jobs may
///   rely on data synced by earlier ones, so ordering is a convention the
///   orchestrator preserves but does not verify.
/// - `run` must be safe to call repeatedly; no distributed transaction
///   guarantees exist.
/// - A failing job is recorded in the sync outcome and never aborts the
///   remaining jobs or connections.
#[async_trait]
pub trait SyncJob: Send + Sync {
    /// Job name, unique per platform (e.g., "sync-users").
    fn name(&self) -> &str;

    /// Whether this job applies to the given connection.
    ///
    /// Jobs scoped to one connection kind (e.g., organization accounts only)
    /// return `false` for out-of-scope connections; the orchestrator records
    /// such jobs as skipped, counted as neither success nor failure.
    fn applies_to(&self, _connection: &Connection) -> bool {
        true
    }

    /// Execute the job against one connection.
    async fn run(&self, connection: &Connection) -> Result<()>;
}
