//! Connection Source Abstraction
//!
//! Supplies the stored connections for one platform. Backed by the console's
//! persistence layer in production and by in-memory fixtures in tests.

use async_trait::async_trait;

use crate::connection::Connection;
use crate::error::Result;

/// Read access to the stored connections of one platform.
///
/// Returns every connection, active and inactive; callers filter by
/// `is_active` before aggregation or sync.
///
/// # Example
///
/// ```ignore
/// use platform_traits::{filter_active, ConnectionSource};
///
/// async fn active_connections(source: &dyn ConnectionSource) -> platform_traits::error::Result<usize> {
///     let all = source.list().await?;
///     Ok(platform_traits::connection::filter_active(all).len())
/// }
/// ```
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// List all connections stored for this platform.
    async fn list(&self) -> Result<Vec<Connection>>;
}
