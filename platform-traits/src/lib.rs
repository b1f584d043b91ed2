//! # Platform Integration Traits
//!
//! Contracts that every external platform integration must implement.
//!
//! ## Overview
//!
//! This crate defines the seam between the orchestration core and the
//! per-platform integration code (HTTP transport, auth, endpoint and payload
//! shapes). Each trait represents a capability the core consumes but never
//! implements itself:
//!
//! - [`ConnectionSource`](source::ConnectionSource) - supplies the stored
//!   connections for one platform
//! - [`StatProbe`](probe::StatProbe) - a named, independently-failable
//!   statistics read for one sub-resource
//! - [`SyncJob`](job::SyncJob) - an idempotent remote mutation executed
//!   against one connection during a bulk sync pass
//!
//! ## Error Handling
//!
//! All traits use the [`PlatformError`](error::PlatformError) type. The core
//! treats these errors opaquely: a failing probe is substituted with its
//! fallback values, a failing job is recorded in the sync outcome, and
//! neither propagates past the orchestration boundary.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` bounds so implementations can be shared
//! across async tasks behind `Arc`.

pub mod connection;
pub mod error;
pub mod job;
pub mod probe;
pub mod source;

pub use connection::{Connection, ConnectionId};
pub use error::PlatformError;
pub use job::SyncJob;
pub use probe::{MetricMap, StatProbe};
pub use source::ConnectionSource;
