use thiserror::Error;

/// Errors that propagate out of the orchestration core.
///
/// Runtime failures of probes and jobs never appear here; they are isolated
/// and recorded in snapshots and outcomes. Every variant below indicates a
/// caller programming error or an invalid request, which is the only class
/// the core surfaces as a hard failure.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Duplicate probe name: {name}")]
    DuplicateProbe { name: String },

    #[error("Duplicate metric {metric} declared by probes {first} and {second}")]
    DuplicateMetric {
        metric: String,
        first: String,
        second: String,
    },

    #[error("Duplicate job name: {name}")]
    DuplicateJob { name: String },

    #[error("Job list is empty")]
    EmptyJobList,

    #[error("Platform {platform} is not registered")]
    PlatformNotRegistered { platform: String },

    #[error("Platform {platform} is already registered")]
    PlatformAlreadyRegistered { platform: String },

    #[error("Sync already in progress for platform {platform}")]
    SyncInProgress { platform: String },

    #[error("Connection source error: {0}")]
    ConnectionSource(String),

    #[error("Invalid state transition from {from} to {to}: {reason}")]
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid run status: {0}")]
    InvalidStatus(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
