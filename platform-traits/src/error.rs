use thiserror::Error;

/// Errors surfaced by platform integrations.
///
/// The orchestration core never matches on these variants; it only renders
/// the `Display` output into snapshots and outcome records. The variants
/// exist so integration crates can classify failures consistently.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited by platform: {0}")]
    RateLimited(String),

    #[error("Remote call failed: {0}")]
    Remote(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
