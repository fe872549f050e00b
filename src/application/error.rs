// Application-level error types
use crate::domain::run::ConfigError;
use thiserror::Error;

/// Everything the run service can fail with. Store variants carry the
/// adapter's message verbatim; causes are not interpreted here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("an auto run is already in progress")]
    AlreadyRunning,
    #[error("store write failed: {0}")]
    StoreWrite(String),
    #[error("store delete failed: {0}")]
    StoreDelete(String),
    #[error("store access denied: {0}")]
    AuthDenied(String),
}
