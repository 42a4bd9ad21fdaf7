//! Error types for the pricing snapshot store.

use cloud_pricing_core::{ProviderId, ValidationError};
use thiserror::Error;

use crate::source::SourceError;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while storing, loading or refreshing snapshots.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid table for provider {provider}: {source}")]
    Invalid {
        provider: ProviderId,
        #[source]
        source: ValidationError,
    },
}
