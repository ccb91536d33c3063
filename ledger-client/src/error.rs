//! Error types for the cluster client

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client errors
#[derive(Error, Debug)]
pub enum Error {
    /// Connection to the cluster failed or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query could not be served
    #[error("Query error: {0}")]
    Query(String),

    /// A create call could not be submitted
    #[error("Create error: {0}")]
    Create(String),

    /// The batch exceeds the per-call record limit
    #[error("Batch too large: {len} records (limit {limit})")]
    BatchTooLarge {
        /// Number of records submitted
        len: usize,
        /// Per-call record limit
        limit: usize,
    },

    /// The operation is not available on this client
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}
