//! Server-imposed limits
//!
//! The remote API caps how many documents a single mutation command may carry
//! and how many documents a single page may hold. These limits are checked on
//! the client before any network call so that a bad option fails fast.
//!
//! ## Contract
//!
//! The defaults mirror the public API limits. Deployments with different
//! ceilings override them through [`ClientConfig`](crate::ClientConfig).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Error;

/// Default maximum number of documents per insert command.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 100;

/// Default number of documents the server returns per page.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 20;

/// Default ceiling on concurrent chunk workers.
pub const DEFAULT_MAX_CONCURRENCY: usize = 64;

/// Server-side ceilings enforced on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum documents per mutation command (default: 100)
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Maximum documents per returned page (default: 20)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Maximum concurrent chunk workers (default: 64)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_chunk_size: 10,
            max_page_size: 2,
            max_concurrency: 4,
        }
    }

    /// Validate a requested chunk size.
    pub fn validate_chunk_size(&self, chunk_size: usize) -> Result<(), LimitError> {
        if chunk_size == 0 {
            return Err(LimitError::ZeroChunkSize);
        }
        if chunk_size > self.max_chunk_size {
            return Err(LimitError::ChunkTooLarge {
                actual: chunk_size,
                max: self.max_chunk_size,
            });
        }
        Ok(())
    }

    /// Validate a requested concurrency level.
    pub fn validate_concurrency(&self, concurrency: usize) -> Result<(), LimitError> {
        if concurrency == 0 {
            return Err(LimitError::ZeroConcurrency);
        }
        if concurrency > self.max_concurrency {
            return Err(LimitError::ConcurrencyTooHigh {
                actual: concurrency,
                max: self.max_concurrency,
            });
        }
        Ok(())
    }
}

/// Limit violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Chunk size above the server maximum
    #[error("chunk size {actual} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Requested chunk size
        actual: usize,
        /// Server maximum
        max: usize,
    },

    /// Chunk size of zero
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,

    /// Concurrency above the configured maximum
    #[error("concurrency {actual} exceeds maximum {max}")]
    ConcurrencyTooHigh {
        /// Requested concurrency
        actual: usize,
        /// Configured maximum
        max: usize,
    },

    /// Concurrency of zero
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

impl From<LimitError> for Error {
    fn from(e: LimitError) -> Self {
        match e {
            LimitError::ChunkTooLarge { actual, max } => Error::ChunkSizeExceeded {
                requested: actual,
                max,
            },
            other => Error::invalid_argument(other.to_string()),
        }
    }
}
