//! Error types for docstream.
//!
//! All failures surfaced by the library are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Categorized**: Validation errors are raised before any network call,
//!   collaborator errors are propagated unchanged, and cursor/batch errors
//!   belong to the engine itself
//! - **Cloneable**: A worker's error can be handed back to the caller as-is

use std::time::Duration;

/// Result type alias for docstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// docstream errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Validation | `InvalidArgument`, `EmptyBatch`, `OrderedConcurrency`, `ChunkSizeExceeded` | Bad arguments, no I/O performed |
/// | Collaborator | `CommandTimeout`, `CommandInterrupted`, `ServerRejected`, `Transport` | Raised by the command runner |
/// | Batch | `BatchTimeout`, `Interrupted`, `WorkerPanicked` | Aggregate wait failures |
/// | Cursor | `CursorExhausted`, `CursorMisuse` | Iteration lifecycle |
/// | Data | `Decode`, `Serialization`, `UnexpectedResponse`, `TooManyDocuments` | Payload conversion |
/// | Config | `Config` | Configuration loading |
/// | System | `Internal` | Thread spawn failures, invariant violations |
///
/// # Example
///
/// ```ignore
/// use docstream_core::Error;
///
/// match cursor.try_next() {
///     Ok(doc) => { /* handle document */ }
///     Err(Error::CursorExhausted) => { /* normal end of results */ }
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    // ==================== Validation Errors ====================
    /// Invalid argument or option combination
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Batch mutation called with no items
    #[error("batch must contain at least one item")]
    EmptyBatch,

    /// Ordered batches cannot be dispatched concurrently
    #[error("ordered batch requires concurrency 1, got {concurrency}")]
    OrderedConcurrency { concurrency: usize },

    /// Chunk size above the server-imposed maximum
    #[error("chunk size {requested} exceeds server maximum {max}")]
    ChunkSizeExceeded { requested: usize, max: usize },

    // ==================== Collaborator Errors ====================
    /// A single command exceeded its own timeout
    #[error("command '{command}' timed out")]
    CommandTimeout { command: String },

    /// A single command was interrupted before it completed
    #[error("command '{command}' interrupted")]
    CommandInterrupted { command: String },

    /// The server rejected the command
    #[error("server rejected command: [{code}] {message}")]
    ServerRejected {
        code: String,
        message: String,
        /// Total number of errors the server reported
        count: usize,
    },

    /// Network or protocol failure
    #[error("transport error: {reason}")]
    Transport { reason: String },

    // ==================== Batch Errors ====================
    /// The aggregate wait of a batch mutation exceeded its deadline
    #[error("batch timed out after {timeout:?} with {completed} of {total} chunks complete")]
    BatchTimeout {
        timeout: Duration,
        completed: usize,
        total: usize,
    },

    /// The wait for a batch mutation was interrupted
    #[error("batch interrupted with {completed} of {total} chunks complete")]
    Interrupted { completed: usize, total: usize },

    /// A chunk worker panicked
    #[error("worker panicked while processing chunk {chunk}")]
    WorkerPanicked { chunk: usize },

    // ==================== Cursor Errors ====================
    /// No more items; a normal termination signal, not an operational failure
    #[error("cursor exhausted")]
    CursorExhausted,

    /// Cursor used outside its single-pass contract
    #[error("cursor misuse: {reason}")]
    CursorMisuse { reason: String },

    // ==================== Data Errors ====================
    /// A document could not be decoded into the requested type
    #[error("decode error: {reason}")]
    Decode { reason: String },

    /// A value could not be serialized into a document
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// The response is missing a field the command must return
    #[error("unexpected response: {reason}")]
    UnexpectedResponse { reason: String },

    /// A count exceeded the caller's upper bound or the server ceiling
    #[error("too many documents to count: more than {upper_bound}")]
    TooManyDocuments { upper_bound: u64 },

    // ==================== Config Errors ====================
    /// Configuration could not be read, parsed or validated
    #[error("config error: {reason}")]
    Config { reason: String },

    // ==================== System Errors ====================
    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::CursorMisuse`].
    pub fn misuse(reason: impl Into<String>) -> Self {
        Error::CursorMisuse {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::UnexpectedResponse`].
    pub fn unexpected_response(reason: impl Into<String>) -> Self {
        Error::UnexpectedResponse {
            reason: reason.into(),
        }
    }

    /// True for errors raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument { .. }
                | Error::EmptyBatch
                | Error::OrderedConcurrency { .. }
                | Error::ChunkSizeExceeded { .. }
        )
    }

    /// True for the cursor's normal end-of-results signal.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::CursorExhausted)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}
