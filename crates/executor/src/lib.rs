//! # docstream executor
//!
//! Cursor and batch engine of the docstream document API client.
//!
//! This crate provides:
//! - [`Collection`] - the typed facade application code calls
//! - [`FindCursor`] - lazy, page-at-a-time iteration over `find` results
//! - [`DistinctCursor`] - client-side distinct over a projected `find`
//! - [`BatchExecutor`] - chunked, bounded-concurrency `insert_many`
//!
//! The network is reached only through a
//! [`CommandRunner`](docstream_core::CommandRunner) supplied by the caller.
//!
//! ## Quick Start
//!
//! ```text
//! use docstream_executor::{Collection, FindOptions, InsertManyOptions};
//!
//! let users: Collection<User> = Collection::new("users", runner);
//!
//! // Nothing is fetched until the cursor is pulled
//! let mut cursor = users.find(None, FindOptions::default())?;
//! while let Some(user) = cursor.next() {
//!     let user = user?;
//! }
//!
//! // Four chunks of 25 in flight at once, ids returned in input order
//! let result = users.insert_many(
//!     &new_users,
//!     InsertManyOptions::default().with_chunk_size(25).with_concurrency(4),
//! )?;
//! ```
//!
//! ## Operations
//!
//! | Operation | Network calls |
//! |-----------|---------------|
//! | `find`, `distinct` | none until iterated, then one per page |
//! | `insert_many` | one per chunk, up to `concurrency` at once |
//! | `find_one`, `insert_one`, `update_one`, `delete_one` | one |
//! | `update_many`, `delete_many` | one per server page |
//! | `count_documents`, `estimated_document_count` | one |

#![warn(missing_docs)]

mod batch;
mod collection;
mod cursor;
mod distinct;
mod fetcher;
mod handlers;
mod pool;
mod types;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API
// =============================================================================

pub use batch::{
    BatchExecutor, BatchOutcome, BatchPlan, Chunk, ChunkResult, InsertManyResult, InterruptHandle,
    BATCH_THREAD_NAME,
};
pub use collection::Collection;
pub use cursor::{CursorState, FindCursor};
pub use distinct::{DistinctCursor, DistinctValueSet};
pub use fetcher::{FindQuery, Page, PageFetcher};
pub use pool::WorkerPool;
pub use types::{
    DeleteResult, FindOptions, InsertManyOptions, InsertOneResult, UpdateOptions, UpdateResult,
};

// Foundation types callers need alongside the engine
pub use docstream_core::{
    ClientConfig, Command, CommandOptions, CommandRunner, Document, Error, Limits, Response, Result,
};
