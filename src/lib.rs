//! docstream - client for paginated, concurrent access to a JSON document API
//!
//! docstream turns a remote document API into typed collections with two
//! engines underneath:
//!
//! - a lazy cursor that walks server-paginated `find` results one page at a
//!   time (and a client-side `distinct` built on it)
//! - a batch executor that splits `insert_many` into server-sized chunks and
//!   runs them on a bounded worker pool, returning ids in input order
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use docstream::{Collection, FindOptions, InsertManyOptions};
//!
//! // `runner` implements `CommandRunner` (HTTP transport, auth, retries)
//! let users: Collection<User> = Collection::new("users", Arc::new(runner));
//!
//! let result = users.insert_many(
//!     &batch,
//!     InsertManyOptions::default().with_chunk_size(50).with_concurrency(4),
//! )?;
//!
//! for user in users.find(None, FindOptions::default())? {
//!     println!("{:?}", user?);
//! }
//! ```
//!
//! # Architecture
//!
//! The network is reached only through the [`CommandRunner`] trait. Transport,
//! authentication and retry policy live behind it and are not part of this
//! crate.

// Re-export the public API from docstream-executor
pub use docstream_executor::*;

// Foundation types not already re-exported by the executor
pub use docstream_core::{
    decode, encode, ApiError, BatchConfig, CursorConfig, DocumentResponse, DocumentStatus, LimitError,
    ResponseData, Status, CONFIG_FILE_NAME,
};
