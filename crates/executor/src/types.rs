//! Option and result types for collection operations.
//!
//! Option structs are immutable values built once per call with consuming
//! `with_*` methods; nothing here is shared or mutated across calls.

use std::time::Duration;

use docstream_core::{BatchConfig, Document, Error, FindCommandOptions, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::batch::InterruptHandle;

// =============================================================================
// Find
// =============================================================================

/// Options of a `find` query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Sort specification, e.g. `{"age": -1}` or `{"$vector": [...]}`
    pub sort: Option<Document>,
    /// Projection, e.g. `{"name": 1}`
    pub projection: Option<Document>,
    /// Matching documents to skip
    pub skip: Option<u64>,
    /// Maximum documents to return across all pages
    pub limit: Option<u64>,
    /// Return `$similarity` with each document
    pub include_similarity: bool,
    /// Return the query vector with the first page
    pub include_sort_vector: bool,
}

impl FindOptions {
    /// Set the sort specification.
    pub fn with_sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the projection.
    pub fn with_projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Skip the first `skip` matching documents.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Cap the number of returned documents.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Request `$similarity` scores.
    pub fn with_similarity(mut self) -> Self {
        self.include_similarity = true;
        self
    }

    /// Request the sort vector.
    pub fn with_sort_vector(mut self) -> Self {
        self.include_sort_vector = true;
        self
    }

    /// Reject combinations the server would refuse.
    pub fn validate(&self) -> Result<()> {
        if self.skip.is_some() && self.sort.is_none() {
            return Err(Error::invalid_argument("skip requires a sort"));
        }
        if self.limit == Some(0) {
            return Err(Error::invalid_argument("limit must be positive"));
        }
        Ok(())
    }

    pub(crate) fn to_command_options(&self, page_state: Option<String>) -> FindCommandOptions {
        FindCommandOptions {
            skip: self.skip,
            limit: self.limit,
            page_state,
            include_similarity: self.include_similarity.then_some(true),
            include_sort_vector: self.include_sort_vector.then_some(true),
        }
    }
}

// =============================================================================
// Insert
// =============================================================================

/// Options of an `insert_many` call.
#[derive(Debug, Clone)]
pub struct InsertManyOptions {
    /// Documents per chunk
    pub chunk_size: usize,
    /// Concurrent chunk workers
    pub concurrency: usize,
    /// Stop at the first failing chunk; requires `concurrency == 1`
    pub ordered: bool,
    /// Deadline for the whole call
    pub timeout: Duration,
    /// Ask the server for a status per document
    pub return_document_responses: bool,
    /// Token that aborts the wait when triggered from another thread
    pub interrupt: Option<InterruptHandle>,
}

impl Default for InsertManyOptions {
    fn default() -> Self {
        Self::from_config(&BatchConfig::default())
    }
}

impl InsertManyOptions {
    /// Options seeded from configured defaults.
    pub fn from_config(config: &BatchConfig) -> Self {
        InsertManyOptions {
            chunk_size: config.chunk_size,
            concurrency: config.concurrency,
            ordered: config.ordered,
            timeout: config.timeout(),
            return_document_responses: config.return_document_responses,
            interrupt: None,
        }
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of concurrent workers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set ordered mode.
    pub fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Set the overall deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request per-document responses.
    pub fn with_document_responses(mut self) -> Self {
        self.return_document_responses = true;
        self
    }

    /// Attach an interrupt token.
    pub fn with_interrupt(mut self, interrupt: InterruptHandle) -> Self {
        self.interrupt = Some(interrupt);
        self
    }
}

/// Result of `insert_one`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOneResult {
    /// Identifier of the inserted document
    pub inserted_id: Value,
}

// =============================================================================
// Update / Delete
// =============================================================================

/// Options of `update_one` / `update_many`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert a document when nothing matches
    pub upsert: bool,
}

impl UpdateOptions {
    /// Enable upsert.
    pub fn with_upsert(mut self) -> Self {
        self.upsert = true;
        self
    }
}

/// Result of an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Documents matched by the filter
    pub matched_count: u64,
    /// Documents actually changed
    pub modified_count: u64,
    /// Identifier of the upserted document, if one was created
    pub upserted_id: Option<Value>,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Documents removed
    pub deleted_count: u64,
}
