//! Typed collection facade.
//!
//! [`Collection<T>`] is what application code holds. It owns a shared
//! [`CommandRunner`] and the client configuration, and exposes the cursor,
//! distinct, batch and single-command operations over documents decoded as `T`.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use docstream_core::{decode, encode, ClientConfig, CommandRunner, Document, Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::batch::{BatchExecutor, BatchPlan, InsertManyResult};
use crate::cursor::FindCursor;
use crate::distinct::DistinctCursor;
use crate::fetcher::{FindQuery, PageFetcher};
use crate::handlers;
use crate::types::{
    DeleteResult, FindOptions, InsertManyOptions, InsertOneResult, UpdateOptions, UpdateResult,
};

/// A named collection of documents of type `T`.
///
/// Cheap to clone; clones share the runner.
pub struct Collection<T> {
    name: String,
    runner: Arc<dyn CommandRunner>,
    config: ClientConfig,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Collection<T> {
    /// Collection with default configuration.
    pub fn new(name: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Collection {
            name: name.into(),
            runner,
            config: ClientConfig::default(),
            _marker: PhantomData,
        }
    }

    /// Collection with explicit configuration, validated up front.
    pub fn with_config(
        name: impl Into<String>,
        runner: Arc<dyn CommandRunner>,
        config: ClientConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Collection {
            name: name.into(),
            runner,
            config,
            _marker: PhantomData,
        })
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration in effect.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Batch options seeded from this collection's configuration.
    pub fn insert_many_options(&self) -> InsertManyOptions {
        InsertManyOptions::from_config(&self.config.batch)
    }

    fn fetcher(&self) -> PageFetcher {
        let fetcher = PageFetcher::new(Arc::clone(&self.runner), self.config.limits.max_page_size);
        match self.config.cursor.page_timeout() {
            Some(timeout) => fetcher.with_timeout(timeout),
            None => fetcher,
        }
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Lazy cursor over matching documents.
    ///
    /// Options are validated here; no network call happens until the cursor
    /// is first pulled.
    pub fn find(&self, filter: Option<Document>, options: FindOptions) -> Result<FindCursor<T>> {
        options.validate()?;
        Ok(FindCursor::new(
            self.fetcher(),
            FindQuery::new(filter, options),
        ))
    }

    /// Lazy cursor over the distinct values of `field` among matching
    /// documents.
    ///
    /// `field` may be a dotted path. Array values are flattened.
    pub fn distinct<F>(&self, field: &str, filter: Option<Document>) -> Result<DistinctCursor<F>> {
        if field.is_empty() {
            return Err(Error::invalid_argument("distinct field must not be empty"));
        }
        let options = FindOptions::default().with_projection(Document::new().with(field, 1));
        let inner = FindCursor::new(self.fetcher(), FindQuery::new(filter, options));
        Ok(DistinctCursor::new(inner, field))
    }

    /// Count matching documents, failing above `upper_bound`.
    pub fn count_documents(&self, filter: Option<Document>, upper_bound: u64) -> Result<u64> {
        handlers::count::count_documents(&*self.runner, filter, upper_bound)
    }

    /// Approximate number of documents in the collection.
    pub fn estimated_document_count(&self) -> Result<u64> {
        handlers::count::estimated_document_count(&*self.runner)
    }

    // =========================================================================
    // Update / Delete
    // =========================================================================

    /// Update the first matching document.
    pub fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<UpdateResult> {
        handlers::update::update_one(&*self.runner, filter, update, &options)
    }

    /// Update every matching document.
    pub fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<UpdateResult> {
        handlers::update::update_many(&*self.runner, filter, update, &options)
    }

    /// Delete the first matching document.
    pub fn delete_one(&self, filter: Option<Document>) -> Result<DeleteResult> {
        handlers::delete::delete_one(&*self.runner, filter)
    }

    /// Delete every matching document.
    pub fn delete_many(&self, filter: Option<Document>) -> Result<DeleteResult> {
        handlers::delete::delete_many(&*self.runner, filter)
    }
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    /// First matching document.
    pub fn find_one(&self, filter: Option<Document>, options: FindOptions) -> Result<Option<T>> {
        handlers::find::find_one(&*self.runner, filter, &options)?
            .map(decode)
            .transpose()
    }

    /// Matching document at `offset` of the query's order.
    pub fn get_item(
        &self,
        filter: Option<Document>,
        options: FindOptions,
        offset: u64,
    ) -> Result<Option<T>> {
        self.find(filter, options)?.get_item(offset)
    }

    /// Insert one document.
    pub fn insert_one(&self, item: &T) -> Result<InsertOneResult> {
        handlers::insert::insert_one(&*self.runner, encode(item)?)
    }

    /// Insert a batch of documents in chunks, possibly concurrently.
    ///
    /// Blocks until every chunk finished or the batch failed. Identifiers are
    /// returned in input order. On failure no partial result is returned,
    /// though chunks that already succeeded stay written.
    ///
    /// # Errors
    ///
    /// Validation errors ([`Error::EmptyBatch`], [`Error::OrderedConcurrency`],
    /// [`Error::ChunkSizeExceeded`]) are raised before any network call.
    pub fn insert_many(&self, items: &[T], options: InsertManyOptions) -> Result<InsertManyResult> {
        let plan = BatchPlan::from_options(items.len(), &options, &self.config.limits)?;
        let documents = items.iter().map(encode).collect::<Result<Vec<Document>>>()?;

        debug!(
            collection = %self.name,
            documents = documents.len(),
            "insert_many"
        );

        let runner = Arc::clone(&self.runner);
        let ordered = options.ordered;
        let return_document_responses = options.return_document_responses;
        BatchExecutor::new(plan).execute(
            documents,
            move |chunk| {
                handlers::insert::insert_chunk(&*runner, chunk, ordered, return_document_responses)
            },
            options.interrupt.as_ref(),
        )
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            name: self.name.clone(),
            runner: Arc::clone(&self.runner),
            config: self.config.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}
