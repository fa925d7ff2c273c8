//! Page fetcher - one `find` command per page.
//!
//! The fetcher is stateless: it turns a query plus an optional page token into
//! exactly one network command and hands back the resulting [`Page`]. All
//! iteration state lives in the cursor that owns it.

use std::sync::Arc;
use std::time::Duration;

use docstream_core::{Command, CommandOptions, CommandRunner, Document, Result};
use tracing::{debug, warn};

use crate::types::FindOptions;

/// One server-returned batch of items plus its continuation token.
///
/// Immutable once constructed. `next_page_token` is `None` iff this is the
/// terminal page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    next_page_token: Option<String>,
    sort_vector: Option<Vec<f32>>,
}

impl<T> Page<T> {
    /// Build a page.
    pub fn new(items: Vec<T>, next_page_token: Option<String>, sort_vector: Option<Vec<f32>>) -> Self {
        Page {
            items,
            next_page_token,
            sort_vector,
        }
    }

    /// Items of this page, in server order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Token of the next page; `None` on the terminal page.
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    /// Query vector, when requested for a similarity search.
    pub fn sort_vector(&self) -> Option<&[f32]> {
        self.sort_vector.as_deref()
    }

    /// True if no page follows this one.
    pub fn is_terminal(&self) -> bool {
        self.next_page_token.is_none()
    }

    /// Split into `(items, next_page_token, sort_vector)`.
    pub fn into_parts(self) -> (Vec<T>, Option<String>, Option<Vec<f32>>) {
        (self.items, self.next_page_token, self.sort_vector)
    }
}

/// Filter plus options: everything that identifies one logical query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    /// Filter document; `None` matches everything
    pub filter: Option<Document>,
    /// Sort, projection, skip, limit and vector flags
    pub options: FindOptions,
}

impl FindQuery {
    /// Build a query.
    pub fn new(filter: Option<Document>, options: FindOptions) -> Self {
        FindQuery { filter, options }
    }

    /// The `find` command for one page of this query.
    pub fn to_command(&self, page_token: Option<&str>) -> Command {
        Command::Find {
            filter: self.filter.clone(),
            sort: self.options.sort.clone(),
            projection: self.options.projection.clone(),
            options: Some(
                self.options
                    .to_command_options(page_token.map(str::to_string)),
            ),
        }
    }

    /// A single-document lookup at `offset` past this query's own skip.
    ///
    /// `None` when `offset` lies beyond the query's `limit`. The combined skip
    /// follows the same rules as the query itself, so a non-zero skip on an
    /// unsorted query fails validation.
    pub fn point_lookup(&self, offset: u64) -> Result<Option<FindQuery>> {
        if matches!(self.options.limit, Some(limit) if offset >= limit) {
            return Ok(None);
        }
        let mut options = self.options.clone();
        let base = options.skip.unwrap_or(0);
        options.skip = Some(base.saturating_add(offset)).filter(|s| *s > 0);
        options.limit = Some(1);
        options.include_sort_vector = false;
        options.validate()?;
        Ok(Some(FindQuery {
            filter: self.filter.clone(),
            options,
        }))
    }
}

/// Issues `find` commands through a [`CommandRunner`].
#[derive(Clone)]
pub struct PageFetcher {
    runner: Arc<dyn CommandRunner>,
    max_page_size: usize,
    timeout: Option<Duration>,
}

impl PageFetcher {
    /// Create a fetcher over a runner.
    pub fn new(runner: Arc<dyn CommandRunner>, max_page_size: usize) -> Self {
        PageFetcher {
            runner,
            max_page_size,
            timeout: None,
        }
    }

    /// Per-page round-trip timeout passed to the runner.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fetch one page.
    ///
    /// Exactly one network command per call. Collaborator errors are
    /// propagated unchanged; nothing is retried here.
    pub fn fetch(&self, query: &FindQuery, page_token: Option<&str>) -> Result<Page<Document>> {
        let command = query.to_command(page_token);
        let options = self
            .timeout
            .map(CommandOptions::with_timeout)
            .unwrap_or_default();

        let mut response = self.runner.run_command(&command, &options)?.check()?;
        let items = response.take_documents()?;
        let next_page_token = response.next_page_state().filter(|t| !t.is_empty());
        let sort_vector = response.status.and_then(|s| s.sort_vector);

        if items.len() > self.max_page_size {
            warn!(
                items = items.len(),
                max_page_size = self.max_page_size,
                "page larger than the server page size"
            );
        }
        debug!(
            items = items.len(),
            continued = page_token.is_some(),
            has_next = next_page_token.is_some(),
            "fetched page"
        );

        Ok(Page::new(items, next_page_token, sort_vector))
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("max_page_size", &self.max_page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}
