//! Lazy cursor over server-paginated `find` results.
//!
//! A [`FindCursor`] is an explicit state machine over one held page:
//!
//! ```text
//! NotStarted --first pull--> Active --last item yielded--> Exhausted
//!      |                       |                               |
//!      +-----------------------+------- close / has_next ------+--> Closed
//! ```
//!
//! Creating a cursor performs no I/O. The first pull fetches the first page;
//! later pages are fetched synchronously when the held page runs dry, and the
//! previous page is dropped at that moment, so at most one page is ever held.
//!
//! A cursor is single-pass and single-consumer. Driving one instance from
//! several threads is a caller error; the cursor does not guard against it.

use std::fmt;
use std::marker::PhantomData;

use docstream_core::{decode, Document, Error, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::fetcher::{FindQuery, PageFetcher};

/// Lifecycle of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// Created, no page fetched yet
    NotStarted,
    /// At least one page fetched, items may remain
    Active,
    /// Last item of the terminal page yielded
    Exhausted,
    /// Page released; terminal
    Closed,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CursorState::NotStarted => "not started",
            CursorState::Active => "active",
            CursorState::Exhausted => "exhausted",
            CursorState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Cursor over the results of one `find` query.
pub struct FindCursor<T> {
    fetcher: PageFetcher,
    query: FindQuery,
    state: CursorState,
    buffer: std::vec::IntoIter<Document>,
    next_page_token: Option<String>,
    sort_vector: Option<Vec<f32>>,
    pages_fetched: u64,
    items_yielded: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FindCursor<T> {
    /// Create a cursor. No I/O happens until the first pull.
    pub fn new(fetcher: PageFetcher, query: FindQuery) -> Self {
        FindCursor {
            fetcher,
            query,
            state: CursorState::NotStarted,
            buffer: Vec::new().into_iter(),
            next_page_token: None,
            sort_vector: None,
            pages_fetched: 0,
            items_yielded: 0,
            _marker: PhantomData,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// The query this cursor iterates.
    pub fn query(&self) -> &FindQuery {
        &self.query
    }

    /// Number of items handed out so far.
    pub fn items_yielded(&self) -> u64 {
        self.items_yielded
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Unread items of the held page.
    pub fn buffered(&self) -> &[Document] {
        self.buffer.as_slice()
    }

    /// True if the held page has a continuation token.
    pub fn has_next_page(&self) -> bool {
        self.next_page_token.is_some()
    }

    /// Sort vector returned with the first page, if requested.
    pub fn sort_vector(&self) -> Option<&[f32]> {
        self.sort_vector.as_deref()
    }

    /// Close the cursor and release the held page.
    pub fn close(&mut self) {
        if self.state != CursorState::Closed {
            debug!(
                items_yielded = self.items_yielded,
                pages_fetched = self.pages_fetched,
                "cursor closed"
            );
        }
        self.state = CursorState::Closed;
        self.buffer = Vec::new().into_iter();
        self.next_page_token = None;
    }

    /// True if another item may be available.
    ///
    /// The first call fetches the first page. A `true` answer based on a
    /// continuation token does not fetch; the next page may still turn out to
    /// be empty. A `false` answer closes the cursor.
    pub fn has_next(&mut self) -> Result<bool> {
        match self.state {
            CursorState::Closed => Ok(false),
            CursorState::Exhausted => {
                self.close();
                Ok(false)
            }
            CursorState::NotStarted => {
                self.start()?;
                self.has_next()
            }
            CursorState::Active => {
                if !self.buffer.as_slice().is_empty() || self.next_page_token.is_some() {
                    Ok(true)
                } else {
                    self.state = CursorState::Exhausted;
                    self.close();
                    Ok(false)
                }
            }
        }
    }

    /// Pull the next raw document.
    ///
    /// Fails with [`Error::CursorExhausted`] once no items remain.
    pub fn next_document(&mut self) -> Result<Document> {
        match self.state {
            CursorState::Exhausted | CursorState::Closed => return Err(Error::CursorExhausted),
            CursorState::NotStarted => self.start()?,
            CursorState::Active => {}
        }

        loop {
            if let Some(doc) = self.buffer.next() {
                self.items_yielded += 1;
                if self.buffer.as_slice().is_empty() && self.next_page_token.is_none() {
                    self.state = CursorState::Exhausted;
                }
                return Ok(doc);
            }
            if self.next_page_token.is_none() {
                self.state = CursorState::Exhausted;
                return Err(Error::CursorExhausted);
            }
            // Empty intermediate pages are skipped rather than treated as the end.
            self.fetch_next_page()?;
        }
    }

    fn start(&mut self) -> Result<()> {
        let page = self.fetcher.fetch(&self.query, None)?;
        let (items, next_page_token, sort_vector) = page.into_parts();
        self.buffer = items.into_iter();
        self.next_page_token = next_page_token;
        self.sort_vector = sort_vector;
        self.pages_fetched = 1;
        self.state = CursorState::Active;
        Ok(())
    }

    /// Replace the held page. The token is only consumed on success, so a
    /// failed fetch can be retried by pulling again.
    fn fetch_next_page(&mut self) -> Result<()> {
        let page = self
            .fetcher
            .fetch(&self.query, self.next_page_token.as_deref())?;
        let (items, next_page_token, _) = page.into_parts();
        self.buffer = items.into_iter();
        self.next_page_token = next_page_token;
        self.pages_fetched += 1;
        Ok(())
    }
}

impl<T: DeserializeOwned> FindCursor<T> {
    /// Pull and decode the next item.
    ///
    /// Fails with [`Error::CursorExhausted`] once no items remain; that is the
    /// normal end of iteration, not an operational failure.
    pub fn try_next(&mut self) -> Result<T> {
        decode(self.next_document()?)
    }

    /// Drain the cursor into a list.
    ///
    /// Only allowed on a fresh cursor: a second call, or a call after any
    /// manual iteration, fails with [`Error::CursorMisuse`].
    pub fn to_list(&mut self) -> Result<Vec<T>> {
        if self.state != CursorState::NotStarted {
            return Err(Error::misuse(format!(
                "to_list requires a fresh cursor, cursor is {}",
                self.state
            )));
        }
        let mut items = Vec::new();
        loop {
            match self.try_next() {
                Ok(item) => items.push(item),
                Err(Error::CursorExhausted) => break,
                Err(e) => return Err(e),
            }
        }
        self.close();
        Ok(items)
    }

    /// The first result of the query, via a dedicated fetch.
    ///
    /// Does not touch the cursor's position or state.
    pub fn first(&self) -> Result<Option<T>> {
        self.get_item(0)
    }

    /// The result at `offset`, via a dedicated `skip = offset, limit = 1` fetch.
    ///
    /// Does not touch the cursor's position or state. An offset past the
    /// query's `limit` is `None` without a fetch; a non-zero offset on an
    /// unsorted query is rejected like `skip` without `sort`.
    pub fn get_item(&self, offset: u64) -> Result<Option<T>> {
        let lookup = match self.query.point_lookup(offset)? {
            Some(lookup) => lookup,
            None => return Ok(None),
        };
        let page = self.fetcher.fetch(&lookup, None)?;
        let (items, _, _) = page.into_parts();
        items.into_iter().next().map(decode).transpose()
    }
}

/// Yields `None` at exhaustion. A failed page fetch is yielded once and then
/// closes the cursor, so iterator adapters never re-issue the command; use
/// [`FindCursor::try_next`] to retry. Decode errors consume only their item.
impl<T: DeserializeOwned> Iterator for FindCursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_next() {
            Ok(item) => Some(Ok(item)),
            Err(Error::CursorExhausted) => None,
            Err(e @ Error::Decode { .. }) => Some(Err(e)),
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}

impl<T> fmt::Debug for FindCursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindCursor")
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .field("has_next_page", &self.next_page_token.is_some())
            .field("pages_fetched", &self.pages_fetched)
            .field("items_yielded", &self.items_yielded)
            .finish()
    }
}
