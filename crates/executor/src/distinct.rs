//! Client-side distinct over paged `find` results.
//!
//! There is no server-side distinct primitive: the extractor walks every page
//! of a projected `find`, pulls the field value out of each document and emits
//! only values it has not emitted before. Exhaustion of the underlying cursor
//! is the only termination signal, so a page whose values were all seen before
//! simply yields nothing and the walk continues.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::marker::PhantomData;

use docstream_core::{decode_value, Document, Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cursor::{CursorState, FindCursor};

/// Values already emitted by one extractor.
///
/// Grows monotonically for the life of the extractor. Identity is canonical
/// JSON equality, so `1` and `1.0` are different values.
#[derive(Debug, Default, Clone)]
pub struct DistinctValueSet {
    seen: HashSet<String>,
}

impl DistinctValueSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; true if it was not seen before.
    pub fn insert(&mut self, value: &Value) -> bool {
        self.seen.insert(canonical_key(value))
    }

    /// True if the value was already recorded.
    pub fn contains(&self, value: &Value) -> bool {
        self.seen.contains(&canonical_key(value))
    }

    /// Number of distinct values seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True if nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// Object keys are sorted so equal objects map to the same key regardless of
// field order.
fn canonical_key(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Cursor over the distinct values of one field.
pub struct DistinctCursor<F> {
    inner: FindCursor<Document>,
    field: String,
    seen: DistinctValueSet,
    pending: VecDeque<Value>,
    items_yielded: u64,
    _marker: PhantomData<fn() -> F>,
}

impl<F> DistinctCursor<F> {
    /// Wrap a document cursor. The cursor's query should project `field`.
    pub fn new(inner: FindCursor<Document>, field: impl Into<String>) -> Self {
        DistinctCursor {
            inner,
            field: field.into(),
            seen: DistinctValueSet::new(),
            pending: VecDeque::new(),
            items_yielded: 0,
            _marker: PhantomData,
        }
    }

    /// The field whose values are extracted.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Lifecycle state; `Active` while extracted values are still pending.
    pub fn state(&self) -> CursorState {
        if self.pending.is_empty() {
            self.inner.state()
        } else {
            CursorState::Active
        }
    }

    /// Values seen so far.
    pub fn seen(&self) -> &DistinctValueSet {
        &self.seen
    }

    /// Number of values handed out so far.
    pub fn items_yielded(&self) -> u64 {
        self.items_yielded
    }

    /// Close the extractor and its underlying cursor.
    pub fn close(&mut self) {
        self.pending.clear();
        self.inner.close();
    }

    /// True if another new value exists.
    ///
    /// Pulls documents until a new value is found or the underlying cursor is
    /// exhausted. A `false` answer closes the extractor.
    pub fn has_next(&mut self) -> Result<bool> {
        loop {
            if !self.pending.is_empty() {
                return Ok(true);
            }
            if !self.inner.has_next()? {
                return Ok(false);
            }
            match self.inner.next_document() {
                Ok(doc) => self.collect(&doc),
                Err(Error::CursorExhausted) => {
                    // Token pointed at an empty terminal page.
                    self.inner.close();
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn next_value(&mut self) -> Result<Value> {
        loop {
            if let Some(value) = self.pending.pop_front() {
                self.items_yielded += 1;
                return Ok(value);
            }
            let doc = self.inner.next_document()?;
            self.collect(&doc);
        }
    }

    fn collect(&mut self, doc: &Document) {
        let mut segments = self.field.split('.');
        let root = match segments.next().and_then(|first| doc.get(first)) {
            Some(root) => root,
            None => return,
        };
        let rest: Vec<&str> = segments.collect();

        let mut found = Vec::new();
        values_at(root, &rest, &mut found);
        for value in found {
            if self.seen.insert(value) {
                self.pending.push_back(value.clone());
            }
        }
    }
}

/// Candidate values at `path` below `value`.
///
/// A numeric segment indexes into an array; any other segment meeting an array
/// is applied to every element. An array at the end of the path contributes
/// its elements.
fn values_at<'a>(value: &'a Value, path: &[&str], out: &mut Vec<&'a Value>) {
    let (segment, rest) = match path.split_first() {
        Some(split) => split,
        None => {
            match value {
                Value::Array(items) => out.extend(items.iter()),
                other => out.push(other),
            }
            return;
        }
    };
    match value {
        Value::Object(map) => {
            if let Some(child) = map.get(*segment) {
                values_at(child, rest, out);
            }
        }
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => {
                if let Some(child) = items.get(index) {
                    values_at(child, rest, out);
                }
            }
            Err(_) => {
                for item in items {
                    values_at(item, path, out);
                }
            }
        },
        _ => {}
    }
}

impl<F: DeserializeOwned> DistinctCursor<F> {
    /// Pull and decode the next new value.
    ///
    /// Fails with [`Error::CursorExhausted`] once the underlying cursor is
    /// exhausted and no values are pending.
    pub fn try_next(&mut self) -> Result<F> {
        decode_value(self.next_value()?)
    }

    /// Drain all distinct values.
    ///
    /// Only allowed on a fresh extractor, like [`FindCursor::to_list`].
    pub fn to_list(&mut self) -> Result<Vec<F>> {
        let state = self.state();
        if state != CursorState::NotStarted {
            return Err(Error::misuse(format!(
                "to_list requires a fresh cursor, cursor is {}",
                state
            )));
        }
        let mut values = Vec::new();
        loop {
            match self.try_next() {
                Ok(value) => values.push(value),
                Err(Error::CursorExhausted) => break,
                Err(e) => return Err(e),
            }
        }
        self.close();
        Ok(values)
    }
}

/// Fuses after a failed page fetch, like the [`FindCursor`] iterator.
impl<F: DeserializeOwned> Iterator for DistinctCursor<F> {
    type Item = Result<F>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.try_next() {
            Ok(value) => Some(Ok(value)),
            Err(Error::CursorExhausted) => None,
            Err(e @ Error::Decode { .. }) => Some(Err(e)),
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}

impl<F> fmt::Debug for DistinctCursor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistinctCursor")
            .field("field", &self.field)
            .field("seen", &self.seen.len())
            .field("pending", &self.pending.len())
            .field("inner", &self.inner)
            .finish()
    }
}
