//! Shared test utilities for the client suite.
//!
//! [`FakeServer`] is an in-memory document API that answers the commands the
//! client sends, with server-side paging, ceilings and duplicate detection.
//! Declared as `mod common;` in main.rs.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use docstream::{Command, CommandOptions, CommandRunner, Document, Error, Response, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Server-side ceilings of the fake.
#[derive(Debug, Clone)]
pub struct ServerLimits {
    /// Documents per `find` page
    pub page_size: usize,
    /// Highest exact count `countDocuments` returns
    pub count_ceiling: u64,
    /// Documents removed per `deleteMany` call
    pub delete_batch: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        ServerLimits {
            page_size: 20,
            count_ceiling: 1000,
            delete_batch: 20,
        }
    }
}

/// In-memory document API.
pub struct FakeServer {
    docs: Mutex<Vec<Document>>,
    limits: ServerLimits,
    calls: AtomicUsize,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Self::with_limits(ServerLimits::default())
    }

    pub fn with_limits(limits: ServerLimits) -> Arc<Self> {
        Arc::new(FakeServer {
            docs: Mutex::new(Vec::new()),
            limits,
            calls: AtomicUsize::new(0),
        })
    }

    /// Server pre-loaded with `{"_id": i, "n": i, "group": i % groups}`.
    pub fn seeded(count: i64, groups: i64) -> Arc<Self> {
        let server = Self::new();
        server.docs.lock().extend(
            (0..count).map(|i| Document::new().with("_id", i).with("n", i).with("group", i % groups)),
        );
        server
    }

    pub fn len(&self) -> usize {
        self.docs.lock().len()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn matching(&self, filter: Option<&Document>) -> Vec<Document> {
        self.docs
            .lock()
            .iter()
            .filter(|d| matches(d, filter))
            .cloned()
            .collect()
    }

    fn find(
        &self,
        filter: Option<&Document>,
        sort: Option<&Document>,
        skip: u64,
        limit: Option<u64>,
        page_state: Option<&str>,
    ) -> Response {
        let mut docs = self.matching(filter);
        if let Some(sort) = sort {
            sort_docs(&mut docs, sort);
        }
        let mut docs: Vec<Document> = docs.into_iter().skip(skip as usize).collect();
        if let Some(limit) = limit {
            docs.truncate(limit as usize);
        }

        let offset: usize = page_state.and_then(|s| s.parse().ok()).unwrap_or(0);
        let end = (offset + self.limits.page_size).min(docs.len());
        let page: Vec<Document> = docs[offset.min(end)..end].to_vec();
        let next = (end < docs.len()).then(|| end.to_string());
        response(json!({ "data": { "documents": page, "nextPageState": next } }))
    }

    fn insert_many(&self, documents: &[Document], ordered: bool) -> Response {
        let mut docs = self.docs.lock();
        let mut ids = Vec::new();
        let mut errors = Vec::new();
        for doc in documents {
            let id = doc.id().cloned().unwrap_or(Value::Null);
            if docs.iter().any(|d| d.id() == Some(&id)) {
                errors.push(json!({
                    "errorCode": "DOCUMENT_ALREADY_EXISTS",
                    "message": format!("duplicate _id {}", id),
                }));
                if ordered {
                    break;
                }
                continue;
            }
            docs.push(doc.clone());
            ids.push(id);
        }
        if errors.is_empty() {
            response(json!({ "status": { "insertedIds": ids } }))
        } else {
            response(json!({ "status": { "insertedIds": ids }, "errors": errors }))
        }
    }
}

impl CommandRunner for FakeServer {
    fn run_command(&self, command: &Command, _options: &CommandOptions) -> Result<Response> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        let resp = match command {
            Command::Find {
                filter,
                sort,
                options,
                ..
            } => {
                let options = options.clone().unwrap_or_default();
                self.find(
                    filter.as_ref(),
                    sort.as_ref(),
                    options.skip.unwrap_or(0),
                    options.limit,
                    options.page_state.as_deref(),
                )
            }
            Command::FindOne { filter, sort, .. } => {
                let mut docs = self.matching(filter.as_ref());
                if let Some(sort) = sort {
                    sort_docs(&mut docs, sort);
                }
                response(json!({ "data": { "document": docs.into_iter().next() } }))
            }
            Command::InsertOne { document } => self.insert_many(std::slice::from_ref(document), true),
            Command::InsertMany { documents, options } => {
                let ordered = options.as_ref().and_then(|o| o.ordered).unwrap_or(false);
                self.insert_many(documents, ordered)
            }
            Command::CountDocuments { filter } => {
                let count = self.matching(filter.as_ref()).len() as u64;
                if count > self.limits.count_ceiling {
                    response(json!({ "status": { "count": self.limits.count_ceiling, "moreData": true } }))
                } else {
                    response(json!({ "status": { "count": count } }))
                }
            }
            Command::EstimatedDocumentCount {} => response(json!({ "status": { "count": self.len() } })),
            Command::DeleteMany { filter } => {
                let mut docs = self.docs.lock();
                let mut deleted = 0;
                docs.retain(|d| {
                    if deleted < self.limits.delete_batch && matches(d, filter.as_ref()) {
                        deleted += 1;
                        false
                    } else {
                        true
                    }
                });
                let more = docs.iter().any(|d| matches(d, filter.as_ref()));
                response(json!({ "status": { "deletedCount": deleted, "moreData": more } }))
            }
            other => {
                return Err(Error::Transport {
                    reason: format!("fake server does not support {}", other.name()),
                })
            }
        };
        Ok(resp)
    }
}

/// Top-level equality filter.
fn matches(doc: &Document, filter: Option<&Document>) -> bool {
    filter.map_or(true, |f| {
        f.as_map().iter().all(|(k, v)| doc.get_path(k) == Some(v))
    })
}

fn sort_docs(docs: &mut [Document], sort: &Document) {
    docs.sort_by(|a, b| {
        for (field, direction) in sort.as_map() {
            let ord = compare(a.get_path(field), b.get_path(field));
            let ord = if direction.as_i64() == Some(-1) { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.map(Value::to_string).cmp(&b.map(Value::to_string)),
    }
}

pub fn response(raw: Value) -> Response {
    serde_json::from_value(raw).expect("fake response")
}
