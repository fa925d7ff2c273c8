//! Scripted command runner for engine tests.

use std::sync::Arc;

use docstream_core::{Command, CommandOptions, CommandRunner, Document, Response, Result};
use parking_lot::Mutex;
use serde_json::{json, Value};

type Handler = dyn Fn(&Command, &CommandOptions) -> Result<Response> + Send + Sync;

/// Runner that records every call and answers through a closure.
pub struct MockRunner {
    handler: Box<Handler>,
    calls: Mutex<Vec<(Command, CommandOptions)>>,
}

impl MockRunner {
    pub fn new(
        handler: impl Fn(&Command, &CommandOptions) -> Result<Response> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(MockRunner {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Serves `pages` to `find`, chaining them with tokens `p1`, `p2`, ...
    pub fn paged(pages: Vec<Vec<Document>>) -> Arc<Self> {
        MockRunner::new(move |cmd, _| {
            let index = match page_token(cmd) {
                None => 0,
                Some(token) => token
                    .trim_start_matches('p')
                    .parse::<usize>()
                    .expect("mock page token"),
            };
            let next = (index + 1 < pages.len()).then(|| format!("p{}", index + 1));
            Ok(page_response(pages[index].clone(), next.as_deref()))
        })
    }

    /// Answers `insertMany` with the `_id` of each document.
    pub fn echo_inserts() -> Arc<Self> {
        MockRunner::new(|cmd, _| Ok(inserted(&inserted_documents(cmd))))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.calls.lock().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn options(&self) -> Vec<CommandOptions> {
        self.calls.lock().iter().map(|(_, o)| o.clone()).collect()
    }
}

impl CommandRunner for MockRunner {
    fn run_command(&self, command: &Command, options: &CommandOptions) -> Result<Response> {
        self.calls.lock().push((command.clone(), options.clone()));
        (self.handler)(command, options)
    }
}

/// Page token carried by a `find` command.
pub fn page_token(cmd: &Command) -> Option<String> {
    match cmd {
        Command::Find { options, .. } => options.as_ref().and_then(|o| o.page_state.clone()),
        _ => None,
    }
}

/// Documents carried by an `insertMany` command.
pub fn inserted_documents(cmd: &Command) -> Vec<Document> {
    match cmd {
        Command::InsertMany { documents, .. } => documents.clone(),
        other => panic!("expected insertMany, got {}", other.name()),
    }
}

/// `{"_id": i, "n": i}` for each i.
pub fn numbered(range: std::ops::Range<i64>) -> Vec<Document> {
    range
        .map(|i| Document::new().with("_id", i).with("n", i))
        .collect()
}

pub fn page_response(documents: Vec<Document>, next: Option<&str>) -> Response {
    response(json!({
        "data": {
            "documents": documents,
            "nextPageState": next,
        }
    }))
}

pub fn inserted(documents: &[Document]) -> Response {
    let ids: Vec<Value> = documents
        .iter()
        .map(|d| d.id().cloned().unwrap_or(Value::Null))
        .collect();
    response(json!({ "status": { "insertedIds": ids } }))
}

pub fn rejected(code: &str, message: &str) -> Response {
    response(json!({ "errors": [{ "errorCode": code, "message": message }] }))
}

pub fn response(raw: Value) -> Response {
    serde_json::from_value(raw).expect("mock response")
}
