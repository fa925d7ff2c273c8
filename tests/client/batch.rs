//! Chunked `insert_many` against the fake server.

use std::time::Duration;

use docstream::{Collection, Error, InsertManyOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::FakeServer;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "_id")]
    id: i64,
    label: String,
}

fn rows(range: std::ops::Range<i64>) -> Vec<Row> {
    range
        .map(|id| Row {
            id,
            label: format!("row-{}", id),
        })
        .collect()
}

#[test]
fn concurrent_insert_returns_ids_in_input_order() {
    let server = FakeServer::new();
    let coll: Collection<Row> = Collection::new("rows", server.clone());

    let result = coll
        .insert_many(
            &rows(0..237),
            InsertManyOptions::default()
                .with_chunk_size(20)
                .with_concurrency(6)
                .with_timeout(Duration::from_secs(10)),
        )
        .unwrap();

    let expected: Vec<Value> = (0..237).map(Value::from).collect();
    assert_eq!(result.inserted_ids, expected);
    assert_eq!(result.chunks, 12);
    assert_eq!(server.calls(), 12);
    assert_eq!(server.len(), 237);
}

#[test]
fn ordered_insert_stops_at_duplicate() {
    let server = FakeServer::new();
    let coll: Collection<Row> = Collection::new("rows", server.clone());
    coll.insert_many(&rows(15..16), InsertManyOptions::default())
        .unwrap();

    let err = coll
        .insert_many(
            &rows(0..23),
            InsertManyOptions::default()
                .with_chunk_size(10)
                .with_ordered(true),
        )
        .unwrap_err();

    match err {
        Error::ServerRejected { code, .. } => assert_eq!(code, "DOCUMENT_ALREADY_EXISTS"),
        other => panic!("expected ServerRejected, got {:?}", other),
    }
    // seed call + chunk 0 + failing chunk 1; chunk 2 never sent
    assert_eq!(server.calls(), 3);
    // seed row + chunk 0 + the five rows of chunk 1 before the duplicate
    assert_eq!(server.len(), 16);
}

#[test]
fn invalid_plan_never_reaches_server() {
    let server = FakeServer::new();
    let coll: Collection<Row> = Collection::new("rows", server.clone());

    let err = coll
        .insert_many(
            &rows(0..10),
            InsertManyOptions::default()
                .with_ordered(true)
                .with_concurrency(3),
        )
        .unwrap_err();
    assert!(err.is_validation());

    let err = coll
        .insert_many(&rows(0..10), InsertManyOptions::default().with_chunk_size(500))
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(server.calls(), 0);
    assert_eq!(server.len(), 0);
}
