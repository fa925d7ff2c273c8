//! Single-command operations against the fake server.

use docstream::{Collection, Document, Error, FindOptions};
use serde::{Deserialize, Serialize};

use crate::common::{FakeServer, ServerLimits};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct Item {
    n: i64,
    group: i64,
}

#[test]
fn count_documents_within_and_beyond_bounds() {
    let server = FakeServer::seeded(150, 3);
    let items: Collection<Item> = Collection::new("items", server);

    assert_eq!(items.count_documents(None, 1000).unwrap(), 150);
    assert_eq!(
        items
            .count_documents(Some(Document::new().with("group", 0)), 100)
            .unwrap(),
        50
    );
    assert_eq!(
        items.count_documents(None, 100).unwrap_err(),
        Error::TooManyDocuments { upper_bound: 100 }
    );
}

#[test]
fn count_documents_above_server_ceiling() {
    let server = FakeServer::with_limits(ServerLimits {
        count_ceiling: 10,
        ..ServerLimits::default()
    });
    let seed: Vec<Document> = (0..25).map(|i| Document::new().with("_id", i)).collect();
    let docs: Collection<Document> = Collection::new("items", server);
    docs.insert_many(&seed, docs.insert_many_options()).unwrap();

    assert_eq!(
        docs.count_documents(None, 1000).unwrap_err(),
        Error::TooManyDocuments { upper_bound: 1000 }
    );
    assert_eq!(docs.estimated_document_count().unwrap(), 25);
}

#[test]
fn delete_many_drains_across_server_batches() {
    let server = FakeServer::seeded(90, 2);
    let items: Collection<Item> = Collection::new("items", server.clone());

    let result = items
        .delete_many(Some(Document::new().with("group", 1)))
        .unwrap();
    assert_eq!(result.deleted_count, 45);
    // 45 matches at 20 per call
    assert_eq!(server.calls(), 3);
    assert_eq!(server.len(), 45);
}

#[test]
fn find_one_with_sort() {
    let server = FakeServer::seeded(10, 2);
    let items: Collection<Item> = Collection::new("items", server);
    let item = items
        .find_one(
            Some(Document::new().with("group", 1)),
            FindOptions::default().with_sort(Document::new().with("n", -1)),
        )
        .unwrap();
    assert_eq!(item, Some(Item { n: 9, group: 1 }));
}
