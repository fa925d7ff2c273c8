//! Cursor iteration against a paging server.

use docstream::{Collection, CursorState, Document, FindOptions};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::{FakeServer, ServerLimits};

#[derive(Debug, Deserialize, Serialize)]
struct Item {
    n: i64,
}

#[test]
fn cursor_walks_every_page() {
    let server = FakeServer::seeded(95, 1);
    let items: Collection<Item> = Collection::new("items", server.clone());

    let mut cursor = items.find(None, FindOptions::default()).unwrap();
    assert_eq!(server.calls(), 0);

    let ns: Vec<i64> = cursor.to_list().unwrap().into_iter().map(|i| i.n).collect();
    assert_eq!(ns, (0..95).collect::<Vec<_>>());
    // 95 documents at 20 per page
    assert_eq!(server.calls(), 5);
    assert_eq!(cursor.state(), CursorState::Closed);
}

#[test]
fn cursor_respects_sort_skip_and_limit() {
    let server = FakeServer::seeded(50, 1);
    let items: Collection<Item> = Collection::new("items", server.clone());

    let options = FindOptions::default()
        .with_sort(Document::new().with("n", -1))
        .with_skip(5)
        .with_limit(30);
    let ns: Vec<i64> = items
        .find(None, options)
        .unwrap()
        .map(|i| i.unwrap().n)
        .collect();
    assert_eq!(ns, (15..45).rev().collect::<Vec<_>>());
}

#[test]
fn cursor_with_filter() {
    let server = FakeServer::seeded(60, 3);
    let items: Collection<Item> = Collection::new("items", server);
    let ns: Vec<i64> = items
        .find(Some(Document::new().with("group", 1)), FindOptions::default())
        .unwrap()
        .map(|i| i.unwrap().n)
        .collect();
    assert_eq!(ns.len(), 20);
    assert!(ns.iter().all(|n| n % 3 == 1));
}

#[test]
fn point_lookups_do_not_move_the_cursor() {
    let server = FakeServer::seeded(30, 1);
    let items: Collection<Item> = Collection::new("items", server);
    let options = FindOptions::default().with_sort(Document::new().with("n", 1));

    let mut cursor = items.find(None, options.clone()).unwrap();
    assert_eq!(cursor.try_next().unwrap().n, 0);
    assert_eq!(cursor.get_item(25).unwrap().unwrap().n, 25);
    assert_eq!(cursor.try_next().unwrap().n, 1);
    assert!(cursor.get_item(30).unwrap().is_none());
    assert_eq!(items.get_item(None, options, 12).unwrap().unwrap().n, 12);
}

#[test]
fn point_lookup_stays_inside_the_limit() {
    let server = FakeServer::seeded(30, 1);
    let items: Collection<Item> = Collection::new("items", server.clone());
    let options = FindOptions::default()
        .with_sort(Document::new().with("n", 1))
        .with_skip(4)
        .with_limit(3);

    let cursor = items.find(None, options).unwrap();
    assert_eq!(cursor.get_item(2).unwrap().unwrap().n, 6);
    assert!(cursor.get_item(3).unwrap().is_none());
    assert_eq!(server.calls(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn cursor_returns_every_document_once(count in 0i64..120, page_size in 1usize..25) {
        let server = FakeServer::with_limits(ServerLimits {
            page_size,
            ..ServerLimits::default()
        });
        let seed: Vec<Document> = (0..count).map(|i| Document::new().with("_id", i).with("n", i)).collect();
        if !seed.is_empty() {
            let items: Collection<Document> = Collection::new("items", server.clone());
            items.insert_many(&seed, items.insert_many_options()).unwrap();
        }

        let items: Collection<Item> = Collection::new("items", server);
        let ns: Vec<i64> = items
            .find(None, FindOptions::default())
            .unwrap()
            .map(|i| i.unwrap().n)
            .collect();
        prop_assert_eq!(ns, (0..count).collect::<Vec<_>>());
    }
}
