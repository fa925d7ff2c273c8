//! Client-side distinct against a paging server.

use docstream::{Collection, Document};

use crate::common::FakeServer;

#[test]
fn distinct_groups_across_many_pages() {
    let server = FakeServer::seeded(100, 7);
    let items: Collection<Document> = Collection::new("items", server.clone());

    let mut groups = items.distinct::<i64>("group", None).unwrap().to_list().unwrap();
    // 100 documents at 20 per page
    assert_eq!(server.calls(), 5);
    groups.sort_unstable();
    assert_eq!(groups, (0..7).collect::<Vec<_>>());
}

#[test]
fn distinct_with_filter() {
    let server = FakeServer::seeded(40, 4);
    let items: Collection<Document> = Collection::new("items", server);
    let values = items
        .distinct::<i64>("group", Some(Document::new().with("group", 2)))
        .unwrap()
        .to_list()
        .unwrap();
    assert_eq!(values, vec![2]);
}

#[test]
fn distinct_over_empty_collection() {
    let items: Collection<Document> = Collection::new("items", FakeServer::new());
    assert!(items
        .distinct::<i64>("group", None)
        .unwrap()
        .to_list()
        .unwrap()
        .is_empty());
}
