//! `docstream.toml` loading and its effect on collections.

use docstream::{ClientConfig, Collection, Document, CONFIG_FILE_NAME};
use tempfile::TempDir;

use crate::common::FakeServer;

#[test]
fn default_file_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    ClientConfig::write_default_if_missing(&path).unwrap();
    let config = ClientConfig::from_file(&path).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn configured_batch_defaults_drive_insert_many() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "[batch]\nchunk_size = 7\nconcurrency = 3\n\n[limits]\nmax_chunk_size = 10\n",
    )
    .unwrap();

    let config = ClientConfig::from_file(&path).unwrap();
    let server = FakeServer::new();
    let docs: Collection<Document> =
        Collection::with_config("items", server.clone(), config).unwrap();

    let seed: Vec<Document> = (0..30).map(|i| Document::new().with("_id", i)).collect();
    let result = docs.insert_many(&seed, docs.insert_many_options()).unwrap();
    assert_eq!(result.chunks, 5);
    assert_eq!(server.calls(), 5);
}

#[test]
fn invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[batch]\nordered = true\nconcurrency = 2\n").unwrap();
    assert!(ClientConfig::from_file(&path).is_err());
}
