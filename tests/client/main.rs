//! Client Integration Tests
//!
//! End-to-end tests of the `docstream` facade against an in-memory fake of
//! the document API:
//! - Paging - cursor iteration across server pages
//! - Distinct - client-side distinct over paged results
//! - Batch - chunked `insert_many` with concurrency and failures
//! - Commands - counts, deletes and point lookups
//! - Config - `docstream.toml` loading

mod common;

mod batch;
mod commands;
mod config;
mod distinct;
mod paging;
