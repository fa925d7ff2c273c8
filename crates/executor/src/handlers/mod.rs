//! Command handlers organized by operation category.
//!
//! Each handler builds one [`Command`](docstream_core::Command), sends it
//! through a [`CommandRunner`](docstream_core::CommandRunner) and turns the
//! response into a typed result:
//!
//! | Module | Commands |
//! |--------|----------|
//! | `find` | `findOne` |
//! | `insert` | `insertOne`, `insertMany` (one chunk) |
//! | `update` | `updateOne`, `updateMany` |
//! | `delete` | `deleteOne`, `deleteMany` |
//! | `count` | `countDocuments`, `estimatedDocumentCount` |
//!
//! Paged `find` lives in the fetcher and cursor instead.

pub mod count;
pub mod delete;
pub mod find;
pub mod insert;
pub mod update;
