//! Command enum defining all operations sent to the document API.
//!
//! Commands are the "instruction set" of the remote API. Every operation the
//! library issues is represented as a variant of this enum.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Each variant serializes to the single-key JSON object the
//!   API expects, e.g. `{"find": {"filter": {...}, "options": {...}}}`
//! - **Pure data**: No closures or executable code

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// A command is a self-contained, serializable operation.
///
/// # Command Categories
///
/// | Category | Variants |
/// |----------|----------|
/// | Read | `Find`, `FindOne`, `CountDocuments`, `EstimatedDocumentCount` |
/// | Insert | `InsertOne`, `InsertMany` |
/// | Update | `UpdateOne`, `UpdateMany` |
/// | Delete | `DeleteOne`, `DeleteMany` |
///
/// # Example
///
/// ```ignore
/// use docstream_core::{Command, Document, FindCommandOptions};
///
/// let cmd = Command::Find {
///     filter: Some(Document::new().with("status", "active")),
///     sort: None,
///     projection: None,
///     options: Some(FindCommandOptions {
///         limit: Some(10),
///         ..Default::default()
///     }),
/// };
/// assert_eq!(cmd.name(), "find");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub enum Command {
    // ==================== Read ====================
    /// Fetch one page of matching documents.
    /// Returns: `data.documents`, `data.nextPageState`, optionally `status.sortVector`
    Find {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sort: Option<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        projection: Option<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<FindCommandOptions>,
    },

    /// Fetch the first matching document.
    /// Returns: `data.document`
    FindOne {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sort: Option<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        projection: Option<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<FindCommandOptions>,
    },

    /// Count matching documents, up to a server ceiling.
    /// Returns: `status.count`, `status.moreData`
    CountDocuments {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Document>,
    },

    /// Approximate collection size from server metadata.
    /// Returns: `status.count`
    EstimatedDocumentCount {},

    // ==================== Insert ====================
    /// Insert a single document.
    /// Returns: `status.insertedIds`
    InsertOne { document: Document },

    /// Insert a chunk of documents.
    /// Returns: `status.insertedIds` or `status.documentResponses`
    InsertMany {
        documents: Vec<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<InsertManyCommandOptions>,
    },

    // ==================== Update ====================
    /// Update the first matching document.
    /// Returns: `status.matchedCount`, `status.modifiedCount`, `status.upsertedId`
    UpdateOne {
        filter: Document,
        update: Document,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sort: Option<Document>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<UpdateCommandOptions>,
    },

    /// Update all matching documents, page by page.
    /// Returns: `status.matchedCount`, `status.modifiedCount`, `status.upsertedId`,
    /// `status.nextPageState`
    UpdateMany {
        filter: Document,
        update: Document,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<UpdateCommandOptions>,
    },

    // ==================== Delete ====================
    /// Delete the first matching document.
    /// Returns: `status.deletedCount`
    DeleteOne {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Document>,
    },

    /// Delete matching documents, bounded per call by the server.
    /// Returns: `status.deletedCount`, `status.moreData`
    DeleteMany {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<Document>,
    },
}

impl Command {
    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Find { .. } => "find",
            Command::FindOne { .. } => "findOne",
            Command::CountDocuments { .. } => "countDocuments",
            Command::EstimatedDocumentCount {} => "estimatedDocumentCount",
            Command::InsertOne { .. } => "insertOne",
            Command::InsertMany { .. } => "insertMany",
            Command::UpdateOne { .. } => "updateOne",
            Command::UpdateMany { .. } => "updateMany",
            Command::DeleteOne { .. } => "deleteOne",
            Command::DeleteMany { .. } => "deleteMany",
        }
    }

    /// True for commands that modify data.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::Find { .. }
                | Command::FindOne { .. }
                | Command::CountDocuments { .. }
                | Command::EstimatedDocumentCount {}
        )
    }
}

/// Protocol knobs of `find` / `findOne`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindCommandOptions {
    /// Number of matching documents to skip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    /// Maximum number of documents across all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Opaque token returned by the previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_state: Option<String>,
    /// Return `$similarity` with each document of a vector query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_similarity: Option<bool>,
    /// Return the query vector in `status.sortVector`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_sort_vector: Option<bool>,
}

/// Protocol knobs of `insertMany`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertManyCommandOptions {
    /// Stop at the first failing document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,
    /// Return a status entry for every document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_document_responses: Option<bool>,
}

/// Protocol knobs of `updateOne` / `updateMany`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommandOptions {
    /// Insert a document when nothing matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert: Option<bool>,
    /// Opaque token to continue a paged `updateMany`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_state: Option<String>,
}
