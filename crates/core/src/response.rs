//! Decoded command responses.
//!
//! Every command answers with the same envelope:
//!
//! ```text
//! {
//!   "status": { "insertedIds": [...], "matchedCount": 1, ... },
//!   "data":   { "documents": [...], "nextPageState": "..." },
//!   "errors": [ { "errorCode": "...", "message": "..." } ]
//! }
//! ```
//!
//! Which fields are populated depends on the command; accessors that a
//! command requires return [`Error::UnexpectedResponse`] when the field is missing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::error::{Error, Result};

/// Response envelope of one command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Counters and identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Returned documents and page token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    /// Errors reported by the server
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiError>,
}

/// The `status` section of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Identifiers of inserted documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_ids: Option<Vec<Value>>,
    /// Per-document outcomes when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_responses: Option<Vec<DocumentResponse>>,
    /// Documents matched by an update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_count: Option<u64>,
    /// Documents changed by an update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_count: Option<u64>,
    /// Identifier of the document created by an upsert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<Value>,
    /// Documents removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
    /// More documents remain beyond the server ceiling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_data: Option<bool>,
    /// Result of a count command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Query vector of a similarity search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_vector: Option<Vec<f32>>,
    /// Page token of a paged mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_state: Option<String>,
}

/// The `data` section of a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// One page of documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Document>>,
    /// Single document of `findOne`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    /// Token of the next page, absent on the terminal page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_state: Option<String>,
}

/// One server-reported error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    #[serde(default)]
    pub error_code: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// Outcome of one document inside an `insertMany` chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Identifier of the document
    #[serde(rename = "_id")]
    pub id: Value,
    /// Per-document status
    pub status: DocumentStatus,
    /// Index into the response's `errors` list when `status` is `Error`
    #[serde(
        rename = "errorsIdx",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_index: Option<usize>,
}

/// Per-document insert status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Document was written
    Ok,
    /// Document failed; see `error_index`
    Error,
    /// Document was not attempted (ordered insert stopped earlier)
    Skipped,
}

impl Response {
    /// Fail with [`Error::ServerRejected`] if the server reported errors.
    pub fn check(self) -> Result<Self> {
        match self.errors.first() {
            None => Ok(self),
            Some(first) => Err(Error::ServerRejected {
                code: first.error_code.clone(),
                message: first.message.clone(),
                count: self.errors.len(),
            }),
        }
    }

    /// The status section, or an empty one.
    pub fn status(&self) -> Status {
        self.status.clone().unwrap_or_default()
    }

    /// Take the page of documents out of `data.documents`.
    pub fn take_documents(&mut self) -> Result<Vec<Document>> {
        self.data
            .as_mut()
            .and_then(|d| d.documents.take())
            .ok_or_else(|| Error::unexpected_response("missing data.documents"))
    }

    /// Take the single document out of `data.document` (may be absent).
    pub fn take_document(&mut self) -> Option<Document> {
        self.data.as_mut().and_then(|d| d.document.take())
    }

    /// The page token carried by `data` or, for paged mutations, `status`.
    pub fn next_page_state(&self) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|d| d.next_page_state.clone())
            .or_else(|| self.status.as_ref().and_then(|s| s.next_page_state.clone()))
    }

    /// `status.count`, required by the count commands.
    pub fn count(&self) -> Result<u64> {
        self.status
            .as_ref()
            .and_then(|s| s.count)
            .ok_or_else(|| Error::unexpected_response("missing status.count"))
    }
}
