//! Insert handlers.

use docstream_core::{
    Command, CommandOptions, CommandRunner, Document, DocumentStatus, Error, InsertManyCommandOptions,
    Result,
};
use tracing::debug;

use crate::batch::{Chunk, ChunkResult};
use crate::types::InsertOneResult;

/// Handle InsertOne command.
pub fn insert_one(runner: &dyn CommandRunner, document: Document) -> Result<InsertOneResult> {
    let command = Command::InsertOne { document };
    let response = runner
        .run_command(&command, &CommandOptions::default())?
        .check()?;
    let inserted_id = response
        .status()
        .inserted_ids
        .and_then(|ids| ids.into_iter().next())
        .ok_or_else(|| Error::unexpected_response("missing status.insertedIds"))?;
    Ok(InsertOneResult { inserted_id })
}

/// Handle InsertMany command for one chunk of a batch.
///
/// Exactly one network call. With `return_document_responses`, the inserted
/// identifiers are those of the documents reported `OK`; otherwise they come
/// from `status.insertedIds`.
pub fn insert_chunk(
    runner: &dyn CommandRunner,
    chunk: Chunk<Document>,
    ordered: bool,
    return_document_responses: bool,
) -> Result<ChunkResult> {
    let sequence = chunk.sequence;
    let size = chunk.items.len();
    let command = Command::InsertMany {
        documents: chunk.items,
        options: Some(InsertManyCommandOptions {
            ordered: Some(ordered),
            return_document_responses: return_document_responses.then_some(true),
        }),
    };
    let options = CommandOptions::default().for_chunk(sequence);
    let status = runner.run_command(&command, &options)?.check()?.status();

    let result = if return_document_responses {
        let responses = status
            .document_responses
            .ok_or_else(|| Error::unexpected_response("missing status.documentResponses"))?;
        let inserted_ids = responses
            .iter()
            .filter(|r| r.status == DocumentStatus::Ok)
            .map(|r| r.id.clone())
            .collect();
        ChunkResult {
            sequence,
            inserted_ids,
            document_responses: Some(responses),
        }
    } else {
        let inserted_ids = status
            .inserted_ids
            .ok_or_else(|| Error::unexpected_response("missing status.insertedIds"))?;
        ChunkResult {
            sequence,
            inserted_ids,
            document_responses: None,
        }
    };

    debug!(
        chunk = sequence,
        documents = size,
        inserted = result.inserted_ids.len(),
        "chunk inserted"
    );
    Ok(result)
}
