//! `findOne` handler.

use docstream_core::{Command, CommandOptions, CommandRunner, Document, FindCommandOptions, Result};

use crate::types::FindOptions;

/// Handle FindOne command.
///
/// `None` when nothing matches. Only sort, projection and the similarity flag
/// apply to a single-document lookup.
pub fn find_one(
    runner: &dyn CommandRunner,
    filter: Option<Document>,
    options: &FindOptions,
) -> Result<Option<Document>> {
    let command = Command::FindOne {
        filter,
        sort: options.sort.clone(),
        projection: options.projection.clone(),
        options: options.include_similarity.then(|| FindCommandOptions {
            include_similarity: Some(true),
            ..Default::default()
        }),
    };
    let mut response = runner
        .run_command(&command, &CommandOptions::default())?
        .check()?;
    Ok(response.take_document())
}
