//! Count handlers.

use docstream_core::{Command, CommandOptions, CommandRunner, Document, Error, Result};

/// Handle CountDocuments command.
///
/// Fails with [`Error::TooManyDocuments`] when the server could not count all
/// matches (`moreData`) or the count is above `upper_bound`.
pub fn count_documents(
    runner: &dyn CommandRunner,
    filter: Option<Document>,
    upper_bound: u64,
) -> Result<u64> {
    let command = Command::CountDocuments { filter };
    let response = runner
        .run_command(&command, &CommandOptions::default())?
        .check()?;
    let count = response.count()?;
    let more_data = response.status().more_data.unwrap_or(false);
    if more_data || count > upper_bound {
        return Err(Error::TooManyDocuments { upper_bound });
    }
    Ok(count)
}

/// Handle EstimatedDocumentCount command.
pub fn estimated_document_count(runner: &dyn CommandRunner) -> Result<u64> {
    runner
        .run_command(&Command::EstimatedDocumentCount {}, &CommandOptions::default())?
        .check()?
        .count()
}
