//! Delete handlers.

use docstream_core::{Command, CommandOptions, CommandRunner, Document, Result};
use tracing::debug;

use crate::types::DeleteResult;

/// Handle DeleteOne command.
pub fn delete_one(runner: &dyn CommandRunner, filter: Option<Document>) -> Result<DeleteResult> {
    let command = Command::DeleteOne { filter };
    let status = runner
        .run_command(&command, &CommandOptions::default())?
        .check()?
        .status();
    Ok(DeleteResult {
        deleted_count: status.deleted_count.unwrap_or(0),
    })
}

/// Handle DeleteMany command.
///
/// Reissued while the server reports `moreData`; counts are summed.
pub fn delete_many(runner: &dyn CommandRunner, filter: Option<Document>) -> Result<DeleteResult> {
    let mut deleted_count = 0u64;
    let mut calls = 0u32;
    loop {
        let command = Command::DeleteMany {
            filter: filter.clone(),
        };
        let status = runner
            .run_command(&command, &CommandOptions::default())?
            .check()?
            .status();
        calls += 1;
        deleted_count += status.deleted_count.unwrap_or(0);
        if !status.more_data.unwrap_or(false) {
            break;
        }
    }
    debug!(calls, deleted_count, "delete_many complete");
    Ok(DeleteResult { deleted_count })
}
