//! Update handlers.

use docstream_core::{Command, CommandOptions, CommandRunner, Document, Result, UpdateCommandOptions};
use tracing::debug;

use crate::types::{UpdateOptions, UpdateResult};

/// Handle UpdateOne command.
///
/// `upserted_id` is read from `status.upsertedId` only.
pub fn update_one(
    runner: &dyn CommandRunner,
    filter: Document,
    update: Document,
    options: &UpdateOptions,
) -> Result<UpdateResult> {
    let command = Command::UpdateOne {
        filter,
        update,
        sort: None,
        options: command_options(options, None),
    };
    let status = runner
        .run_command(&command, &CommandOptions::default())?
        .check()?
        .status();
    Ok(UpdateResult {
        matched_count: status.matched_count.unwrap_or(0),
        modified_count: status.modified_count.unwrap_or(0),
        upserted_id: status.upserted_id,
    })
}

/// Handle UpdateMany command.
///
/// The server updates a bounded number of documents per call and hands back a
/// page token while more remain; the command is reissued with that token and
/// the counts are summed.
pub fn update_many(
    runner: &dyn CommandRunner,
    filter: Document,
    update: Document,
    options: &UpdateOptions,
) -> Result<UpdateResult> {
    let mut result = UpdateResult::default();
    let mut page_state: Option<String> = None;
    let mut calls = 0u32;
    loop {
        let command = Command::UpdateMany {
            filter: filter.clone(),
            update: update.clone(),
            options: command_options(options, page_state.take()),
        };
        let response = runner
            .run_command(&command, &CommandOptions::default())?
            .check()?;
        calls += 1;
        let next = response.next_page_state().filter(|t| !t.is_empty());
        let status = response.status();
        result.matched_count += status.matched_count.unwrap_or(0);
        result.modified_count += status.modified_count.unwrap_or(0);
        if result.upserted_id.is_none() {
            result.upserted_id = status.upserted_id;
        }
        match next {
            Some(token) => page_state = Some(token),
            None => break,
        }
    }
    debug!(
        calls,
        matched = result.matched_count,
        modified = result.modified_count,
        "update_many complete"
    );
    Ok(result)
}

fn command_options(options: &UpdateOptions, page_state: Option<String>) -> Option<UpdateCommandOptions> {
    if !options.upsert && page_state.is_none() {
        return None;
    }
    Some(UpdateCommandOptions {
        upsert: options.upsert.then_some(true),
        page_state,
    })
}
