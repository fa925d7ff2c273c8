//! Collaborator traits
//!
//! This module defines the [`CommandRunner`] trait, the single seam between
//! the cursor/batch engine and the network. Transport, authentication, retry
//! and error decoding all live behind it, so the engine can be driven by an
//! HTTP client in production and by a scripted runner in tests.

use std::time::Duration;

use crate::command::Command;
use crate::error::Result;
use crate::response::Response;

/// Per-call options handed to the runner along with a command.
///
/// Constructed fresh for every call; never shared mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Timeout of this single round trip (None = runner default)
    pub timeout: Option<Duration>,
    /// Sequence index of the chunk this command carries, for batch commands
    pub chunk: Option<usize>,
}

impl CommandOptions {
    /// Options with an explicit round-trip timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        CommandOptions {
            timeout: Some(timeout),
            chunk: None,
        }
    }

    /// Tag the command with a chunk sequence index.
    pub fn for_chunk(mut self, chunk: usize) -> Self {
        self.chunk = Some(chunk);
        self
    }
}

/// Executes one command over the network.
///
/// Thread safety: the batch executor calls `run_command` from several worker
/// threads at once, so implementations must be `Send + Sync`.
///
/// # Errors
///
/// Implementations return the typed collaborator errors:
/// [`CommandTimeout`](crate::Error::CommandTimeout),
/// [`CommandInterrupted`](crate::Error::CommandInterrupted),
/// [`ServerRejected`](crate::Error::ServerRejected) and
/// [`Transport`](crate::Error::Transport). The engine propagates them unchanged
/// and never retries.
///
/// # Example
///
/// ```ignore
/// use docstream_core::{Command, CommandOptions, CommandRunner, Response, Result};
///
/// struct HttpRunner { /* client, endpoint, token */ }
///
/// impl CommandRunner for HttpRunner {
///     fn run_command(&self, command: &Command, options: &CommandOptions) -> Result<Response> {
///         let body = serde_json::to_vec(command)?;
///         // POST body, decode the envelope, map errors...
///         # unimplemented!()
///     }
/// }
/// ```
pub trait CommandRunner: Send + Sync {
    /// Perform one round trip and return the decoded response.
    fn run_command(&self, command: &Command, options: &CommandOptions) -> Result<Response>;
}

impl<F> CommandRunner for F
where
    F: Fn(&Command, &CommandOptions) -> Result<Response> + Send + Sync,
{
    fn run_command(&self, command: &Command, options: &CommandOptions) -> Result<Response> {
        self(command, options)
    }
}
