//! Client configuration via `docstream.toml`
//!
//! Holds the defaults for batch mutations and the server ceilings the client
//! enforces. The file is read once; each call then derives its own immutable
//! option struct from it, so no option object is ever shared between calls.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::limits::Limits;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "docstream.toml";

/// Defaults applied to `insertMany`-class operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Documents per chunk (default: 50)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Concurrent chunk workers (default: 1)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Stop at the first failing chunk (default: false)
    #[serde(default)]
    pub ordered: bool,
    /// Deadline for the whole batch in milliseconds (default: 60000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Ask the server for per-document statuses (default: false)
    #[serde(default)]
    pub return_document_responses: bool,
}

fn default_chunk_size() -> usize {
    50
}

fn default_concurrency() -> usize {
    1
}

fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            concurrency: default_concurrency(),
            ordered: false,
            timeout_ms: default_timeout_ms(),
            return_document_responses: false,
        }
    }
}

impl BatchConfig {
    /// The batch deadline as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Settings of `find` cursors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorConfig {
    /// Round-trip timeout of each page fetch in milliseconds (default: the
    /// runner's own)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_timeout_ms: Option<u64>,
}

impl CursorConfig {
    /// The page fetch timeout as a `Duration`, if set.
    pub fn page_timeout(&self) -> Option<Duration> {
        self.page_timeout_ms.map(Duration::from_millis)
    }
}

/// Client configuration loaded from `docstream.toml`.
///
/// # Example
///
/// ```toml
/// [batch]
/// chunk_size = 50
/// concurrency = 4
/// timeout_ms = 30000
///
/// [cursor]
/// page_timeout_ms = 5000
///
/// [limits]
/// max_chunk_size = 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Batch mutation defaults.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Cursor settings.
    #[serde(default)]
    pub cursor: CursorConfig,
    /// Server ceilings.
    #[serde(default)]
    pub limits: Limits,
}

impl ClientConfig {
    /// Check that the batch defaults fit the limits.
    ///
    /// # Errors
    ///
    /// Returns the same validation error a batch plan built from these
    /// defaults would return.
    pub fn validate(&self) -> Result<()> {
        self.limits.validate_chunk_size(self.batch.chunk_size)?;
        self.limits.validate_concurrency(self.batch.concurrency)?;
        if self.batch.ordered && self.batch.concurrency > 1 {
            return Err(Error::OrderedConcurrency {
                concurrency: self.batch.concurrency,
            });
        }
        if self.batch.timeout_ms == 0 {
            return Err(Error::invalid_argument("batch timeout must be positive"));
        }
        if self.cursor.page_timeout_ms == Some(0) {
            return Err(Error::invalid_argument("page timeout must be positive"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docstream client configuration

[batch]
# Documents per insert command (must not exceed limits.max_chunk_size)
chunk_size = 50
# Concurrent chunk workers; ordered batches require 1
concurrency = 1
# Stop at the first failing chunk
ordered = false
# Deadline for a whole insertMany call, in milliseconds
timeout_ms = 60000
# Ask the server for a status per document
return_document_responses = false

[cursor]
# Timeout of each find page round trip, in milliseconds (unset: runner default)
# page_timeout_ms = 5000

[limits]
# Server maximum documents per insert command
max_chunk_size = 100
# Server page size for find
max_page_size = 20
# Upper bound on concurrent chunk workers
max_concurrency = 64
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content).map_err(|e| Error::Config {
            reason: format!("failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
                reason: format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content).map_err(|e| Error::Config {
            reason: format!("failed to write config file '{}': {}", path.display(), e),
        })
    }
}
