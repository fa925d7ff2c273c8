//! Core types and traits for docstream
//!
//! This crate defines the foundational types used by the cursor and batch engine:
//! - Document: JSON object as stored by the remote API, plus `decode`/`encode`
//! - Command: serializable instruction set sent to the API
//! - Response: decoded response envelope (status, data, errors)
//! - CommandRunner: the network collaborator trait
//! - Error: error taxonomy shared by every layer
//! - Limits: server-imposed ceilings checked before any network call
//! - ClientConfig: `docstream.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod limits;
pub mod response;
pub mod traits;

pub use command::{Command, FindCommandOptions, InsertManyCommandOptions, UpdateCommandOptions};
pub use config::{BatchConfig, ClientConfig, CursorConfig, CONFIG_FILE_NAME};
pub use document::{decode, decode_value, encode, Document, ID_FIELD};
pub use error::{Error, Result};
pub use limits::{LimitError, Limits};
pub use response::{ApiError, DocumentResponse, DocumentStatus, Response, ResponseData, Status};
pub use traits::{CommandOptions, CommandRunner};
