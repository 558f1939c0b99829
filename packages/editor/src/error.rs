//! Error types for the editor

use thiserror::Error;

use vellum_doc::{SchemaError, StateError};
use vellum_markdown::{ParseError, SerializeError};

/// Construction-time composition failures. These abort initialization
/// before a view exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    #[error("duplicate node type `{0}` contributed by more than one extension")]
    DuplicateNode(String),

    #[error("duplicate mark type `{0}` contributed by more than one extension")]
    DuplicateMark(String),

    #[error("extension `{extension}` is misconfigured: {message}")]
    InvalidConfig { extension: String, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("composition error: {0}")]
    Composition(#[from] CompositionError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}
